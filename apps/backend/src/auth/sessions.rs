//! Live operator sessions.
//!
//! Tokens are stateless JWTs, so logout needs a server-side registry of
//! session ids that are still honored. The registry is process-local; a
//! restart logs every operator out, which is acceptable for a single-node
//! control surface.

use dashmap::DashSet;

/// Session ids (`jti` claims) that are currently valid.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    live: DashSet<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, session_id: &str) {
        self.live.insert(session_id.to_string());
    }

    /// Returns whether the session was live before revocation.
    pub fn revoke(&self, session_id: &str) -> bool {
        self.live.remove(session_id).is_some()
    }

    pub fn is_live(&self, session_id: &str) -> bool {
        self.live.contains(session_id)
    }
}
