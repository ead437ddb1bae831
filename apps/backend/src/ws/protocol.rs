use actix::prelude::Message;
use serde::{Deserialize, Serialize};

use crate::domain::snapshot::BoutSnapshot;

/// Server-to-spectator messages. Spectators are push-only; there is no
/// client vocabulary beyond websocket pings.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Full state snapshot, sent on every match-state mutation and once on
    /// connect.
    BoutState { snapshot: BoutSnapshot },

    /// Viewer-count-only delta for connect/disconnect, cheaper than
    /// re-serializing full state.
    ViewerCount { viewer_count: usize },
}

/// Actor envelope for [`ServerMsg`] delivery to a session.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Outbound(pub ServerMsg);
