use actix::prelude::Recipient;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::{Outbound, ServerMsg};

/// Live spectator set.
///
/// Connections register on session start and unregister on stop; delivery is
/// best-effort per viewer and never blocks round progression. A viewer whose
/// mailbox is gone is simply skipped; its session actor removes itself when
/// it stops.
#[derive(Default)]
pub struct WsRegistry {
    viewers: DashMap<Uuid, Recipient<Outbound>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self {
            viewers: DashMap::new(),
        }
    }

    pub fn register(&self, recipient: Recipient<Outbound>) -> Uuid {
        let conn_id = Uuid::new_v4();
        self.viewers.insert(conn_id, recipient);
        debug!(%conn_id, viewer_count = self.viewers.len(), "viewer registered");
        conn_id
    }

    pub fn unregister(&self, conn_id: Uuid) {
        self.viewers.remove(&conn_id);
        debug!(%conn_id, viewer_count = self.viewers.len(), "viewer unregistered");
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    pub fn broadcast(&self, msg: ServerMsg) {
        for viewer in self.viewers.iter() {
            let _ = viewer.value().do_send(Outbound(msg.clone()));
        }
    }

    /// Connect/disconnect delta; deliberately not a full snapshot and does
    /// not touch the match generation.
    pub fn broadcast_viewer_count(&self) {
        self.broadcast(ServerMsg::ViewerCount {
            viewer_count: self.viewer_count(),
        });
    }
}
