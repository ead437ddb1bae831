use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::sessions::SessionRegistry;
use crate::services::match_flow::MatchFlowService;
use crate::state::security_config::SecurityConfig;
use crate::ws::hub::WsRegistry;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<MatchFlowService>,
    pub registry: Arc<WsRegistry>,
    pub sessions: Arc<SessionRegistry>,
    pub security: SecurityConfig,
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(
        controller: Arc<MatchFlowService>,
        registry: Arc<WsRegistry>,
        security: SecurityConfig,
        db: DatabaseConnection,
    ) -> Self {
        Self {
            controller,
            registry,
            sessions: Arc::new(SessionRegistry::new()),
            security,
            db,
        }
    }
}
