#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod infra;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod ws;

// Re-exports for public API
pub use auth::jwt::{mint_session_token, verify_session_token, Claims};
pub use auth::sessions::SessionRegistry;
pub use config::BoutConfig;
pub use domain::match_state::MatchState;
pub use domain::round::{Phase, Round};
pub use domain::roster::{ModelIdentity, Roster};
pub use domain::snapshot::BoutSnapshot;
pub use error::AppError;
pub use gateway::{create_gateway, ModelGateway};
pub use services::match_flow::MatchFlowService;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;
pub use ws::hub::WsRegistry;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
