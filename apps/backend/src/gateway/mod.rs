//! Model call gateway: one asynchronous generation request per call.
//!
//! The engine never retries a failed call; whatever policy a deployment
//! wants (retries, routing, caching) lives behind this seam.

mod openai;
mod prompts;
mod scripted;
mod trait_def;

use std::sync::Arc;

pub use openai::OpenAiGateway;
pub use scripted::ScriptedGateway;
pub use trait_def::{ContestantAnswer, GatewayError, ModelGateway};

use crate::config::GatewayConfig;

/// Construct a gateway by its configured name. Returns `None` for unknown
/// kinds.
pub fn create_gateway(kind: &str, config: &GatewayConfig) -> Option<Arc<dyn ModelGateway>> {
    match kind {
        OpenAiGateway::NAME => Some(Arc::new(OpenAiGateway::new(
            config.base_url.clone(),
            config.api_key.clone(),
        ))),
        ScriptedGateway::NAME => Some(Arc::new(ScriptedGateway::new())),
        _ => None,
    }
}

#[cfg(test)]
mod registry_smoke {
    use super::{create_gateway, OpenAiGateway, ScriptedGateway};
    use crate::config::GatewayConfig;

    #[test]
    fn constructs_known_gateways() {
        let config = GatewayConfig {
            base_url: "http://localhost:9/v1".into(),
            api_key: "unused".into(),
        };
        assert!(create_gateway(ScriptedGateway::NAME, &config).is_some());
        assert!(create_gateway(OpenAiGateway::NAME, &config).is_some());
        assert!(create_gateway("not-a-gateway", &config).is_none());
    }
}
