//! Gateway trait definition.

use std::fmt;

use async_trait::async_trait;

use crate::domain::roster::ModelIdentity;

/// Errors a single gateway call can produce. Recorded as structured data on
/// the owning task or vote, never fatal to the round.
#[derive(Debug)]
pub enum GatewayError {
    /// Transport-level failure (connect, TLS, HTTP status).
    Http(String),
    /// The model returned nothing usable.
    Empty,
    /// The model answered but the reply could not be interpreted.
    Malformed(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Http(msg) => write!(f, "gateway http error: {msg}"),
            GatewayError::Empty => write!(f, "gateway returned empty output"),
            GatewayError::Malformed(msg) => write!(f, "gateway reply malformed: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// A contestant's answer as shown to judges. `answer` is `None` when the
/// answer task failed; judges see the failure and may still vote either way.
#[derive(Debug, Clone)]
pub struct ContestantAnswer {
    pub model: ModelIdentity,
    pub answer: Option<String>,
}

/// One generation request per method; implementations must not retry.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Ask `model` to write this round's comedy prompt.
    async fn write_prompt(&self, model: &ModelIdentity) -> Result<String, GatewayError>;

    /// Ask `model` to answer the round's prompt.
    async fn answer_prompt(
        &self,
        model: &ModelIdentity,
        prompt: &str,
    ) -> Result<String, GatewayError>;

    /// Ask `model` to pick the funnier answer. Returns the index into
    /// `answers` (0 or 1).
    async fn judge_answers(
        &self,
        model: &ModelIdentity,
        prompt: &str,
        answers: &[ContestantAnswer; 2],
    ) -> Result<usize, GatewayError>;
}
