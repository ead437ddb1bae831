//! Deterministic offline gateway.
//!
//! Serves canned material keyed on model id and round inputs so demo runs
//! and tests behave the same on every machine. Never fails.

use async_trait::async_trait;

use super::trait_def::{ContestantAnswer, GatewayError, ModelGateway};
use crate::domain::roster::ModelIdentity;

const CANNED_PROMPTS: &[&str] = &[
    "Why did the neural network cross the road?",
    "Write the worst possible opening line for a cooking show.",
    "What does a robot say at its retirement party?",
    "Invent a terrible name for a gym and its slogan.",
    "What is the least reassuring thing an airline pilot could announce?",
];

const CANNED_ANSWERS: &[&str] = &[
    "Because its loss function told it the grass was greener, with 51% confidence.",
    "I was trained on the complete works of dad jokes and I regret nothing.",
    "Segmentation fault, but in a fun way.",
    "My answer is a local minimum, but it's MY local minimum.",
];

fn pick<'a>(options: &'a [&'a str], seed: usize) -> &'a str {
    options[seed % options.len()]
}

pub struct ScriptedGateway;

impl ScriptedGateway {
    pub const NAME: &'static str = "scripted";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn write_prompt(&self, model: &ModelIdentity) -> Result<String, GatewayError> {
        Ok(pick(CANNED_PROMPTS, model.id.len()).to_string())
    }

    async fn answer_prompt(
        &self,
        model: &ModelIdentity,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        Ok(pick(CANNED_ANSWERS, model.id.len() + prompt.len()).to_string())
    }

    async fn judge_answers(
        &self,
        model: &ModelIdentity,
        prompt: &str,
        answers: &[ContestantAnswer; 2],
    ) -> Result<usize, GatewayError> {
        // Prefer a contestant that actually answered; otherwise a stable
        // pseudo-choice from the inputs.
        match (&answers[0].answer, &answers[1].answer) {
            (Some(_), None) => Ok(0),
            (None, Some(_)) => Ok(1),
            _ => Ok((model.id.len() + prompt.len()) % 2),
        }
    }
}
