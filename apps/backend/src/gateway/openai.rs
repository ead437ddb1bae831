//! HTTP gateway against an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::prompts;
use super::trait_def::{ContestantAnswer, GatewayError, ModelGateway};
use crate::domain::roster::ModelIdentity;

pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiGateway {
    pub const NAME: &'static str = "openai";

    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn complete(
        &self,
        model_id: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let body = json!({
            "model": model_id,
            "temperature": temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| GatewayError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http(format!("status {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(GatewayError::Empty);
        }

        debug!(model_id, chars = content.len(), "gateway completion received");
        Ok(content)
    }
}

fn render_answer(answer: &ContestantAnswer) -> &str {
    answer.answer.as_deref().unwrap_or("(no answer submitted)")
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn write_prompt(&self, model: &ModelIdentity) -> Result<String, GatewayError> {
        self.complete(
            &model.id,
            prompts::PROMPTER_SYSTEM,
            "Write this round's prompt.",
            1.0,
        )
        .await
    }

    async fn answer_prompt(
        &self,
        model: &ModelIdentity,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        self.complete(&model.id, prompts::ANSWERER_SYSTEM, prompt, 1.0)
            .await
    }

    async fn judge_answers(
        &self,
        model: &ModelIdentity,
        prompt: &str,
        answers: &[ContestantAnswer; 2],
    ) -> Result<usize, GatewayError> {
        let user = format!(
            "Prompt: {prompt}\n\nAnswer A: {}\n\nAnswer B: {}\n\nWhich is funnier, A or B?",
            render_answer(&answers[0]),
            render_answer(&answers[1]),
        );
        let reply = self
            .complete(&model.id, prompts::JUDGE_SYSTEM, &user, 0.2)
            .await?;

        // Lenient parse: first A/B anywhere in the reply.
        for ch in reply.chars() {
            match ch.to_ascii_uppercase() {
                'A' => return Ok(0),
                'B' => return Ok(1),
                _ => {}
            }
        }
        Err(GatewayError::Malformed(format!(
            "expected A or B, got: {reply}"
        )))
    }
}
