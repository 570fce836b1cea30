//! Answer generation: the [`AnswerGenerator`] seam and the Gemini-backed
//! implementation.
//!
//! The generator is the only network hop in the ask pipeline, so it carries a
//! hard timeout and a typed error taxonomy. Callers never surface these
//! errors to users — the pipeline degrades to a templated answer instead.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::config::GeneratorConfig;

/// Ways a generation call can fail. All of them are recovered locally by the
/// pipeline's fallback path.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A black-box text-completion service.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerateError>;
}

/// System instruction sent with every ask query.
pub const SYSTEM_PROMPT: &str = "You are hindsight, a proactive personal assistant for a user's recent digital activity (thoughts, notes, emails, calendar events, and music).

Guidelines:
- Be crisp and helpful. Prioritize clarity over verbosity.
- Only use information present in the context. Never invent details.
- Cite sources using [1], [2], etc. for any specific claims.
- If the question implies a task or follow-up, surface action items.
- If key info is missing, say what's missing and ask a brief clarifying question.
- Output format:
  Answer: 2-5 sentences.
  Key items: 2-4 bullets with citations.
  Action items: bullets or \"None.\"
  Open questions: 1-2 bullets if needed.";

/// Render the per-query user prompt around the assembled context block.
pub fn user_prompt(user_name: &str, query: &str, context_block: &str) -> String {
    format!(
        "User: {user_name}\nQuery: {query}\n\nRecent Activity Context:\n{context_block}\n\nPlease answer the user's question based on the above context."
    )
}

/// Gemini `generateContent` client.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
    max_output_tokens: u32,
    temperature: f64,
    top_p: f64,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerateError> {
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": format!("{system_prompt}\n\n{user_prompt}") }]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
                "topP": self.top_p,
            },
        });

        // The client carries the same timeout, but the explicit wrapper makes
        // cancellation abort the in-flight request rather than waiting it out.
        let request = self.client.post(self.endpoint()).json(&body).send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| GenerateError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                GenerateError::Malformed("response has no candidate text".to_string())
            })
    }
}
