//! Implements the [`Model`] trait with the Google Gemini `generateContent` REST endpoint.

use crate::advisor::{Model, Prompt, Role};
use crate::error::Res;
use serde_json::{json, Value};
use tracing::{debug, trace};

/// Used when a failed response carries no message of its own.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error in the Google API.";

pub(crate) struct GoogleModel {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleModel {
    pub(crate) fn new(endpoint: &str, model: &str, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "{}/models/{model}:generateContent",
                endpoint.trim_end_matches('/')
            ),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl Model for GoogleModel {
    async fn generate(&self, prompt: &Prompt) -> Res<String> {
        debug!("POST {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        // A body that is not JSON is treated like a body without a message.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        trace!("generateContent returned {status}: {body}");

        match reply_text(&body) {
            Some(text) if status.is_success() => Ok(text.to_string()),
            _ => Err(anyhow::anyhow!("{}", error_message(&body))),
        }
    }
}

fn request_body(prompt: &Prompt) -> Value {
    let contents: Vec<Value> = prompt
        .turns
        .iter()
        .map(|turn| {
            json!({
                "role": match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                },
                "parts": [{ "text": turn.text }],
            })
        })
        .collect();
    json!({
        "system_instruction": { "parts": [{ "text": prompt.system_instruction }] },
        "contents": contents,
    })
}

fn reply_text(body: &Value) -> Option<&str> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

fn error_message(body: &Value) -> &str {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
}
