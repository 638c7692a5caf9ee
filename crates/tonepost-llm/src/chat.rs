//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! Wraps `reqwest` with bearer-key management, typed request/response
//! structs, and error-envelope handling. The anti-repetition sampling
//! parameters are fixed here; callers only choose the completion count and
//! temperature.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Fixed frequency penalty applied to every completion request.
const FREQUENCY_PENALTY: f32 = 0.4;

/// Fixed presence penalty applied to every completion request.
const PRESENCE_PENALTY: f32 = 0.4;

/// Client for the chat-completions API.
///
/// Use [`ChatClient::new`] for production; the `base_url` parameter doubles
/// as the test seam for pointing at a wiremock server.
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    n: u8,
    temperature: f32,
    max_tokens: u32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Creates a new client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tonepost/0.1 (caption-generation)")
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            max_tokens,
        })
    }

    /// Requests `n` independent completions for a system + user message pair.
    ///
    /// Returns one string per completion, in API order. Choices the server
    /// returns without content become empty strings; deciding what to do with
    /// an empty completion is the caller's concern.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Api`] if the server returns a non-success status.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Deserialize`] if the response body does not match the
    ///   expected shape.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        n: u8,
        temperature: f32,
    ) -> Result<Vec<String>, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            n,
            temperature,
            max_tokens: self.max_tokens,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api(format!(
                "chat completions returned status {status}: {}",
                error_message(&body)
            )));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: self.url.clone(),
                source: e,
            })?;

        Ok(parsed
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect())
    }
}

/// Extract the error message from an OpenAI-style error envelope, falling
/// back to a truncated raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_strips_trailing_slash() {
        let client = ChatClient::new("https://api.example.com/", "k", "m", 30, 700)
            .expect("client construction should not fail");
        assert_eq!(client.url, "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn error_message_reads_openai_envelope() {
        let body = r#"{"error":{"message":"rate limited","type":"requests"}}"#;
        assert_eq!(error_message(body), "rate limited");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
