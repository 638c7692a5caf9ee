//! TEI (Text Embeddings Inference) client for query-vector generation.

use std::time::Duration;

use serde::Serialize;

use crate::error::LlmError;

/// TEI HTTP client.
pub struct EmbeddingClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl EmbeddingClient {
    /// Create a new `EmbeddingClient`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tonepost/0.1 (caption-generation)")
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/embed", base_url.trim_end_matches('/')),
        })
    }

    /// Generate the embedding vector for a single text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Api`] if the request fails, the server returns a
    /// non-success status, or the response does not contain exactly one
    /// vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let inputs = [text];
        let request = EmbedRequest { inputs: &inputs };
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(LlmError::Api(format!(
                "embedding server returned status {}",
                response.status()
            )));
        }

        let mut embeddings: Vec<Vec<f32>> = response.json().await?;

        if embeddings.len() != 1 {
            return Err(LlmError::Api(format!(
                "embedding server returned {} vectors for 1 input",
                embeddings.len()
            )));
        }

        Ok(embeddings.remove(0))
    }
}
