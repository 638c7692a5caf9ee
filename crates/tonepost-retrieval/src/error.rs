use thiserror::Error;

use tonepost_llm::LlmError;

/// Errors raised while retrieving exemplars.
///
/// These never escape [`crate::ExemplarRetriever::retrieve`]; the retriever
/// logs them and returns an empty list instead.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding server call failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),

    /// Network or TLS failure talking to the vector store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vector store returned a non-success status.
    #[error("vector store error: {0}")]
    Store(String),

    /// The search response could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
