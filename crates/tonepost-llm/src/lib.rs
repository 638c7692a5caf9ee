//! HTTP clients for the model servers behind the caption pipeline.
//!
//! [`ChatClient`] talks to an OpenAI-compatible chat-completions endpoint and
//! is used for both initial drafts (several completions per call) and the
//! corrective rewrite stages (one completion per call). [`EmbeddingClient`]
//! talks to a TEI (Text Embeddings Inference) server and produces the query
//! vector for exemplar retrieval.

pub mod chat;
pub mod embeddings;
pub mod error;

pub use chat::ChatClient;
pub use embeddings::EmbeddingClient;
pub use error::LlmError;
