//! Exemplar retrieval for the caption pipeline.
//!
//! Embeds the request context, queries the Qdrant exemplar corpus filtered
//! by category and tone (with a broader fallback query when the filtered
//! pool is thin), screens candidates through a usability filter, and ranks
//! the survivors. Retrieval failure is never fatal: any embedding or store
//! error degrades to an empty exemplar list.

pub mod error;
pub mod filter;
pub mod ranker;
pub mod retriever;
pub mod types;
pub mod vector_store;

pub use error::RetrievalError;
pub use retriever::ExemplarRetriever;
pub use types::ExemplarCaption;
pub use vector_store::QdrantClient;
