//! Qdrant vector store client for the exemplar corpus.
//!
//! The corpus is read-only from this service's point of view; an offline
//! ingestion process owns writes. Only filtered nearest-neighbour search is
//! exposed here.

use serde::{Deserialize, Serialize};

use tonepost_core::Tone;

use crate::error::RetrievalError;
use crate::types::ExemplarCaption;

/// Qdrant HTTP client.
pub struct QdrantClient {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    filter: SearchFilter,
}

#[derive(Serialize)]
struct SearchFilter {
    must: Vec<FieldCondition>,
}

#[derive(Serialize)]
struct FieldCondition {
    key: &'static str,
    #[serde(rename = "match")]
    matches: MatchValue,
}

#[derive(Serialize)]
struct MatchValue {
    value: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: PointPayload,
}

#[derive(Deserialize, Default)]
struct PointPayload {
    caption: Option<String>,
    category: Option<String>,
    tone: Option<String>,
    popularity: Option<u32>,
    source_id: Option<String>,
}

impl QdrantClient {
    /// Create a new `QdrantClient`.
    #[must_use]
    pub fn new(qdrant_url: &str, collection: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: qdrant_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        }
    }

    /// Nearest-neighbour search filtered by category and, optionally, tone.
    ///
    /// Points without a caption payload are skipped rather than failing the
    /// whole search.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::Http`] on network failure.
    /// - [`RetrievalError::Store`] on a non-success status.
    /// - [`RetrievalError::Deserialize`] if the response body does not match
    ///   the expected shape.
    pub async fn search(
        &self,
        vector: &[f32],
        category: &str,
        tone: Option<Tone>,
        limit: usize,
    ) -> Result<Vec<ExemplarCaption>, RetrievalError> {
        let mut must = vec![FieldCondition {
            key: "category",
            matches: MatchValue {
                value: category.to_string(),
            },
        }];
        if let Some(t) = tone {
            must.push(FieldCondition {
                key: "tone",
                matches: MatchValue {
                    value: t.as_str().to_string(),
                },
            });
        }

        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
            filter: SearchFilter { must },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(RetrievalError::Store(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| RetrievalError::Deserialize {
                context: url,
                source: e,
            })?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(point_to_exemplar)
            .collect())
    }
}

/// Convert one scored point into an [`ExemplarCaption`], skipping points
/// without caption text.
fn point_to_exemplar(point: ScoredPoint) -> Option<ExemplarCaption> {
    let text = point.payload.caption?;
    Some(ExemplarCaption {
        text,
        category: point.payload.category.unwrap_or_default(),
        tone: point.payload.tone.as_deref().and_then(parse_tone),
        popularity: point.payload.popularity.unwrap_or(0),
        similarity: point.score,
        source_id: point.payload.source_id.unwrap_or_default(),
    })
}

fn parse_tone(raw: &str) -> Option<Tone> {
    match raw {
        "EMOTIONAL" => Some(Tone::Emotional),
        "CASUAL" => Some(Tone::Casual),
        "PROFESSIONAL" => Some(Tone::Professional),
        _ => None,
    }
}
