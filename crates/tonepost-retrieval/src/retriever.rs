//! Retrieval orchestration.

use std::sync::Arc;

use tonepost_core::{RankerWeights, StyleRules, Tone};
use tonepost_llm::EmbeddingClient;

use crate::error::RetrievalError;
use crate::filter::usable_exemplars;
use crate::ranker::rank_exemplars;
use crate::types::ExemplarCaption;
use crate::vector_store::QdrantClient;

/// Rows fetched per vector-store query.
const QUERY_LIMIT: usize = 12;

/// Usable rows required before the broader fallback query is skipped.
const MIN_USABLE: usize = 4;

/// Cap on the merged primary + fallback pool.
const MERGED_POOL_CAP: usize = 12;

/// Finds stylistically relevant reference captions for a request.
pub struct ExemplarRetriever {
    embeddings: EmbeddingClient,
    store: QdrantClient,
    rules: Arc<StyleRules>,
    weights: RankerWeights,
}

impl ExemplarRetriever {
    #[must_use]
    pub fn new(
        embeddings: EmbeddingClient,
        store: QdrantClient,
        rules: Arc<StyleRules>,
        weights: RankerWeights,
    ) -> Self {
        Self {
            embeddings,
            store,
            rules,
            weights,
        }
    }

    /// Retrieve up to 4 ranked exemplars for the given context.
    ///
    /// Never fails: embedding or store errors are logged and degrade to an
    /// empty list, so retrieval problems only lower prompt quality, never
    /// abort a generation.
    pub async fn retrieve(
        &self,
        context_text: &str,
        category: &str,
        tone: Tone,
    ) -> Vec<ExemplarCaption> {
        match self.try_retrieve(context_text, category, tone).await {
            Ok(exemplars) => {
                tracing::debug!(
                    count = exemplars.len(),
                    category,
                    tone = %tone,
                    "exemplar retrieval complete"
                );
                exemplars
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    category,
                    tone = %tone,
                    "exemplar retrieval failed — continuing without exemplars"
                );
                Vec::new()
            }
        }
    }

    /// 1. Embed the context text.
    /// 2. Tone + category filtered search.
    /// 3. If fewer than 4 usable rows, broader category-only search, merged
    ///    with the primary pool (dedup by exact caption text, cap 12).
    /// 4. Usability filter, rank, top 4.
    async fn try_retrieve(
        &self,
        context_text: &str,
        category: &str,
        tone: Tone,
    ) -> Result<Vec<ExemplarCaption>, RetrievalError> {
        let vector = self.embeddings.embed(context_text).await?;

        let primary = self
            .store
            .search(&vector, category, Some(tone), QUERY_LIMIT)
            .await?;

        let mut usable = usable_exemplars(&primary, tone, &self.rules);
        if usable.len() < MIN_USABLE {
            let broader = self.store.search(&vector, category, None, QUERY_LIMIT).await?;
            let merged = merge_pools(primary, broader, MERGED_POOL_CAP);
            usable = usable_exemplars(&merged, tone, &self.rules);
        }

        Ok(rank_exemplars(usable, tone, &self.weights, &self.rules))
    }
}

/// Merge two result pools, deduplicating by exact caption text and keeping
/// primary rows first.
fn merge_pools(
    primary: Vec<ExemplarCaption>,
    broader: Vec<ExemplarCaption>,
    cap: usize,
) -> Vec<ExemplarCaption> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut merged = Vec::with_capacity(cap);
    for exemplar in primary.into_iter().chain(broader) {
        if merged.len() == cap {
            break;
        }
        if seen.insert(exemplar.text.clone()) {
            merged.push(exemplar);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exemplar(text: &str) -> ExemplarCaption {
        ExemplarCaption {
            text: text.to_string(),
            category: "카페".to_string(),
            tone: None,
            popularity: 0,
            similarity: 0.5,
            source_id: String::new(),
        }
    }

    #[test]
    fn merge_dedups_by_exact_text() {
        let primary = vec![exemplar("하나"), exemplar("둘")];
        let broader = vec![exemplar("둘"), exemplar("셋")];
        let merged = merge_pools(primary, broader, 12);
        let texts: Vec<&str> = merged.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["하나", "둘", "셋"]);
    }

    #[test]
    fn merge_respects_cap() {
        let primary: Vec<ExemplarCaption> =
            (0..8).map(|i| exemplar(&format!("기본 {i}"))).collect();
        let broader: Vec<ExemplarCaption> =
            (0..8).map(|i| exemplar(&format!("추가 {i}"))).collect();
        assert_eq!(merge_pools(primary, broader, 12).len(), 12);
    }

    #[test]
    fn merge_keeps_primary_rows_first() {
        let primary = vec![exemplar("기본")];
        let broader = vec![exemplar("추가")];
        let merged = merge_pools(primary, broader, 12);
        assert_eq!(merged[0].text, "기본");
    }
}
