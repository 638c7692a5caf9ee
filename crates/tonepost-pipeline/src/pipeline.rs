//! Pipeline orchestration.

use std::sync::Arc;

use tonepost_core::{classify_tone, ScoringWeights, StyleRules};
use tonepost_llm::ChatClient;
use tonepost_retrieval::ExemplarRetriever;

use crate::error::PipelineError;
use crate::generate::generate_candidates;
use crate::prompt::{system_prompt, user_prompt};
use crate::rewrite::run_rewrite_chain;
use crate::sanitize::sanitize;
use crate::score::select_candidate;
use crate::types::{GenerationRequest, GenerationResult, QuotaDecision};

/// The full generation-and-quality-control pipeline.
///
/// One sequential workflow per request; every external call is awaited in
/// order, and no internal timeout exists — the surrounding runtime's request
/// timeout is the only clock. Two concurrent requests from the same caller
/// each run the whole pipeline independently.
pub struct CaptionPipeline {
    chat: ChatClient,
    retriever: ExemplarRetriever,
    rules: Arc<StyleRules>,
    weights: ScoringWeights,
}

impl CaptionPipeline {
    #[must_use]
    pub fn new(
        chat: ChatClient,
        retriever: ExemplarRetriever,
        rules: Arc<StyleRules>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            chat,
            retriever,
            rules,
            weights,
        }
    }

    /// Run one request through the pipeline.
    ///
    /// 1. Short-circuit on an exhausted quota verdict — no model call happens.
    /// 2. Retrieve exemplars (failure degrades to none).
    /// 3. Compose prompts and request three drafts in one call.
    /// 4. Score and select the winner.
    /// 5. Apply the escalating rewrite chain.
    /// 6. Sanitize, unconditionally.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::QuotaExceeded`] when the caller's gate said so.
    /// - [`PipelineError::EmptyCaption`] when no draft carries usable text.
    /// - [`PipelineError::Llm`] when a generation or rewrite call fails.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        quota: QuotaDecision,
    ) -> Result<GenerationResult, PipelineError> {
        if quota == QuotaDecision::Exhausted {
            return Err(PipelineError::QuotaExceeded);
        }

        let exemplars = self
            .retriever
            .retrieve(&request.context_text(), &request.category, request.tone)
            .await;

        let system = system_prompt(request, &self.rules, &exemplars);
        let user = user_prompt(request);
        let temperature = self.rules.tone(request.tone).temperature;

        let candidates = generate_candidates(&self.chat, &system, &user, temperature).await?;

        let Some((winner, score)) =
            select_candidate(&candidates, request, &self.rules, &self.weights)
        else {
            return Err(PipelineError::EmptyCaption);
        };
        tracing::debug!(
            score = score.score,
            detected_tone = %score.detected_tone,
            issues = score.issues.len(),
            "selected winning draft"
        );

        let rewritten =
            run_rewrite_chain(&self.chat, &self.rules, request, winner.caption.clone(), &score)
                .await?;

        let caption = sanitize(&rewritten, request.tone, &self.rules);
        if caption.is_empty() {
            return Err(PipelineError::EmptyCaption);
        }

        let detected_tone = classify_tone(&self.rules, &caption);
        Ok(GenerationResult {
            caption,
            hashtags: winner.hashtags,
            story_phrases: winner.story_phrases,
            engagement_question: winner.engagement_question,
            score: score.score,
            detected_tone,
        })
    }
}
