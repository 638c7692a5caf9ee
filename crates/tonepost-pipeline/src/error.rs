use thiserror::Error;

use tonepost_llm::LlmError;

/// Errors surfaced by the caption pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller's entitlement gate reported an exhausted quota; generation
    /// was never started.
    #[error("generation quota exhausted")]
    QuotaExceeded,

    /// A generation or rewrite call failed at the transport/provider level.
    /// These are not retried; the rewrite chain only retries for quality.
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    /// Every draft parsed to an empty caption.
    #[error("generation produced an empty caption")]
    EmptyCaption,
}
