//! The caption generation-and-quality-control pipeline.
//!
//! Turns a free-text business update plus a target tone into a finished,
//! policy-compliant caption: retrieve exemplars, compose prompts, request
//! three drafts, score and select, apply the escalating rewrite chain, and
//! always finish with the deterministic sanitizer. See [`CaptionPipeline`].

pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompt;
pub mod rewrite;
pub mod sanitize;
pub mod score;
pub mod types;

pub use error::PipelineError;
pub use pipeline::CaptionPipeline;
pub use sanitize::sanitize;
pub use score::{score_candidate, select_candidate};
pub use types::{
    Candidate, CaptionIssue, GenerationRequest, GenerationResult, QuotaDecision, ScoreResult,
    TodayContext,
};
