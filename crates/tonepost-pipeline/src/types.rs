use serde::{Deserialize, Serialize};

use tonepost_core::Tone;

/// Optional details about today's happenings, supplied by the shop owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodayContext {
    pub weather: Option<String>,
    pub inventory_status: Option<String>,
    pub customer_reaction: Option<String>,
}

impl TodayContext {
    /// The provided fields, in declaration order.
    #[must_use]
    pub fn provided_fields(&self) -> Vec<&str> {
        [&self.weather, &self.inventory_status, &self.customer_reaction]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .filter(|f| !f.trim().is_empty())
            .collect()
    }
}

/// One inbound caption request, handed over by the upstream request handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Business type, e.g. `"카페"`.
    pub category: String,
    pub tone: Tone,
    /// What the post is for, e.g. announcing a new menu item.
    pub purpose: String,
    /// The owner's free-text description of today.
    pub content: String,
    #[serde(default)]
    pub today_context: Option<TodayContext>,
}

impl GenerationRequest {
    /// Content plus any provided today-context fields, joined for embedding.
    #[must_use]
    pub fn context_text(&self) -> String {
        let mut parts = vec![self.content.as_str()];
        if let Some(ctx) = &self.today_context {
            parts.extend(ctx.provided_fields());
        }
        parts.join(" ")
    }
}

/// One generated draft. Request-scoped; only the selected survivor outlives
/// scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub story_phrases: Vec<String>,
    pub engagement_question: String,
}

impl Candidate {
    /// A candidate with no caption text carries no usable draft.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caption.trim().is_empty()
    }
}

/// Defects found by the scorer's lighter check, fed to the rewrite chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionIssue {
    LengthOutOfRange,
    ClichePhrase,
    ExcessExclamation,
    GenericPhrasing,
    RepetitiveEnding,
    LiteralContextCopy,
}

impl std::fmt::Display for CaptionIssue {
    /// Korean description, used verbatim inside rewrite instructions.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            CaptionIssue::LengthOutOfRange => "길이가 목표 범위를 벗어났습니다",
            CaptionIssue::ClichePhrase => "진부한 표현이 포함되어 있습니다",
            CaptionIssue::ExcessExclamation => "느낌표가 너무 많습니다",
            CaptionIssue::GenericPhrasing => "상투적인 인사말이 포함되어 있습니다",
            CaptionIssue::RepetitiveEnding => "문장 끝맺음이 반복됩니다",
            CaptionIssue::LiteralContextCopy => "입력 정보를 문장에 그대로 옮겨 적었습니다",
        };
        f.write_str(description)
    }
}

/// Scoring outcome for one candidate.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: f32,
    pub detected_tone: Tone,
    /// Ordered defect list from the lighter check.
    pub issues: Vec<CaptionIssue>,
    /// Whether a literal today-context copy was detected.
    pub literal_copy: bool,
}

/// The caller's entitlement verdict, produced by the upstream quota gate.
///
/// This pipeline trusts the verdict: `Exhausted` short-circuits before any
/// model call, `Allowed` is never re-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Exhausted,
}

/// The surviving candidate after scoring, rewriting, and sanitizing — the
/// only entity handed to durable storage.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub story_phrases: Vec<String>,
    pub engagement_question: String,
    /// Quality score of the selected draft, before rewriting.
    pub score: f32,
    /// Tone the finished caption classifies as.
    pub detected_tone: Tone,
}
