use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tunable weights for the candidate quality score.
///
/// Every term of the score formula is represented here so the formula can be
/// re-tuned offline without code changes. Penalties are stored as positive
/// magnitudes and subtracted by the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub base: f32,
    pub length_fit_max: f32,
    pub tone_match_bonus: f32,
    pub tone_mismatch_penalty: f32,
    pub keyword_bonus: f32,
    pub keyword_bonus_cap: f32,
    pub hashtag_penalty: f32,
    pub story_phrase_penalty: f32,
    pub question_penalty: f32,
    pub cliche_penalty: f32,
    pub exclamation_penalty: f32,
    pub tone_forbidden_penalty: f32,
    pub generic_penalty: f32,
    pub literal_copy_penalty: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 50.0,
            length_fit_max: 20.0,
            tone_match_bonus: 15.0,
            tone_mismatch_penalty: 10.0,
            keyword_bonus: 3.0,
            keyword_bonus_cap: 12.0,
            hashtag_penalty: 8.0,
            story_phrase_penalty: 6.0,
            question_penalty: 6.0,
            cliche_penalty: 10.0,
            exclamation_penalty: 8.0,
            tone_forbidden_penalty: 6.0,
            generic_penalty: 5.0,
            literal_copy_penalty: 25.0,
        }
    }
}

/// Tunable weights for exemplar ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerWeights {
    pub similarity_weight: f32,
    pub popularity_weight: f32,
    pub tone_bonus: f32,
    pub popularity_cap: f32,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            similarity_weight: 0.6,
            popularity_weight: 0.3,
            tone_bonus: 0.1,
            popularity_cap: 500.0,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_tokens: u32,
    pub embedding_url: String,
    pub embedding_timeout_secs: u64,
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub style_rules_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scoring: ScoringWeights,
    pub ranking: RankerWeights,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_api_key", &"[redacted]")
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("embedding_url", &self.embedding_url)
            .field("embedding_timeout_secs", &self.embedding_timeout_secs)
            .field("qdrant_url", &self.qdrant_url)
            .field("qdrant_collection", &self.qdrant_collection)
            .field("style_rules_path", &self.style_rules_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scoring", &self.scoring)
            .field("ranking", &self.ranking)
            .finish()
    }
}
