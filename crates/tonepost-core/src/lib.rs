//! Shared configuration for the tonepost caption pipeline.
//!
//! Holds the env-driven [`AppConfig`], the tunable scoring weights, and the
//! immutable tone/style rule tables ([`StyleRules`]) every other crate reads.

use thiserror::Error;

pub mod app_config;
pub mod classify;
pub mod config;
pub mod rules;

pub use app_config::{AppConfig, Environment, RankerWeights, ScoringWeights};
pub use classify::{classify_tone, signal_hits};
pub use config::{load_app_config, load_app_config_from_env};
pub use rules::{StyleRules, Tone, ToneRules};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read style rules file {path}: {source}")]
    StyleRulesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse style rules file: {0}")]
    StyleRulesParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
