use crate::policy::types::Stage;
use crate::rules::severity::Severity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error(
        "invalid policy for {stage}: blockOnOrAbove {block_on_or_above} is below warnOnOrAbove {warn_on_or_above}"
    )]
    InvalidPolicyInvariant {
        stage: Stage,
        block_on_or_above: Severity,
        warn_on_or_above: Severity,
    },

    #[error("determinism violation: {0}")]
    DeterminismViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
