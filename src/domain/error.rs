//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for ematrend.
///
/// Everything here is deterministic and data-dependent; indicator warm-up and
/// zero-size entries are deliberately *not* errors (they degrade to no-op
/// decisions inside the policies).
#[derive(Debug, thiserror::Error)]
pub enum EmatrendError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("invalid bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },

    #[error("bar dates not strictly increasing: {prev} followed by {next}")]
    NonIncreasingDates { prev: NaiveDate, next: NaiveDate },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown policy '{name}' (expected full, fixed or trailing)")]
    UnknownPolicy { name: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EmatrendError> for std::process::ExitCode {
    fn from(err: &EmatrendError) -> Self {
        let code: u8 = match err {
            EmatrendError::Io(_) => 1,
            EmatrendError::ConfigParse { .. }
            | EmatrendError::ConfigMissing { .. }
            | EmatrendError::ConfigInvalid { .. }
            | EmatrendError::UnknownPolicy { .. } => 2,
            EmatrendError::Data { .. }
            | EmatrendError::InvalidBar { .. }
            | EmatrendError::NonIncreasingDates { .. } => 3,
            EmatrendError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
