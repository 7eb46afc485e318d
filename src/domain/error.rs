//! Domain error types.

/// Top-level error type for smalab.
#[derive(Debug, thiserror::Error)]
pub enum SmalabError {
    #[error("schema error: {reason}")]
    Schema { reason: String },

    #[error("invalid SMA window {window}: must be at least 1")]
    InvalidWindow { window: usize },

    #[error("too many SMA windows requested: {requested} (maximum {maximum})")]
    TooManyWindows { requested: usize, maximum: usize },

    #[error("invalid trade quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: u32 },

    #[error("invalid operand '{value}': expected 'Close' or 'SMA_<window>'")]
    InvalidOperand { value: String },

    #[error("invalid relation '{value}': expected 'greater than' or 'less than'")]
    InvalidRelation { value: String },

    #[error("strategy references SMA_{window}, which was never computed")]
    UnknownIndicator { window: usize },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SmalabError> for std::process::ExitCode {
    fn from(err: &SmalabError) -> Self {
        let code: u8 = match err {
            SmalabError::Io(_) => 1,
            SmalabError::ConfigParse { .. }
            | SmalabError::ConfigMissing { .. }
            | SmalabError::ConfigInvalid { .. } => 2,
            SmalabError::Schema { .. } => 3,
            SmalabError::InvalidWindow { .. }
            | SmalabError::TooManyWindows { .. }
            | SmalabError::InvalidQuantity { .. }
            | SmalabError::InvalidOperand { .. }
            | SmalabError::InvalidRelation { .. } => 4,
            SmalabError::UnknownIndicator { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
