use alloc::borrow::Cow;
use grpc_stream::FrameError;

/// Building the outbound body failed; nothing was produced.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The record did not pass [`Verify`](crate::Verify).
    #[error("invalid chat request: {0}")]
    Validation(Cow<'static, str>),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Option or rule set rejected while being compiled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("unsupported regex flag {flag:?} in {flags:?}")]
    UnsupportedFlag { flag: char, flags: String },

    #[error("invalid message range {0:?}")]
    InvalidRange(String),

    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML options: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    #[inline]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::UnsupportedFlag { .. } => "unsupported_flag",
            Self::InvalidRange(_) => "invalid_range",
            Self::Json(_) | Self::Toml(_) => "invalid_options",
        }
    }
}
