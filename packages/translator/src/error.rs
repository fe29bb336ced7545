use thiserror::Error;

pub type TranslateResult<T> = Result<T, TranslateError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// Missing or malformed credential, or an unusable client setup
    #[error("Translator is not configured: {0}")]
    Config(String),

    /// Network failure, timeout or non-2xx response
    #[error("Language model request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The response held no usable patch array
    #[error("Could not read patches from the model response: {0}")]
    Parse(String),
}

impl TranslateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport { .. } => "transport",
            Self::Parse(_) => "parse",
        }
    }
}
