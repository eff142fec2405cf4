use rpl_ledger::LedgerError;
use rpl_types::{ErrorKind, TypeError};
use thiserror::Error;

/// Errors raised by the JSON bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("{context} is missing {field}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    #[error("expected a JSON {expected} for {context}")]
    WrongShape {
        expected: &'static str,
        context: &'static str,
    },

    #[error("unknown stream message type {0:?}")]
    UnknownStreamType(String),

    #[error("document too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl BridgeError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Json(e) if e.is_syntax() || e.is_eof() => ErrorKind::Syntax,
            Self::Json(_) => ErrorKind::MalformedValue,
            Self::Ledger(e) => e.kind(),
            Self::Type(e) => e.kind(),
            Self::MissingField { .. } | Self::WrongShape { .. } => ErrorKind::ShapeMismatch,
            Self::UnknownStreamType(_) => ErrorKind::UnknownTypeCode,
            Self::TooLarge { .. } => ErrorKind::Limit,
            Self::Config(_) => ErrorKind::Syntax,
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
