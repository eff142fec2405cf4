use std::fmt;

use thiserror::Error;

/// Coarse classification shared by every error type in the workspace.
///
/// Callers that only need to decide "skip, abort, or report" match on this
/// instead of on the concrete error enums of each crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong byte length, bad hex, bad base58-check, bad amount text.
    MalformedValue,
    /// Transaction type, ledger-entry type or field key not in the registry.
    UnknownTypeCode,
    /// Input ended while a value was still being read.
    TruncatedInput,
    /// JSON did not carry the tags needed to pick a concrete type.
    ShapeMismatch,
    /// Bytes left over after a length-prefixed value was decoded.
    FramingError,
    /// Configured message size or nesting depth exceeded.
    Limit,
    /// Text that is not JSON at all.
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedValue => "malformed value",
            Self::UnknownTypeCode => "unknown type code",
            Self::TruncatedInput => "truncated input",
            Self::ShapeMismatch => "shape mismatch",
            Self::FramingError => "framing error",
            Self::Limit => "limit exceeded",
            Self::Syntax => "syntax error",
        };
        f.write_str(name)
    }
}

/// Errors produced while constructing value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string {input:?}: {reason}")]
    InvalidHex { input: String, reason: String },

    #[error("invalid {type_name} length: expected {expected} bytes, got {actual} ({input})")]
    InvalidLength {
        type_name: &'static str,
        expected: usize,
        actual: usize,
        input: String,
    },

    #[error("invalid base58 {input:?}: {reason}")]
    InvalidBase58 { input: String, reason: String },

    #[error("base58 checksum mismatch in {input:?}")]
    ChecksumMismatch { input: String },

    #[error("wrong version byte in {input:?}: expected {expected}, got {actual}")]
    WrongVersion {
        input: String,
        expected: u8,
        actual: u8,
    },

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid currency {0:?}")]
    InvalidCurrency(String),

    #[error("invalid ledger time {input:?}: {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("unknown {kind} name {name:?}")]
    UnknownName { kind: &'static str, name: String },

    #[error("unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: u16 },
}

impl TypeError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownName { .. } | Self::UnknownCode { .. } => ErrorKind::UnknownTypeCode,
            _ => ErrorKind::MalformedValue,
        }
    }

    pub(crate) fn hex(input: &str, err: hex::FromHexError) -> Self {
        Self::InvalidHex {
            input: input.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type TypeResult<T> = Result<T, TypeError>;
