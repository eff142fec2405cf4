use rpl_types::{ErrorKind, TypeError};
use thiserror::Error;

use crate::field::FieldKey;

/// Errors raised while encoding or decoding the binary form.
#[derive(Debug, Error)]
pub enum BinaryError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("unknown field key {0}")]
    UnknownField(FieldKey),

    #[error("unknown field name {0:?}")]
    UnknownFieldName(String),

    #[error("truncated input: needed {needed} bytes, {remaining} left")]
    Truncated { needed: u64, remaining: u64 },

    #[error("framing error in {context}: {remaining} bytes left over")]
    Trailing {
        context: &'static str,
        remaining: u64,
    },

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("nesting deeper than {max} levels")]
    DepthExceeded { max: usize },

    #[error("invalid length prefix byte {0:#04x}")]
    InvalidLengthPrefix(u8),

    #[error("length {0} does not fit a length prefix")]
    LengthOverflow(usize),

    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unexpected {marker} inside {context}")]
    UnexpectedMarker {
        marker: &'static str,
        context: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinaryError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Type(e) => e.kind(),
            Self::UnknownField(_) | Self::UnknownFieldName(_) => ErrorKind::UnknownTypeCode,
            Self::Truncated { .. } | Self::Io(_) => ErrorKind::TruncatedInput,
            Self::Trailing { .. } => ErrorKind::FramingError,
            Self::MessageTooLarge { .. } | Self::DepthExceeded { .. } => ErrorKind::Limit,
            Self::InvalidLengthPrefix(_)
            | Self::LengthOverflow(_)
            | Self::InvalidValue { .. }
            | Self::UnexpectedMarker { .. } => ErrorKind::MalformedValue,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type BinaryResult<T> = Result<T, BinaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure() {
        assert_eq!(
            BinaryError::UnknownField(FieldKey::new(1, 15)).kind(),
            ErrorKind::UnknownTypeCode
        );
        assert_eq!(
            BinaryError::Truncated { needed: 4, remaining: 1 }.kind(),
            ErrorKind::TruncatedInput
        );
        assert_eq!(
            BinaryError::Trailing { context: "leaf", remaining: 2 }.kind(),
            ErrorKind::FramingError
        );
        assert_eq!(
            BinaryError::from(TypeError::InvalidCurrency("??".into())).kind(),
            ErrorKind::MalformedValue
        );
    }

    #[test]
    fn unknown_field_names_the_key() {
        let err = BinaryError::UnknownField(FieldKey::new(2, 99));
        assert_eq!(err.to_string(), "unknown field key (2, 99)");
    }
}
