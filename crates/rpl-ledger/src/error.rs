use rpl_binary::BinaryError;
use rpl_types::{ErrorKind, Hash256, TypeError};

/// Errors produced while building or hashing ledger objects.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Binary(#[from] BinaryError),

    #[error("invalid field value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context} is missing {tag}")]
    MissingTag {
        tag: &'static str,
        context: &'static str,
    },

    #[error("no field set registered for ledger entry type {entry_type:?}")]
    NoFieldSetFactory { entry_type: String },

    #[error("affected node must carry exactly one of CreatedNode, ModifiedNode, DeletedNode (found {found})")]
    InvalidNodeEffect { found: usize },

    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("hash mismatch: declared {declared}, computed {computed}")]
    HashMismatch { declared: Hash256, computed: Hash256 },
}

impl LedgerError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Type(e) => e.kind(),
            Self::Binary(e) => e.kind(),
            Self::Json(e) if e.is_syntax() || e.is_eof() => ErrorKind::Syntax,
            Self::Json(_) | Self::HashMismatch { .. } => ErrorKind::MalformedValue,
            Self::MissingTag { .. }
            | Self::NoFieldSetFactory { .. }
            | Self::InvalidNodeEffect { .. }
            | Self::NotAnObject(_) => ErrorKind::ShapeMismatch,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
