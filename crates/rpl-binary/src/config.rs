use serde::{Deserialize, Serialize};

/// 64 MiB, the same ceiling peers apply to a single message.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
/// Depth of nested objects and arrays accepted by default.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Limits applied before and during binary decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryConfig {
    /// Inputs longer than this are rejected before any byte is read.
    pub max_message_size: usize,
    /// Deepest allowed object/array nesting below the top-level object.
    pub max_nesting_depth: usize,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}
