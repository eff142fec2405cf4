//! Canonical binary form of ledger objects.
//!
//! Objects travel between the typed model and this codec as JSON field
//! maps keyed by field name. The [`Registry`] maps names to wire keys and
//! fixes the canonical field order.
//!
//! # Key Types
//!
//! - [`Registry`] -- field name to `(type_code, field_code)` table
//! - [`BoundedReader`] -- byte-budgeted reader
//! - [`BinaryConfig`] -- message size and nesting limits
//! - [`EncodeMode`] -- full or signing serialization

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod field;
pub mod reader;

pub use config::BinaryConfig;
pub use decode::{decode, decode_object, read_amount, read_field_header, read_path_set, read_vl, read_vl_length};
pub use encode::{
    encode_object, write_amount, write_field_header, write_path_set, write_vl, write_vl_length, EncodeMode,
    MAX_VL_LENGTH,
};
pub use error::{BinaryError, BinaryResult};
pub use field::{build_registry, FieldDescriptor, FieldKey, FieldType, Registry};
pub use reader::BoundedReader;
