//! Value types for the ledger object model.
//!
//! Every other crate in the workspace builds on these. Each type has a raw
//! byte form used by the binary codec and a text form used in JSON.
//!
//! # Key Types
//!
//! - [`Hash128`], [`Hash160`], [`Hash256`] -- fixed-width hashes, uppercase hex
//! - [`Account`], [`RegularKey`] -- 160-bit ids with base58-check addresses
//! - [`PublicKey`], [`VariableLength`] -- keys and opaque blobs
//! - [`Amount`], [`Value`], [`Currency`] -- native drops or issued values
//! - [`PathSet`] -- payment paths
//! - [`RippleTime`] -- ledger clock
//! - [`TransactionType`], [`LedgerEntryType`], [`TransactionResult`] -- type codes
//! - [`ErrorKind`] -- error classification shared by the whole workspace

pub mod account;
pub mod amount;
pub mod codes;
pub mod error;
pub mod hash;
pub mod key;
pub mod path;
pub mod time;
pub mod uint;

pub use account::{decode_base58_check, encode_base58_check, Account, RegularKey, ACCOUNT_ID_VERSION};
pub use amount::{Amount, Currency, Value};
pub use codes::{LedgerEntryType, TransactionResult, TransactionType};
pub use error::{ErrorKind, TypeError, TypeResult};
pub use hash::{Hash128, Hash160, Hash256, HashInput, Vector256};
pub use key::{PublicKey, VariableLength};
pub use path::{Path, PathSet, PathStep};
pub use time::{RippleTime, RIPPLE_EPOCH_OFFSET};
pub use uint::HexU64;
