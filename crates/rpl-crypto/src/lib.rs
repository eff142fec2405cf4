//! Domain-separated hashing for the ledger object model.
//!
//! Every content hash is SHA-512-half over a four-byte [`HashPrefix`]
//! followed by a canonical binary payload.
//!
//! # Key Types
//!
//! - [`HashPrefix`] -- the eight domain tags
//! - [`ContentHasher`] -- a hasher bound to one prefix
//! - [`InnerNode`] -- 16-way tree node hashing
//! - [`LedgerNamespace`] -- ledger index derivation

pub mod hasher;
pub mod index;
pub mod prefix;
pub mod tree;

pub use hasher::{compute_hash, sha512_half, ContentHasher};
pub use index::{
    account_root_index, amendments_index, fee_settings_index, offer_index, owner_directory_index,
    ripple_state_index, skip_list_index, LedgerNamespace,
};
pub use prefix::HashPrefix;
pub use tree::{state_leaf_hash, transaction_leaf_hash, InnerNode};
