//! Typed ledger object model.
//!
//! Transactions, state entries, metadata and ledger headers as Rust types,
//! with conversion to and from the canonical binary form and the hashes
//! that identify them. Objects cross into the binary codec as JSON field
//! maps; the factory tables pick the typed payload for each type tag.
//!
//! # Key Types
//!
//! - [`Transaction`] -- shared fields plus a per-type [`TxKind`], with a cached hash
//! - [`LedgerEntry`] -- an [`EntryFields`] set stored under a ledger index
//! - [`MetaData`] -- result code and [`NodeEffect`]s for one transaction
//! - [`TransactionWithMetaData`] -- a transaction as stored in a closed ledger
//! - [`Ledger`] / [`LedgerHeader`] -- a closed ledger and its hashed header
//! - [`LedgerObject`] -- the behaviour all typed objects share

pub mod config;
pub mod entry;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod metadata;
pub mod object;
pub mod transaction;
pub mod txm;

pub use config::UnknownTypePolicy;
pub use entry::{
    AccountRootFields, AmendmentsFields, DirectoryNodeFields, EntryFields, FeeSettingsFields, LedgerEntry,
    LedgerHashesFields, OfferFields, OpaqueFields, RippleStateFields,
};
pub use error::{LedgerError, LedgerResult};
pub use factory::{fields_factory, tx_factory, FieldsConstructor, TxConstructor};
pub use ledger::{Ledger, LedgerHeader};
pub use metadata::{AffectedNode, MetaData, NodeAction, NodeEffect};
pub use object::{FieldMap, LedgerObject};
pub use transaction::{
    AccountSet, EnableAmendment, Memo, MemoEntry, OfferCancel, OfferCreate, OpaqueTx, Payment, SetFee,
    SetRegularKey, Transaction, TrustSet, TxCommon, TxKind,
};
pub use txm::TransactionWithMetaData;
