//! JSON bridge for the ledger object model.
//!
//! Decoding runs in two passes over a parsed `serde_json::Value`: an
//! envelope pass reads the tags that select a shape (`TransactionType`,
//! `LedgerEntryType`, `hash`, `index`, which metadata key is used), then
//! the protocol fields go to the typed model. Encoding writes the typed
//! model back out with the server's derived keys added.
//!
//! # Key Types
//!
//! - [`BridgeConfig`] -- unknown-type policy and input limits, loadable from TOML
//! - [`TxEnvelope`] / [`EntryEnvelope`] -- the first-pass tags
//! - [`StreamMessage`] -- `ledgerClosed`, `transaction` and `serverStatus` messages

pub mod config;
pub mod entries;
pub mod envelope;
pub mod error;
pub mod ledger;
pub mod stream;
pub mod transaction;

pub use config::BridgeConfig;
pub use entries::{decode_ledger_entries, encode_ledger_entries};
pub use envelope::{parse_document, protocol_fields, EntryEnvelope, MetaShape, TxEnvelope};
pub use error::{BridgeError, BridgeResult};
pub use ledger::{decode_ledger, encode_ledger};
pub use stream::{EngineOutcome, LedgerStreamMsg, ServerStreamMsg, StreamMessage, TransactionStreamMsg};
pub use transaction::{
    decode_transaction_pair, decode_transaction_with_metadata, encode_transaction_pair,
    encode_transaction_with_metadata,
};
