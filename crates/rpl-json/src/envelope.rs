//! First decoding pass: read the tags that choose how the rest of a
//! document is decoded.

use rpl_ledger::FieldMap;
use rpl_types::Hash256;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::trace;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};

/// Parse JSON text after checking it against the configured size limit.
pub fn parse_document(text: &str, config: &BridgeConfig) -> BridgeResult<Json> {
    let max = config.binary.max_message_size;
    if text.len() > max {
        return Err(BridgeError::TooLarge { size: text.len(), max });
    }
    let value = serde_json::from_str(text)?;
    trace!(bytes = text.len(), "parsed JSON document");
    Ok(value)
}

pub(crate) fn object<'a>(value: &'a Json, context: &'static str) -> BridgeResult<&'a FieldMap> {
    value.as_object().ok_or(BridgeError::WrongShape {
        expected: "object",
        context,
    })
}

pub(crate) fn array<'a>(value: &'a Json, context: &'static str) -> BridgeResult<&'a Vec<Json>> {
    value.as_array().ok_or(BridgeError::WrongShape {
        expected: "array",
        context,
    })
}

/// Protocol fields only. Server-derived keys such as `hash`, `meta` or
/// `index` start with a lower-case letter; protocol field names never do.
pub fn protocol_fields(map: &FieldMap) -> FieldMap {
    map.iter()
        .filter(|(key, _)| key.starts_with(|c: char| c.is_ascii_uppercase()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Which key a transaction document carries its metadata under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaShape {
    /// `meta`, as in `tx` responses and stream pairs.
    Meta,
    /// `metaData`, as in expanded ledger transaction lists.
    MetaData,
    Absent,
}

impl MetaShape {
    /// The document key metadata is found under.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Meta => Some("meta"),
            Self::MetaData => Some("metaData"),
            Self::Absent => None,
        }
    }
}

#[derive(Deserialize)]
struct RawTxEnvelope {
    #[serde(rename = "TransactionType")]
    transaction_type: Option<String>,
    hash: Option<Hash256>,
    meta: Option<IgnoredAny>,
    #[serde(rename = "metaData")]
    meta_data: Option<IgnoredAny>,
    ledger_index: Option<u32>,
    #[serde(rename = "inLedger")]
    in_ledger: Option<u32>,
}

/// The tags of a transaction-with-metadata document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEnvelope {
    pub transaction_type: String,
    pub hash: Hash256,
    /// Which metadata key the document used.
    pub meta_shape: MetaShape,
    /// `ledger_index`, falling back to `inLedger`.
    pub ledger_index: Option<u32>,
}

impl TxEnvelope {
    /// Read the tags without decoding the protocol fields.
    pub fn sniff(value: &Json) -> BridgeResult<Self> {
        object(value, "transaction")?;
        let raw = RawTxEnvelope::deserialize(value)?;
        let transaction_type = raw.transaction_type.ok_or(BridgeError::MissingField {
            field: "TransactionType",
            context: "transaction",
        })?;
        let hash = raw.hash.ok_or(BridgeError::MissingField {
            field: "hash",
            context: "transaction",
        })?;
        let meta_shape = match (raw.meta, raw.meta_data) {
            (Some(_), _) => MetaShape::Meta,
            (None, Some(_)) => MetaShape::MetaData,
            (None, None) => MetaShape::Absent,
        };
        Ok(Self {
            transaction_type,
            hash,
            meta_shape,
            ledger_index: raw.ledger_index.or(raw.in_ledger),
        })
    }
}

#[derive(Deserialize)]
struct RawEntryEnvelope {
    #[serde(rename = "LedgerEntryType")]
    ledger_entry_type: Option<String>,
    index: Option<Hash256>,
}

/// The tags of a ledger-entry document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryEnvelope {
    pub ledger_entry_type: String,
    pub index: Hash256,
}

impl EntryEnvelope {
    /// Read the tags without decoding the protocol fields.
    pub fn sniff(value: &Json) -> BridgeResult<Self> {
        object(value, "ledger entry")?;
        let raw = RawEntryEnvelope::deserialize(value)?;
        Ok(Self {
            ledger_entry_type: raw.ledger_entry_type.ok_or(BridgeError::MissingField {
                field: "LedgerEntryType",
                context: "ledger entry",
            })?,
            index: raw.index.ok_or(BridgeError::MissingField {
                field: "index",
                context: "ledger entry",
            })?,
        })
    }
}
