use rpl_binary::Registry;
use rpl_ledger::{MetaData, Transaction, TransactionWithMetaData};
use serde_json::Value as Json;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::envelope::{object, parse_document, protocol_fields, TxEnvelope};
use crate::error::{BridgeError, BridgeResult};

/// Decode a transaction document carrying its hash and metadata, as
/// returned by `tx` and `account_tx` requests.
///
/// `TransactionType` and `hash` are required. Metadata is read from `meta`
/// or `metaData`; a document with neither decodes without metadata.
pub fn decode_transaction_with_metadata(text: &str, config: &BridgeConfig) -> BridgeResult<TransactionWithMetaData> {
    let value = parse_document(text, config)?;
    transaction_from_value(&value, None, config)
}

/// Decode a stream pair `{"transaction": {...}, "meta": {...}}`.
///
/// `meta` is spliced into the transaction before the usual decode.
pub fn decode_transaction_pair(text: &str, config: &BridgeConfig) -> BridgeResult<TransactionWithMetaData> {
    let value = parse_document(text, config)?;
    pair_from_value(&value, None, config)
}

/// Encode in the `tx` response shape: the transaction's fields followed by
/// `hash`, `inLedger`, `ledger_index` and, when known, `meta`.
pub fn encode_transaction_with_metadata(txm: &TransactionWithMetaData, registry: &Registry) -> BridgeResult<Json> {
    let mut map = txm.transaction.to_field_map()?;
    map.insert("hash".into(), Json::String(txm.hash(registry)?.to_hex()));
    map.insert("inLedger".into(), Json::from(txm.ledger_sequence));
    map.insert("ledger_index".into(), Json::from(txm.ledger_sequence));
    if let Some(meta) = &txm.metadata {
        map.insert("meta".into(), Json::Object(meta.to_field_map()?));
    }
    Ok(Json::Object(map))
}

/// Encode as a stream pair; the transaction keeps its `hash`.
pub fn encode_transaction_pair(txm: &TransactionWithMetaData, registry: &Registry) -> BridgeResult<Json> {
    let mut transaction = txm.transaction.to_field_map()?;
    transaction.insert("hash".into(), Json::String(txm.hash(registry)?.to_hex()));
    let mut map = serde_json::Map::new();
    if let Some(meta) = &txm.metadata {
        map.insert("meta".into(), Json::Object(meta.to_field_map()?));
    }
    map.insert("transaction".into(), Json::Object(transaction));
    Ok(Json::Object(map))
}

pub(crate) fn pair_from_value(
    value: &Json,
    ledger_sequence: Option<u32>,
    config: &BridgeConfig,
) -> BridgeResult<TransactionWithMetaData> {
    let pair = object(value, "transaction pair")?;
    let transaction = pair.get("transaction").ok_or(BridgeError::MissingField {
        field: "transaction",
        context: "transaction pair",
    })?;
    let mut spliced = object(transaction, "transaction")?.clone();
    if let Some(meta) = pair.get("meta") {
        spliced.insert("meta".into(), meta.clone());
    }
    transaction_from_value(&Json::Object(spliced), ledger_sequence, config)
}

/// Second pass: the envelope picks the metadata key and supplies the
/// declared hash; the protocol fields go to the typed model.
pub(crate) fn transaction_from_value(
    value: &Json,
    ledger_sequence: Option<u32>,
    config: &BridgeConfig,
) -> BridgeResult<TransactionWithMetaData> {
    let envelope = TxEnvelope::sniff(value)?;
    let map = object(value, "transaction")?;

    let mut transaction = Transaction::from_field_map(&protocol_fields(map), config.unknown_types)?;
    transaction.set_hash(envelope.hash);

    let metadata = match envelope.meta_shape.key().and_then(|key| map.get(key)) {
        Some(meta) => Some(MetaData::from_json(meta)?),
        None => None,
    };

    let ledger_sequence = envelope.ledger_index.or(ledger_sequence).unwrap_or_default();
    debug!(
        tx_type = %envelope.transaction_type,
        hash = %envelope.hash,
        meta = ?envelope.meta_shape,
        nodes = metadata.as_ref().map_or(0, |m| m.affected_nodes.len()),
        "decoded transaction with metadata"
    );
    Ok(TransactionWithMetaData {
        transaction,
        metadata,
        ledger_sequence,
    })
}
