use rpl_binary::Registry;
use rpl_ledger::{Ledger, LedgerHeader};
use rpl_types::{Hash256, RippleTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::entries::{decode_ledger_entries, encode_ledger_entries};
use crate::envelope::{array, parse_document};
use crate::error::{BridgeError, BridgeResult};
use crate::transaction::transaction_from_value;

/// Integers the server writes as JSON strings; numbers are accepted too.
mod text_number {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value as Json;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Json::deserialize(deserializer)? {
            Json::String(s) => s.parse().map_err(D::Error::custom),
            Json::Number(n) => n.to_string().parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected an integer or integer string, got {other}"))),
        }
    }
}

/// The header keys of a ledger document.
///
/// `parent_close_time` and `close_flags` are read when present but never
/// written; the legacy document does not carry them.
#[derive(Serialize, Deserialize)]
struct HeaderDoc {
    #[serde(with = "text_number")]
    ledger_index: u32,
    #[serde(with = "text_number")]
    total_coins: u64,
    parent_hash: Hash256,
    transaction_hash: Hash256,
    account_hash: Hash256,
    close_time: RippleTime,
    close_time_resolution: u8,
    #[serde(default, skip_serializing)]
    parent_close_time: RippleTime,
    #[serde(default, skip_serializing)]
    close_flags: u8,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    accepted: bool,
    #[serde(default, skip_serializing)]
    hash: Option<Hash256>,
    #[serde(default, skip_serializing)]
    ledger_hash: Option<Hash256>,
}

/// Decode a ledger document with expanded transactions and state.
///
/// A declared `hash` (or `ledger_hash`) seeds the ledger's hash cache.
/// Each transaction without its own ledger index takes the ledger's.
pub fn decode_ledger(text: &str, config: &BridgeConfig) -> BridgeResult<Ledger> {
    let value = parse_document(text, config)?;
    let doc = HeaderDoc::deserialize(&value)?;
    let header = LedgerHeader {
        ledger_sequence: doc.ledger_index,
        total_drops: doc.total_coins,
        parent_hash: doc.parent_hash,
        transaction_hash: doc.transaction_hash,
        account_hash: doc.account_hash,
        parent_close_time: doc.parent_close_time,
        close_time: doc.close_time,
        close_resolution: doc.close_time_resolution,
        close_flags: doc.close_flags,
    };
    let sequence = header.ledger_sequence;
    let mut ledger = Ledger::new(header);
    ledger.closed = doc.closed;
    ledger.accepted = doc.accepted;
    if let Some(hash) = doc.hash.or(doc.ledger_hash) {
        ledger.set_hash(hash);
    }

    if let Some(transactions) = value.get("transactions").filter(|v| !v.is_null()) {
        for tx in array(transactions, "ledger transactions")? {
            ledger.push_transaction(transaction_from_value(tx, Some(sequence), config)?);
        }
    }
    if let Some(state) = value.get("accountState").filter(|v| !v.is_null()) {
        for entry in decode_ledger_entries(state, config)? {
            ledger.push_entry(entry);
        }
    }
    debug!(
        sequence,
        transactions = ledger.transactions().len(),
        entries = ledger.account_state().len(),
        "decoded ledger"
    );
    Ok(ledger)
}

/// Encode a ledger with its derived keys: `hash`, `ledger_hash`,
/// `close_time_human`, and the legacy `seqNum` and `totalCoins`.
///
/// The hash written is the ledger's cached one, so a decoded document
/// keeps the hash it declared even though `parent_close_time` and
/// `close_flags` are not written back out.
pub fn encode_ledger(ledger: &Ledger, registry: &Registry) -> BridgeResult<Json> {
    let header = ledger.header();
    let doc = HeaderDoc {
        ledger_index: header.ledger_sequence,
        total_coins: header.total_drops,
        parent_hash: header.parent_hash,
        transaction_hash: header.transaction_hash,
        account_hash: header.account_hash,
        close_time: header.close_time,
        close_time_resolution: header.close_resolution,
        parent_close_time: header.parent_close_time,
        close_flags: header.close_flags,
        closed: ledger.closed,
        accepted: ledger.accepted,
        hash: None,
        ledger_hash: None,
    };
    let Json::Object(mut map) = serde_json::to_value(&doc)? else {
        return Err(BridgeError::WrongShape {
            expected: "object",
            context: "ledger header",
        });
    };
    let hash = Json::String(ledger.hash().to_hex());
    map.insert("hash".into(), hash.clone());
    map.insert("ledger_hash".into(), hash);
    map.insert("close_time_human".into(), Json::String(header.close_time.human()));
    map.insert("seqNum".into(), Json::String(header.ledger_sequence.to_string()));
    map.insert("totalCoins".into(), Json::String(header.total_drops.to_string()));

    let mut transactions = Vec::with_capacity(ledger.transactions().len());
    for txm in ledger.transactions() {
        let mut tx = txm.transaction.to_field_map()?;
        tx.insert("hash".into(), Json::String(txm.hash(registry)?.to_hex()));
        if let Some(meta) = &txm.metadata {
            tx.insert("metaData".into(), Json::Object(meta.to_field_map()?));
        }
        transactions.push(Json::Object(tx));
    }
    map.insert("transactions".into(), Json::Array(transactions));
    map.insert("accountState".into(), encode_ledger_entries(ledger.account_state())?);
    Ok(Json::Object(map))
}
