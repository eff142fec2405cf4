//! Subscription stream messages.
//!
//! Each message names its kind in a `type` key; [`StreamMessage::decode`]
//! looks the kind up in a fixed constructor table.

use rpl_binary::Registry;
use rpl_ledger::TransactionWithMetaData;
use rpl_types::{Hash256, RippleTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::envelope::{object, parse_document};
use crate::error::{BridgeError, BridgeResult};
use crate::transaction::{encode_transaction_pair, pair_from_value};

/// Sent when a ledger closes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStreamMsg {
    /// Base fee in drops.
    pub fee_base: u64,
    /// Reference transaction cost in fee units.
    pub fee_ref: u64,
    pub ledger_index: u32,
    pub ledger_hash: Hash256,
    /// Close time of the ledger.
    pub ledger_time: RippleTime,
    /// Account reserve in drops.
    pub reserve_base: u64,
    /// Owner reserve increment in drops.
    pub reserve_inc: u64,
    /// Ranges of validated ledgers, e.g. `32570-348860`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_ledgers: Option<String>,
    /// Transactions in the closed ledger.
    #[serde(default)]
    pub txn_count: u32,
}

/// Sent when the server's load or status changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStreamMsg {
    pub server_status: String,
    pub load_base: u32,
    pub load_factor: u32,
}

/// The keys of a transaction message other than the transaction pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutcome {
    /// Result code name, e.g. `tesSUCCESS`.
    pub engine_result: String,
    pub engine_result_code: i32,
    /// Human-readable explanation of the result.
    pub engine_result_message: String,
    /// Present once the ledger is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_hash: Option<Hash256>,
    /// Ledger the transaction was applied to.
    pub ledger_index: u32,
    /// `closed` or `proposed`.
    pub status: String,
    /// Whether the ledger holding the transaction is validated.
    #[serde(default)]
    pub validated: bool,
}

/// Sent for each transaction applied to a ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionStreamMsg {
    pub transaction: TransactionWithMetaData,
    pub outcome: EngineOutcome,
}

/// A decoded subscription message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    LedgerClosed(LedgerStreamMsg),
    Transaction(Box<TransactionStreamMsg>),
    ServerStatus(ServerStreamMsg),
}

type StreamConstructor = fn(&Json, &BridgeConfig) -> BridgeResult<StreamMessage>;

const STREAM_TYPES: &[(&str, StreamConstructor)] = &[
    ("ledgerClosed", ledger_closed),
    ("transaction", transaction),
    ("serverStatus", server_status),
];

fn ledger_closed(value: &Json, _config: &BridgeConfig) -> BridgeResult<StreamMessage> {
    Ok(StreamMessage::LedgerClosed(LedgerStreamMsg::deserialize(value)?))
}

fn server_status(value: &Json, _config: &BridgeConfig) -> BridgeResult<StreamMessage> {
    Ok(StreamMessage::ServerStatus(ServerStreamMsg::deserialize(value)?))
}

fn transaction(value: &Json, config: &BridgeConfig) -> BridgeResult<StreamMessage> {
    let outcome = EngineOutcome::deserialize(value)?;
    let transaction = pair_from_value(value, Some(outcome.ledger_index), config)?;
    Ok(StreamMessage::Transaction(Box::new(TransactionStreamMsg { transaction, outcome })))
}

impl StreamMessage {
    /// The `type` tag this message is sent under.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LedgerClosed(_) => "ledgerClosed",
            Self::Transaction(_) => "transaction",
            Self::ServerStatus(_) => "serverStatus",
        }
    }

    /// Parse and decode one message.
    pub fn decode(text: &str, config: &BridgeConfig) -> BridgeResult<Self> {
        let value = parse_document(text, config)?;
        Self::from_value(&value, config)
    }

    /// Fails with `UnknownStreamType` for unlisted `type` tags.
    pub fn from_value(value: &Json, config: &BridgeConfig) -> BridgeResult<Self> {
        let kind = object(value, "stream message")?
            .get("type")
            .and_then(Json::as_str)
            .ok_or(BridgeError::MissingField {
                field: "type",
                context: "stream message",
            })?;
        let (_, build) = STREAM_TYPES
            .iter()
            .find(|(name, _)| *name == kind)
            .ok_or_else(|| BridgeError::UnknownStreamType(kind.to_string()))?;
        let message = build(value, config)?;
        debug!(kind, "decoded stream message");
        Ok(message)
    }

    /// Encode with the `type` tag restored.
    pub fn to_json(&self, registry: &Registry) -> BridgeResult<Json> {
        let mut value = match self {
            Self::LedgerClosed(msg) => serde_json::to_value(msg)?,
            Self::ServerStatus(msg) => serde_json::to_value(msg)?,
            Self::Transaction(msg) => {
                let mut value = encode_transaction_pair(&msg.transaction, registry)?;
                if let (Json::Object(map), Json::Object(outcome)) = (&mut value, serde_json::to_value(&msg.outcome)?) {
                    map.extend(outcome);
                }
                value
            }
        };
        if let Json::Object(map) = &mut value {
            map.insert("type".into(), Json::String(self.type_name().to_string()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_binary::build_registry;
    use rpl_types::ErrorKind;

    const LEDGER_CLOSED: &str = r#"{
        "fee_base": 10,
        "fee_ref": 10,
        "ledger_hash": "687F604EF6B2F67319E8DCC8C66EF49D84D18A1E18F948421FC24D2C7C3DB464",
        "ledger_index": 7125358,
        "ledger_time": 455751310,
        "reserve_base": 20000000,
        "reserve_inc": 5000000,
        "txn_count": 7,
        "type": "ledgerClosed",
        "validated_ledgers": "32570-7125358"
    }"#;

    const TRANSACTION: &str = r#"{
        "engine_result": "tesSUCCESS",
        "engine_result_code": 0,
        "engine_result_message": "The transaction was applied.",
        "ledger_hash": "687F604EF6B2F67319E8DCC8C66EF49D84D18A1E18F948421FC24D2C7C3DB464",
        "ledger_index": 7125358,
        "meta": {
            "AffectedNodes": [],
            "TransactionIndex": 2,
            "TransactionResult": "tesSUCCESS"
        },
        "status": "closed",
        "transaction": {
            "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "Fee": "12",
            "LimitAmount": {
                "currency": "USD",
                "issuer": "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe",
                "value": "100"
            },
            "Sequence": 5,
            "SigningPubKey": "",
            "TransactionType": "TrustSet",
            "hash": "5E5A5D1C2A34E0B7D0F4E6D1A8C3B2F1E0D9C8B7A6F5E4D3C2B1A0F9E8D7C6B5"
        },
        "type": "transaction",
        "validated": true
    }"#;

    #[test]
    fn ledger_closed_message() {
        let msg = StreamMessage::decode(LEDGER_CLOSED, &BridgeConfig::default()).unwrap();
        let StreamMessage::LedgerClosed(ledger) = &msg else {
            panic!("unexpected message {msg:?}");
        };
        assert_eq!(ledger.ledger_index, 7125358);
        assert_eq!(ledger.txn_count, 7);
        let registry = build_registry();
        let expected: Json = serde_json::from_str(LEDGER_CLOSED).unwrap();
        assert_eq!(msg.to_json(&registry).unwrap(), expected);
    }

    #[test]
    fn transaction_message_decodes_pair() {
        let msg = StreamMessage::decode(TRANSACTION, &BridgeConfig::default()).unwrap();
        let StreamMessage::Transaction(tx) = &msg else {
            panic!("unexpected message {msg:?}");
        };
        assert_eq!(tx.transaction.ledger_sequence, 7125358);
        assert_eq!(tx.transaction.metadata.as_ref().unwrap().transaction_index, 2);
        assert_eq!(tx.outcome.engine_result, "tesSUCCESS");
        assert!(tx.outcome.validated);

        let registry = build_registry();
        let expected: Json = serde_json::from_str(TRANSACTION).unwrap();
        assert_eq!(msg.to_json(&registry).unwrap(), expected);
    }

    #[test]
    fn server_status_message() {
        let text = r#"{"type": "serverStatus", "server_status": "full", "load_base": 256, "load_factor": 256}"#;
        let msg = StreamMessage::decode(text, &BridgeConfig::default()).unwrap();
        assert_eq!(
            msg,
            StreamMessage::ServerStatus(ServerStreamMsg {
                server_status: "full".into(),
                load_base: 256,
                load_factor: 256,
            })
        );
    }

    #[test]
    fn unknown_or_missing_type() {
        let err = StreamMessage::decode(r#"{"type": "peerStatus"}"#, &BridgeConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeCode);
        let err = StreamMessage::decode(r#"{"ledger_index": 1}"#, &BridgeConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }
}
