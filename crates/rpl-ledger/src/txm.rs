use rpl_binary::{decode_object, read_vl_length, write_vl, BinaryConfig, BinaryError, BoundedReader, Registry};
use rpl_crypto::transaction_leaf_hash;
use rpl_types::Hash256;

use crate::config::UnknownTypePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::metadata::MetaData;
use crate::transaction::Transaction;

/// A transaction as it sits in a closed ledger: with its metadata and the
/// sequence of the ledger that holds it.
///
/// Documents that predate metadata, or omit it, decode with `metadata` set
/// to `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionWithMetaData {
    pub transaction: Transaction,
    pub metadata: Option<MetaData>,
    /// Sequence of the containing ledger; 0 when the source did not say.
    pub ledger_sequence: u32,
}

impl TransactionWithMetaData {
    /// Transaction with metadata attached.
    pub fn new(transaction: Transaction, metadata: MetaData, ledger_sequence: u32) -> Self {
        Self {
            transaction,
            metadata: Some(metadata),
            ledger_sequence,
        }
    }

    /// A transaction whose metadata is not known.
    pub fn without_metadata(transaction: Transaction, ledger_sequence: u32) -> Self {
        Self {
            transaction,
            metadata: None,
            ledger_sequence,
        }
    }

    /// The metadata, or a shape error naming it when absent.
    pub fn require_metadata(&self) -> LedgerResult<&MetaData> {
        self.metadata.as_ref().ok_or(LedgerError::MissingTag {
            tag: "meta",
            context: "transaction leaf",
        })
    }

    /// The transaction's identifying hash.
    pub fn hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        self.transaction.hash(registry)
    }

    /// Transaction-tree leaf payload: the transaction and its metadata, each
    /// behind a length prefix. Requires metadata.
    pub fn to_leaf_bytes(&self, registry: &Registry) -> LedgerResult<Vec<u8>> {
        let metadata = self.require_metadata()?;
        let mut out = Vec::new();
        write_vl(&mut out, &self.transaction.to_binary(registry)?)?;
        write_vl(&mut out, &metadata.to_binary(registry)?)?;
        Ok(out)
    }

    /// Decode a leaf payload. Each part must fill its length prefix exactly
    /// and nothing may follow the metadata.
    pub fn from_leaf_bytes(
        registry: &Registry,
        bytes: &[u8],
        ledger_sequence: u32,
        config: &BinaryConfig,
    ) -> LedgerResult<Self> {
        if bytes.len() > config.max_message_size {
            return Err(BinaryError::MessageTooLarge {
                size: bytes.len(),
                max: config.max_message_size,
            }
            .into());
        }
        let mut reader = BoundedReader::from_slice(bytes);

        let len = read_vl_length(&mut reader)?;
        let mut part = reader.nested(len as u64)?;
        let tx_map = decode_object(registry, &mut part, config)?;
        part.finish("transaction")?;

        let len = read_vl_length(&mut reader)?;
        let mut part = reader.nested(len as u64)?;
        let meta_map = decode_object(registry, &mut part, config)?;
        part.finish("metadata")?;

        reader.finish("transaction leaf")?;

        Ok(Self {
            transaction: Transaction::from_field_map(&tx_map, UnknownTypePolicy::Reject)?,
            metadata: Some(MetaData::from_field_map(&meta_map)?),
            ledger_sequence,
        })
    }

    /// Transaction-tree leaf hash over the leaf payload and the
    /// transaction hash.
    pub fn leaf_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        let leaf = self.to_leaf_bytes(registry)?;
        Ok(transaction_leaf_hash(&leaf, &self.hash(registry)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_binary::build_registry;
    use rpl_crypto::ContentHasher;
    use rpl_types::{ErrorKind, TransactionResult};
    use serde_json::json;

    fn sample() -> TransactionWithMetaData {
        let tx = json!({
            "TransactionType": "OfferCancel",
            "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "Fee": "12",
            "Sequence": 9,
            "OfferSequence": 7,
            "SigningPubKey": "",
            "TxnSignature": "3045022100AA"
        });
        let transaction = Transaction::from_json(&tx, UnknownTypePolicy::Reject).unwrap();
        TransactionWithMetaData::new(transaction, MetaData::new(3, TransactionResult::Success), 32570)
    }

    #[test]
    fn leaf_bytes_round_trip() {
        let registry = build_registry();
        let txm = sample();
        let leaf = txm.to_leaf_bytes(&registry).unwrap();
        let back =
            TransactionWithMetaData::from_leaf_bytes(&registry, &leaf, 32570, &BinaryConfig::default()).unwrap();
        assert_eq!(back, txm);
    }

    #[test]
    fn leaf_hash_covers_payload_and_id() {
        let registry = build_registry();
        let txm = sample();
        let mut payload = txm.to_leaf_bytes(&registry).unwrap();
        payload.extend_from_slice(txm.hash(&registry).unwrap().as_bytes());
        assert_eq!(
            txm.leaf_hash(&registry).unwrap(),
            ContentHasher::TRANSACTION_NODE.hash(&payload)
        );
    }

    #[test]
    fn trailing_bytes_are_a_framing_error() {
        let registry = build_registry();
        let mut leaf = sample().to_leaf_bytes(&registry).unwrap();
        leaf.push(0x00);
        let err = TransactionWithMetaData::from_leaf_bytes(&registry, &leaf, 1, &BinaryConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FramingError);
    }

    #[test]
    fn leaf_needs_metadata() {
        let registry = build_registry();
        let txm = TransactionWithMetaData::without_metadata(sample().transaction, 1);
        let err = txm.to_leaf_bytes(&registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(txm.leaf_hash(&registry).is_err());
        assert!(txm.hash(&registry).is_ok());
    }

    #[test]
    fn short_leaf_is_truncated() {
        let registry = build_registry();
        let leaf = sample().to_leaf_bytes(&registry).unwrap();
        let err = TransactionWithMetaData::from_leaf_bytes(&registry, &leaf[..leaf.len() - 3], 1, &BinaryConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn oversized_leaf_is_rejected_up_front() {
        let registry = build_registry();
        let leaf = sample().to_leaf_bytes(&registry).unwrap();
        let config = BinaryConfig {
            max_message_size: 8,
            ..BinaryConfig::default()
        };
        let err = TransactionWithMetaData::from_leaf_bytes(&registry, &leaf, 1, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Limit);
    }
}
