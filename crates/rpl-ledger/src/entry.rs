//! State entries and their field sets.
//!
//! The same field-set structs describe a full ledger entry and each of the
//! before/after snapshots held in transaction metadata, so every field is
//! optional.

use std::sync::OnceLock;

use rpl_binary::{decode, encode_object, BinaryConfig, EncodeMode, Registry};
use rpl_crypto::state_leaf_hash;
use rpl_types::{Account, Amount, Hash128, Hash160, Hash256, HexU64, LedgerEntryType, RegularKey, VariableLength, Vector256};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::config::UnknownTypePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::factory::fields_factory;
use crate::object::{as_object, required_tag, to_field_map, FieldMap, LedgerObject};

const TYPE_TAG: &str = "LedgerEntryType";

/// An account's balance, sequence and settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRootFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    /// XRP balance in drops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Amount>,
    /// Objects the account owns, counted against its reserve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_count: Option<u32>,
    #[serde(rename = "PreviousTxnID", default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_id: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_lgr_seq: Option<u32>,
    #[serde(rename = "AccountTxnID", default, skip_serializing_if = "Option::is_none")]
    pub account_txn_id: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_key: Option<RegularKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_hash: Option<Hash128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_locator: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_key: Option<VariableLength>,
    /// Fee charged on issued currency transfers, in billionths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<VariableLength>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// One page of an owner or order-book directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryNodeFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Index of the directory's first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_index: Option<Hash256>,
    /// Indexes of the entries listed on this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vector256>,
    /// Next page number; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_next: Option<HexU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_previous: Option<HexU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_pays_currency: Option<Hash160>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_pays_issuer: Option<Hash160>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_gets_currency: Option<Hash160>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_gets_issuer: Option<Hash160>,
    /// Quality of the offers in a book directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<HexU64>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// A trust line between two accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RippleStateFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Balance from the low account's side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_limit: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_limit: Option<Amount>,
    #[serde(rename = "PreviousTxnID", default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_id: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_lgr_seq: Option<u32>,
    /// Page of the low account's owner directory holding this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_node: Option<HexU64>,
    /// Page of the high account's owner directory holding this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_node: Option<HexU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_quality_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_quality_out: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_quality_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_quality_out: Option<u32>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// A standing order in the book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_pays: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_gets: Option<Amount>,
    /// Book directory listing this offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_directory: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_node: Option<HexU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_node: Option<HexU64>,
    #[serde(rename = "PreviousTxnID", default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_id: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_txn_lgr_seq: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// Hashes of prior ledgers (the skip list).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerHashesFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_ledger_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
    /// Hashes of recent ledgers, oldest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Vector256>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// Amendments enabled on the network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmendmentsFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Ids of the enabled amendments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendments: Option<Vector256>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// Current fee and reserve schedule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeeSettingsFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Base fee in drops, as 16 hex digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee: Option<HexU64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_fee_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_base: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_increment: Option<u32>,
    /// Registered fields this entry type does not declare, written back
    /// out unchanged.
    #[serde(flatten)]
    pub extra: FieldMap,
}

/// An entry whose type name is not registered, kept as raw fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueFields {
    /// Name the document gave in `LedgerEntryType`.
    pub entry_type: String,
    pub fields: FieldMap,
}

/// Field set of one state entry kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryFields {
    AccountRoot(AccountRootFields),
    DirectoryNode(DirectoryNodeFields),
    RippleState(RippleStateFields),
    Offer(OfferFields),
    LedgerHashes(LedgerHashesFields),
    Amendments(AmendmentsFields),
    FeeSettings(FeeSettingsFields),
    Opaque(OpaqueFields),
}

impl EntryFields {
    /// `None` for opaque entries.
    pub fn entry_type(&self) -> Option<LedgerEntryType> {
        Some(match self {
            Self::AccountRoot(_) => LedgerEntryType::AccountRoot,
            Self::DirectoryNode(_) => LedgerEntryType::DirectoryNode,
            Self::RippleState(_) => LedgerEntryType::RippleState,
            Self::Offer(_) => LedgerEntryType::Offer,
            Self::LedgerHashes(_) => LedgerEntryType::LedgerHashes,
            Self::Amendments(_) => LedgerEntryType::Amendments,
            Self::FeeSettings(_) => LedgerEntryType::FeeSettings,
            Self::Opaque(_) => return None,
        })
    }

    /// The `LedgerEntryType` name written for this field set.
    pub fn type_name(&self) -> &str {
        match (self, self.entry_type()) {
            (Self::Opaque(opaque), _) => &opaque.entry_type,
            (_, Some(t)) => t.name(),
            (_, None) => "",
        }
    }

    /// The fields alone, without the type tag. This is the shape of a
    /// metadata snapshot.
    pub fn to_field_map(&self) -> LedgerResult<FieldMap> {
        match self {
            Self::AccountRoot(f) => to_field_map(f, "AccountRoot"),
            Self::DirectoryNode(f) => to_field_map(f, "DirectoryNode"),
            Self::RippleState(f) => to_field_map(f, "RippleState"),
            Self::Offer(f) => to_field_map(f, "Offer"),
            Self::LedgerHashes(f) => to_field_map(f, "LedgerHashes"),
            Self::Amendments(f) => to_field_map(f, "Amendments"),
            Self::FeeSettings(f) => to_field_map(f, "FeeSettings"),
            Self::Opaque(opaque) => Ok(opaque.fields.clone()),
        }
    }

    /// Build the field set registered for `entry_type` from a JSON object.
    pub fn from_json(entry_type: LedgerEntryType, value: &Json) -> LedgerResult<Self> {
        let factory = fields_factory(entry_type).ok_or_else(|| LedgerError::NoFieldSetFactory {
            entry_type: entry_type.name().to_string(),
        })?;
        factory(value)
    }
}

/// A state entry: its field set and the index it is stored under.
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    fields: EntryFields,
    index: Hash256,
    leaf_hash: OnceLock<Hash256>,
}

impl PartialEq for LedgerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.fields == other.fields
    }
}

impl Eq for LedgerEntry {}

impl LedgerEntry {
    /// Entry stored under `index`.
    pub fn new(fields: EntryFields, index: Hash256) -> Self {
        Self {
            fields,
            index,
            leaf_hash: OnceLock::new(),
        }
    }

    pub fn fields(&self) -> &EntryFields {
        &self.fields
    }

    /// Mutable access to the field set. Drops the cached leaf hash.
    pub fn fields_mut(&mut self) -> &mut EntryFields {
        self.leaf_hash.take();
        &mut self.fields
    }

    /// Key of the entry in the state tree.
    pub fn index(&self) -> Hash256 {
        self.index
    }

    pub fn entry_type(&self) -> Option<LedgerEntryType> {
        self.fields.entry_type()
    }

    /// Fields plus the type tag: the entry's canonical content.
    pub fn to_field_map(&self) -> LedgerResult<FieldMap> {
        let mut map = self.fields.to_field_map()?;
        map.insert(TYPE_TAG.to_string(), Json::String(self.fields.type_name().to_string()));
        Ok(map)
    }

    /// Canonical binary form, type tag included.
    pub fn to_binary(&self, registry: &Registry) -> LedgerResult<Vec<u8>> {
        Ok(encode_object(registry, &self.to_field_map()?, EncodeMode::Full)?)
    }

    /// Decode a leaf's binary form. Unknown entry types are rejected.
    pub fn from_binary(registry: &Registry, bytes: &[u8], index: Hash256, config: &BinaryConfig) -> LedgerResult<Self> {
        let map = decode(registry, bytes, config)?;
        let entry = Self::from_field_map(&map, index, UnknownTypePolicy::Reject)?;
        debug!(entry_type = entry.fields.type_name(), %index, "decoded ledger entry");
        Ok(entry)
    }

    pub fn to_json(&self) -> LedgerResult<Json> {
        Ok(Json::Object(self.to_field_map()?))
    }

    /// Decode a JSON object carrying `LedgerEntryType`.
    pub fn from_json(value: &Json, index: Hash256, policy: UnknownTypePolicy) -> LedgerResult<Self> {
        Self::from_field_map(as_object(value, "ledger entry")?, index, policy)
    }

    /// Unknown entry types follow `policy`.
    pub fn from_field_map(map: &FieldMap, index: Hash256, policy: UnknownTypePolicy) -> LedgerResult<Self> {
        let name = required_tag(map, TYPE_TAG, "ledger entry")?;
        let fields = match LedgerEntryType::from_name(name) {
            Ok(entry_type) => {
                let mut fields = map.clone();
                fields.remove(TYPE_TAG);
                EntryFields::from_json(entry_type, &Json::Object(fields))?
            }
            Err(err) => match policy {
                UnknownTypePolicy::Reject => return Err(err.into()),
                UnknownTypePolicy::Preserve => {
                    warn!(entry_type = name, %index, "preserving ledger entry of unknown type");
                    let mut fields = map.clone();
                    fields.remove(TYPE_TAG);
                    EntryFields::Opaque(OpaqueFields {
                        entry_type: name.to_string(),
                        fields,
                    })
                }
            },
        };
        Ok(Self::new(fields, index))
    }

    /// State-tree leaf hash over the binary form and the index.
    pub fn leaf_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        if let Some(hash) = self.leaf_hash.get() {
            return Ok(*hash);
        }
        let computed = state_leaf_hash(&self.to_binary(registry)?, &self.index);
        Ok(*self.leaf_hash.get_or_init(|| computed))
    }
}

impl LedgerObject for LedgerEntry {
    fn type_code(&self) -> Option<u16> {
        self.entry_type().map(|t| t.code())
    }

    fn type_name(&self) -> &str {
        self.fields.type_name()
    }

    fn field_map(&self) -> LedgerResult<FieldMap> {
        self.to_field_map()
    }

    fn content_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        self.leaf_hash(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpl_binary::build_registry;
    use rpl_crypto::{account_root_index, fee_settings_index, ContentHasher};
    use rpl_types::ErrorKind;
    use serde_json::json;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn account_root() -> Json {
        json!({
            "LedgerEntryType": "AccountRoot",
            "Account": GENESIS,
            "Balance": "99999999999999990",
            "Flags": 0,
            "OwnerCount": 0,
            "PreviousTxnID": "0000000000000000000000000000000000000000000000000000000000000000",
            "PreviousTxnLgrSeq": 0,
            "Sequence": 2
        })
    }

    fn genesis_index() -> Hash256 {
        account_root_index(&Account::from_address(GENESIS).unwrap())
    }

    #[test]
    fn account_root_round_trips() {
        let registry = build_registry();
        let entry = LedgerEntry::from_json(&account_root(), genesis_index(), UnknownTypePolicy::Reject).unwrap();
        assert_eq!(entry.entry_type(), Some(LedgerEntryType::AccountRoot));
        assert_eq!(Json::Object(entry.to_field_map().unwrap()), account_root());

        let bytes = entry.to_binary(&registry).unwrap();
        let back = LedgerEntry::from_binary(&registry, &bytes, entry.index(), &BinaryConfig::default()).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn undeclared_fields_are_kept() {
        let registry = build_registry();
        let mut value = account_root();
        value["Expiration"] = json!(7);
        let entry = LedgerEntry::from_json(&value, genesis_index(), UnknownTypePolicy::Reject).unwrap();
        match entry.fields() {
            EntryFields::AccountRoot(f) => {
                assert_eq!(f.extra.get("Expiration"), Some(&json!(7)));
                assert!(!f.extra.contains_key("LedgerEntryType"));
            }
            other => panic!("unexpected fields {other:?}"),
        }
        assert_eq!(Json::Object(entry.to_field_map().unwrap()), value);

        let bytes = entry.to_binary(&registry).unwrap();
        let back = LedgerEntry::from_binary(&registry, &bytes, entry.index(), &BinaryConfig::default()).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.to_binary(&registry).unwrap(), bytes);
    }

    #[test]
    fn leaf_hash_binds_index() {
        let registry = build_registry();
        let entry = LedgerEntry::from_json(&account_root(), genesis_index(), UnknownTypePolicy::Reject).unwrap();
        let mut payload = entry.to_binary(&registry).unwrap();
        payload.extend_from_slice(genesis_index().as_bytes());
        assert_eq!(entry.leaf_hash(&registry).unwrap(), ContentHasher::LEAF_NODE.hash(&payload));

        let moved = LedgerEntry::new(entry.fields().clone(), Hash256::ZERO);
        assert_ne!(moved.leaf_hash(&registry).unwrap(), entry.leaf_hash(&registry).unwrap());
    }

    #[test]
    fn mutation_resets_leaf_hash() {
        let registry = build_registry();
        let mut entry = LedgerEntry::from_json(&account_root(), genesis_index(), UnknownTypePolicy::Reject).unwrap();
        let before = entry.content_hash(&registry).unwrap();
        if let EntryFields::AccountRoot(fields) = entry.fields_mut() {
            fields.sequence = Some(3);
        }
        assert_ne!(entry.content_hash(&registry).unwrap(), before);
    }

    #[test]
    fn fee_settings_entry() {
        let value = json!({
            "LedgerEntryType": "FeeSettings",
            "BaseFee": "000000000000000A",
            "Flags": 0,
            "ReferenceFeeUnits": 10,
            "ReserveBase": 20000000,
            "ReserveIncrement": 5000000
        });
        let entry = LedgerEntry::from_json(&value, fee_settings_index(), UnknownTypePolicy::Reject).unwrap();
        match entry.fields() {
            EntryFields::FeeSettings(f) => assert_eq!(f.base_fee, Some(HexU64(10))),
            other => panic!("unexpected fields {other:?}"),
        }
        let registry = build_registry();
        assert_eq!(
            entry.present_fields(&registry).unwrap(),
            vec!["LedgerEntryType", "Flags", "ReferenceFeeUnits", "ReserveBase", "ReserveIncrement", "BaseFee"]
        );
    }

    #[test]
    fn legacy_entry_has_no_field_set() {
        let value = json!({"LedgerEntryType": "Nickname"});
        let err = LedgerEntry::from_json(&value, Hash256::ZERO, UnknownTypePolicy::Preserve).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn unknown_entry_follows_policy() {
        let value = json!({"LedgerEntryType": "Escrow", "Account": GENESIS});
        let err = LedgerEntry::from_json(&value, Hash256::ZERO, UnknownTypePolicy::Reject).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeCode);

        let entry = LedgerEntry::from_json(&value, Hash256::ZERO, UnknownTypePolicy::Preserve).unwrap();
        assert_eq!(entry.type_name(), "Escrow");
        assert_eq!(Json::Object(entry.to_field_map().unwrap()), value);
    }
}
