//! Typed transactions.
//!
//! A [`Transaction`] is the set of fields every transaction carries
//! ([`TxCommon`]) plus a per-type payload ([`TxKind`]). Its identifying
//! hash is computed from the canonical binary form on first use and cached;
//! a hash declared alongside JSON input seeds the cache instead.
//!
//! Fields present in the input that neither part declares are carried in
//! [`Transaction::extra`] and written back out unchanged, so the binary
//! form and the hash match what was received.

use std::sync::OnceLock;

use rpl_binary::{decode, encode_object, BinaryConfig, EncodeMode, Registry};
use rpl_crypto::ContentHasher;
use rpl_types::{
    Account, Amount, Hash128, Hash256, HexU64, PathSet, PublicKey, RegularKey, TransactionType,
    VariableLength,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::config::UnknownTypePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::factory::tx_factory;
use crate::object::{as_object, leftover_fields, required_tag, to_field_map, FieldMap, LedgerObject};

const TYPE_TAG: &str = "TransactionType";

/// Fields shared by every transaction type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxCommon {
    pub account: Account,
    pub fee: Amount,
    /// Account sequence number the transaction consumes.
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Arbitrary sender-side tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<u32>,
    /// Highest ledger the transaction may appear in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_sequence: Option<u32>,
    #[serde(rename = "AccountTxnID", default, skip_serializing_if = "Option::is_none")]
    pub account_txn_id: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_pub_key: Option<PublicKey>,
    /// Left out of the signing preimage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_signature: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memos: Option<Vec<MemoEntry>>,
}

/// One element of the `Memos` array, wrapped under its `Memo` key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEntry {
    #[serde(rename = "Memo")]
    pub memo: Memo,
}

/// Free-form data attached to a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Memo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_type: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_data: Option<VariableLength>,
}

/// Send an amount to another account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    pub destination: Account,
    pub amount: Amount,
    /// Most the sender is willing to spend, for cross-currency payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_max: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    #[serde(rename = "InvoiceID", default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Hash256>,
}

/// Change an account's settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_hash: Option<Hash128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_locator: Option<Hash256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_key: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<VariableLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_rate: Option<u32>,
    /// Account flag to set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_flag: Option<u32>,
    /// Account flag to clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_flag: Option<u32>,
}

/// Set or remove an account's regular key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetRegularKey {
    /// Absent when the regular key is being removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_key: Option<RegularKey>,
}

/// Place an offer in the book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferCreate {
    pub taker_pays: Amount,
    pub taker_gets: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u32>,
    /// Offer to cancel before placing this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_sequence: Option<u32>,
}

/// Remove one of the account's offers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferCancel {
    pub offer_sequence: u32,
}

/// Create or change a trust line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustSet {
    pub limit_amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_out: Option<u32>,
}

/// Pseudo-transaction recording an enabled amendment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnableAmendment {
    pub amendment: Hash256,
}

/// Pseudo-transaction recording a fee schedule change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetFee {
    pub base_fee: HexU64,
    pub reference_fee_units: u32,
    pub reserve_base: u32,
    pub reserve_increment: u32,
}

/// A transaction whose type name is not registered, kept as raw fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueTx {
    pub type_name: String,
    pub fields: FieldMap,
}

/// Per-type payload of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxKind {
    Payment(Payment),
    AccountSet(AccountSet),
    SetRegularKey(SetRegularKey),
    OfferCreate(OfferCreate),
    OfferCancel(OfferCancel),
    TrustSet(TrustSet),
    EnableAmendment(EnableAmendment),
    SetFee(SetFee),
    Opaque(OpaqueTx),
}

impl TxKind {
    /// `None` for opaque transactions.
    pub fn tx_type(&self) -> Option<TransactionType> {
        Some(match self {
            Self::Payment(_) => TransactionType::Payment,
            Self::AccountSet(_) => TransactionType::AccountSet,
            Self::SetRegularKey(_) => TransactionType::SetRegularKey,
            Self::OfferCreate(_) => TransactionType::OfferCreate,
            Self::OfferCancel(_) => TransactionType::OfferCancel,
            Self::TrustSet(_) => TransactionType::TrustSet,
            Self::EnableAmendment(_) => TransactionType::EnableAmendment,
            Self::SetFee(_) => TransactionType::SetFee,
            Self::Opaque(_) => return None,
        })
    }

    /// The `TransactionType` name written for this payload.
    pub fn type_name(&self) -> &str {
        match (self, self.tx_type()) {
            (Self::Opaque(opaque), _) => &opaque.type_name,
            (_, Some(t)) => t.name(),
            (_, None) => "",
        }
    }

    fn fields(&self) -> LedgerResult<FieldMap> {
        match self {
            Self::Payment(tx) => to_field_map(tx, "Payment"),
            Self::AccountSet(tx) => to_field_map(tx, "AccountSet"),
            Self::SetRegularKey(tx) => to_field_map(tx, "SetRegularKey"),
            Self::OfferCreate(tx) => to_field_map(tx, "OfferCreate"),
            Self::OfferCancel(tx) => to_field_map(tx, "OfferCancel"),
            Self::TrustSet(tx) => to_field_map(tx, "TrustSet"),
            Self::EnableAmendment(tx) => to_field_map(tx, "EnableAmendment"),
            Self::SetFee(tx) => to_field_map(tx, "SetFee"),
            Self::Opaque(opaque) => Ok(opaque.fields.clone()),
        }
    }
}

/// A transaction with its lazily computed identifying hash.
#[derive(Clone, Debug)]
pub struct Transaction {
    common: TxCommon,
    kind: TxKind,
    extra: FieldMap,
    hash: OnceLock<Hash256>,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.common == other.common && self.kind == other.kind && self.extra == other.extra
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// A transaction with no fields beyond its typed parts.
    pub fn new(common: TxCommon, kind: TxKind) -> Self {
        Self {
            common,
            kind,
            extra: FieldMap::new(),
            hash: OnceLock::new(),
        }
    }

    /// Fields every transaction type carries.
    pub fn common(&self) -> &TxCommon {
        &self.common
    }

    /// The per-type payload.
    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    /// Fields the typed parts do not declare, keyed by field name.
    pub fn extra(&self) -> &FieldMap {
        &self.extra
    }

    /// Mutable access to the shared fields. Drops any cached hash.
    pub fn common_mut(&mut self) -> &mut TxCommon {
        self.hash.take();
        &mut self.common
    }

    /// Mutable access to the payload. Drops any cached hash.
    pub fn kind_mut(&mut self) -> &mut TxKind {
        self.hash.take();
        &mut self.kind
    }

    /// Mutable access to the undeclared fields. Drops any cached hash.
    pub fn extra_mut(&mut self) -> &mut FieldMap {
        self.hash.take();
        &mut self.extra
    }

    /// The registered type, or `None` for an opaque transaction.
    pub fn tx_type(&self) -> Option<TransactionType> {
        self.kind.tx_type()
    }

    /// Seed the hash cache with a value declared by the source document.
    pub fn set_hash(&mut self, hash: Hash256) {
        self.hash = OnceLock::from(hash);
    }

    /// The cached hash, if one has been declared or computed.
    pub fn declared_hash(&self) -> Option<Hash256> {
        self.hash.get().copied()
    }

    /// The identifying hash, computed from the canonical binary form on
    /// first call.
    pub fn hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        if let Some(hash) = self.hash.get() {
            return Ok(*hash);
        }
        let computed = self.compute_hash(registry)?;
        Ok(*self.hash.get_or_init(|| computed))
    }

    /// Hash of the full canonical binary form, ignoring the cache.
    pub fn compute_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        Ok(ContentHasher::TRANSACTION_ID.hash(&self.to_binary(registry)?))
    }

    /// Hash over the signing form, which omits signature fields.
    pub fn signing_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        let bytes = encode_object(registry, &self.to_field_map()?, EncodeMode::Signing)?;
        Ok(ContentHasher::TRANSACTION_SIGN.hash(&bytes))
    }

    /// Check a declared hash against the binary form.
    pub fn verify_hash(&self, registry: &Registry) -> LedgerResult<()> {
        let computed = self.compute_hash(registry)?;
        match self.hash.get() {
            Some(declared) if *declared != computed => Err(LedgerError::HashMismatch {
                declared: *declared,
                computed,
            }),
            _ => Ok(()),
        }
    }

    /// Full canonical binary form.
    pub fn to_binary(&self, registry: &Registry) -> LedgerResult<Vec<u8>> {
        Ok(encode_object(registry, &self.to_field_map()?, EncodeMode::Full)?)
    }

    /// Decode the canonical binary form. Unknown type codes are always
    /// rejected here.
    pub fn from_binary(registry: &Registry, bytes: &[u8], config: &BinaryConfig) -> LedgerResult<Self> {
        let map = decode(registry, bytes, config)?;
        let tx = Self::from_field_map(&map, UnknownTypePolicy::Reject)?;
        debug!(tx_type = tx.kind.type_name(), bytes = bytes.len(), "decoded transaction");
        Ok(tx)
    }

    /// Flat field map: the type tag, the shared fields, the payload and
    /// any undeclared fields.
    pub fn to_field_map(&self) -> LedgerResult<FieldMap> {
        let mut map = self.extra.clone();
        map.extend(self.kind.fields()?);
        map.extend(to_field_map(&self.common, "transaction")?);
        map.insert(TYPE_TAG.to_string(), Json::String(self.kind.type_name().to_string()));
        Ok(map)
    }

    /// Same content as `to_field_map`, as a JSON value.
    pub fn to_json(&self) -> LedgerResult<Json> {
        Ok(Json::Object(self.to_field_map()?))
    }

    /// Build from a JSON object; see [`Transaction::from_field_map`].
    pub fn from_json(value: &Json, policy: UnknownTypePolicy) -> LedgerResult<Self> {
        Self::from_field_map(as_object(value, "transaction")?, policy)
    }

    /// Build from a flat field map. The type tag picks the payload
    /// constructor; keys neither typed part claims are kept in
    /// [`Transaction::extra`].
    pub fn from_field_map(map: &FieldMap, policy: UnknownTypePolicy) -> LedgerResult<Self> {
        let name = required_tag(map, TYPE_TAG, "transaction")?;
        let value = Json::Object(map.clone());
        let common = TxCommon::deserialize(&value)?;
        let kind = match TransactionType::from_name(name) {
            Ok(tx_type) => tx_factory(tx_type)(&value)?,
            Err(err) => match policy {
                UnknownTypePolicy::Reject => return Err(err.into()),
                UnknownTypePolicy::Preserve => {
                    warn!(tx_type = name, "preserving transaction of unknown type");
                    let mut fields = map.clone();
                    fields.remove(TYPE_TAG);
                    TxKind::Opaque(OpaqueTx {
                        type_name: name.to_string(),
                        fields,
                    })
                }
            },
        };
        let mut tx = Self::new(common, kind);
        if !matches!(tx.kind, TxKind::Opaque(_)) {
            let mut known = tx.kind.fields()?;
            known.extend(to_field_map(&tx.common, "transaction")?);
            tx.extra = leftover_fields(map, &known, TYPE_TAG);
            if !tx.extra.is_empty() {
                debug!(tx_type = name, fields = ?tx.extra.keys().collect::<Vec<_>>(), "carrying undeclared fields");
            }
        }
        Ok(tx)
    }
}

impl LedgerObject for Transaction {
    fn type_code(&self) -> Option<u16> {
        self.tx_type().map(|t| t.code())
    }

    fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    fn field_map(&self) -> LedgerResult<FieldMap> {
        self.to_field_map()
    }

    fn content_hash(&self, registry: &Registry) -> LedgerResult<Hash256> {
        self.hash(registry)
    }
}
