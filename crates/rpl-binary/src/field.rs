use std::collections::HashMap;
use std::fmt;

/// Serialized type of a field, identified on the wire by its type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    UInt16,
    UInt32,
    UInt64,
    Hash128,
    Hash256,
    Amount,
    VariableLength,
    Account,
    Object,
    Array,
    UInt8,
    Hash160,
    PathSet,
    Vector256,
}

impl FieldType {
    /// Wire type code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::UInt16 => 1,
            Self::UInt32 => 2,
            Self::UInt64 => 3,
            Self::Hash128 => 4,
            Self::Hash256 => 5,
            Self::Amount => 6,
            Self::VariableLength => 7,
            Self::Account => 8,
            Self::Object => 14,
            Self::Array => 15,
            Self::UInt8 => 16,
            Self::Hash160 => 17,
            Self::PathSet => 18,
            Self::Vector256 => 19,
        }
    }

    /// `None` for codes with no field type.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::UInt16,
            2 => Self::UInt32,
            3 => Self::UInt64,
            4 => Self::Hash128,
            5 => Self::Hash256,
            6 => Self::Amount,
            7 => Self::VariableLength,
            8 => Self::Account,
            14 => Self::Object,
            15 => Self::Array,
            16 => Self::UInt8,
            17 => Self::Hash160,
            18 => Self::PathSet,
            19 => Self::Vector256,
            _ => return None,
        })
    }

    /// Whether values are written behind a length prefix.
    pub const fn is_vl_encoded(&self) -> bool {
        matches!(self, Self::VariableLength | Self::Account | Self::Vector256)
    }
}

/// `(type_code, field_code)` pair naming one serializable field slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub type_code: u8,
    pub field_code: u8,
}

impl FieldKey {
    /// Closes an inner object.
    pub const END_OF_OBJECT: Self = Self::new(14, 1);
    /// Closes an array.
    pub const END_OF_ARRAY: Self = Self::new(15, 1);

    pub const fn new(type_code: u8, field_code: u8) -> Self {
        Self {
            type_code,
            field_code,
        }
    }

    /// Canonical sort key: fields are written in ascending priority.
    pub const fn priority(&self) -> u32 {
        (self.type_code as u32) << 16 | self.field_code as u32
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.type_code, self.field_code)
    }
}

/// Everything the codec knows about one registered field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: FieldKey,
    /// JSON key.
    pub name: &'static str,
    pub field_type: FieldType,
    /// Excluded from signing preimages.
    pub is_signing_field: bool,
}

impl FieldDescriptor {
    pub const fn priority(&self) -> u32 {
        self.key.priority()
    }
}

use FieldType::*;

static FIELDS: &[(FieldType, u8, &str)] = &[
    (UInt16, 1, "LedgerEntryType"),
    (UInt16, 2, "TransactionType"),
    (UInt32, 2, "Flags"),
    (UInt32, 3, "SourceTag"),
    (UInt32, 4, "Sequence"),
    (UInt32, 5, "PreviousTxnLgrSeq"),
    (UInt32, 6, "LedgerSequence"),
    (UInt32, 7, "CloseTime"),
    (UInt32, 8, "ParentCloseTime"),
    (UInt32, 9, "SigningTime"),
    (UInt32, 10, "Expiration"),
    (UInt32, 11, "TransferRate"),
    (UInt32, 12, "WalletSize"),
    (UInt32, 13, "OwnerCount"),
    (UInt32, 14, "DestinationTag"),
    (UInt32, 16, "HighQualityIn"),
    (UInt32, 17, "HighQualityOut"),
    (UInt32, 18, "LowQualityIn"),
    (UInt32, 19, "LowQualityOut"),
    (UInt32, 20, "QualityIn"),
    (UInt32, 21, "QualityOut"),
    (UInt32, 22, "StampEscrow"),
    (UInt32, 23, "BondAmount"),
    (UInt32, 24, "LoadFee"),
    (UInt32, 25, "OfferSequence"),
    (UInt32, 26, "FirstLedgerSequence"),
    (UInt32, 27, "LastLedgerSequence"),
    (UInt32, 28, "TransactionIndex"),
    (UInt32, 29, "OperationLimit"),
    (UInt32, 30, "ReferenceFeeUnits"),
    (UInt32, 31, "ReserveBase"),
    (UInt32, 32, "ReserveIncrement"),
    (UInt32, 33, "SetFlag"),
    (UInt32, 34, "ClearFlag"),
    (UInt64, 1, "IndexNext"),
    (UInt64, 2, "IndexPrevious"),
    (UInt64, 3, "BookNode"),
    (UInt64, 4, "OwnerNode"),
    (UInt64, 5, "BaseFee"),
    (UInt64, 6, "ExchangeRate"),
    (UInt64, 7, "LowNode"),
    (UInt64, 8, "HighNode"),
    (Hash128, 1, "EmailHash"),
    (Hash256, 1, "LedgerHash"),
    (Hash256, 2, "ParentHash"),
    (Hash256, 3, "TransactionHash"),
    (Hash256, 4, "AccountHash"),
    (Hash256, 5, "PreviousTxnID"),
    (Hash256, 6, "LedgerIndex"),
    (Hash256, 7, "WalletLocator"),
    (Hash256, 8, "RootIndex"),
    (Hash256, 9, "AccountTxnID"),
    (Hash256, 16, "BookDirectory"),
    (Hash256, 17, "InvoiceID"),
    (Hash256, 18, "Nickname"),
    (Hash256, 19, "Amendment"),
    (Amount, 1, "Amount"),
    (Amount, 2, "Balance"),
    (Amount, 3, "LimitAmount"),
    (Amount, 4, "TakerPays"),
    (Amount, 5, "TakerGets"),
    (Amount, 6, "LowLimit"),
    (Amount, 7, "HighLimit"),
    (Amount, 8, "Fee"),
    (Amount, 9, "SendMax"),
    (Amount, 16, "MinimumOffer"),
    (Amount, 17, "RippleEscrow"),
    (Amount, 18, "DeliveredAmount"),
    (VariableLength, 1, "PublicKey"),
    (VariableLength, 2, "MessageKey"),
    (VariableLength, 3, "SigningPubKey"),
    (VariableLength, 4, "TxnSignature"),
    (VariableLength, 5, "Generator"),
    (VariableLength, 6, "Signature"),
    (VariableLength, 7, "Domain"),
    (VariableLength, 8, "FundCode"),
    (VariableLength, 9, "RemoveCode"),
    (VariableLength, 10, "ExpireCode"),
    (VariableLength, 11, "CreateCode"),
    (VariableLength, 12, "MemoType"),
    (VariableLength, 13, "MemoData"),
    (Account, 1, "Account"),
    (Account, 2, "Owner"),
    (Account, 3, "Destination"),
    (Account, 4, "Issuer"),
    (Account, 7, "Target"),
    (Account, 8, "RegularKey"),
    (Object, 1, "EndOfObject"),
    (Object, 2, "TransactionMetaData"),
    (Object, 3, "CreatedNode"),
    (Object, 4, "DeletedNode"),
    (Object, 5, "ModifiedNode"),
    (Object, 6, "PreviousFields"),
    (Object, 7, "FinalFields"),
    (Object, 8, "NewFields"),
    (Object, 9, "TemplateEntry"),
    (Object, 10, "Memo"),
    (Array, 1, "EndOfArray"),
    (Array, 2, "SigningAccounts"),
    (Array, 3, "TxnSignatures"),
    (Array, 4, "Signatures"),
    (Array, 5, "Template"),
    (Array, 6, "Necessary"),
    (Array, 7, "Sufficient"),
    (Array, 8, "AffectedNodes"),
    (Array, 9, "Memos"),
    (UInt8, 1, "CloseResolution"),
    (UInt8, 2, "TemplateEntryType"),
    (UInt8, 3, "TransactionResult"),
    (Hash160, 1, "TakerPaysCurrency"),
    (Hash160, 2, "TakerPaysIssuer"),
    (Hash160, 3, "TakerGetsCurrency"),
    (Hash160, 4, "TakerGetsIssuer"),
    (PathSet, 1, "Paths"),
    (Vector256, 1, "Indexes"),
    (Vector256, 2, "Hashes"),
    (Vector256, 3, "Amendments"),
];

/// Immutable two-way table between field keys and field names.
///
/// Built once with [`build_registry`] and shared by reference with every
/// encoder and decoder. Lookups return `None` for unregistered fields and
/// leave it to the caller to decide whether that is fatal.
#[derive(Debug)]
pub struct Registry {
    by_key: HashMap<FieldKey, FieldDescriptor>,
    by_name: HashMap<&'static str, FieldKey>,
}

/// Build the registry from the static field table.
pub fn build_registry() -> Registry {
    let mut by_key = HashMap::with_capacity(FIELDS.len());
    let mut by_name = HashMap::with_capacity(FIELDS.len());
    for &(field_type, field_code, name) in FIELDS {
        let key = FieldKey::new(field_type.code(), field_code);
        let descriptor = FieldDescriptor {
            key,
            name,
            field_type,
            is_signing_field: name.contains("Signature"),
        };
        by_key.insert(key, descriptor);
        by_name.insert(name, key);
    }
    Registry { by_key, by_name }
}

impl Registry {
    /// Name of a registered field.
    pub fn lookup_by_key(&self, key: FieldKey) -> Option<&'static str> {
        self.by_key.get(&key).map(|d| d.name)
    }

    /// Key of a registered field, by JSON name.
    pub fn lookup_by_name(&self, name: &str) -> Option<FieldKey> {
        self.by_name.get(name).copied()
    }

    /// Descriptor of a registered key.
    pub fn descriptor(&self, key: FieldKey) -> Option<&FieldDescriptor> {
        self.by_key.get(&key)
    }

    /// Descriptor of a registered JSON name.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.lookup_by_name(name).and_then(|k| self.by_key.get(&k))
    }

    pub fn priority(&self, key: FieldKey) -> u32 {
        key.priority()
    }

    /// Signature fields are left out of signing preimages.
    pub fn is_signing_field(&self, key: FieldKey) -> bool {
        self.by_key.get(&key).is_some_and(|d| d.is_signing_field)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// All descriptors in canonical order.
    pub fn descriptors(&self) -> Vec<&FieldDescriptor> {
        let mut all: Vec<_> = self.by_key.values().collect();
        all.sort_by_key(|d| d.priority());
        all
    }
}
