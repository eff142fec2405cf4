//! Constructor tables keyed by type.
//!
//! Each known transaction or entry type maps to a function that builds its
//! typed payload from a JSON object. Legacy entry types are known by code
//! but have no field-set constructor.

use rpl_types::{LedgerEntryType, TransactionType};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::entry::{
    AccountRootFields, AmendmentsFields, DirectoryNodeFields, EntryFields, FeeSettingsFields, LedgerHashesFields,
    OfferFields, RippleStateFields,
};
use crate::error::LedgerResult;
use crate::transaction::{
    AccountSet, EnableAmendment, OfferCancel, OfferCreate, Payment, SetFee, SetRegularKey, TrustSet, TxKind,
};

/// Builds a transaction payload from its JSON fields.
pub type TxConstructor = fn(&Json) -> LedgerResult<TxKind>;

/// Builds an entry field set from its JSON fields.
pub type FieldsConstructor = fn(&Json) -> LedgerResult<EntryFields>;

fn build<T: DeserializeOwned>(value: &Json) -> LedgerResult<T> {
    Ok(T::deserialize(value)?)
}

/// Payload constructor for a transaction type.
pub fn tx_factory(tx_type: TransactionType) -> TxConstructor {
    match tx_type {
        TransactionType::Payment => |v| build::<Payment>(v).map(TxKind::Payment),
        TransactionType::AccountSet => |v| build::<AccountSet>(v).map(TxKind::AccountSet),
        TransactionType::SetRegularKey => |v| build::<SetRegularKey>(v).map(TxKind::SetRegularKey),
        TransactionType::OfferCreate => |v| build::<OfferCreate>(v).map(TxKind::OfferCreate),
        TransactionType::OfferCancel => |v| build::<OfferCancel>(v).map(TxKind::OfferCancel),
        TransactionType::TrustSet => |v| build::<TrustSet>(v).map(TxKind::TrustSet),
        TransactionType::EnableAmendment => |v| build::<EnableAmendment>(v).map(TxKind::EnableAmendment),
        TransactionType::SetFee => |v| build::<SetFee>(v).map(TxKind::SetFee),
    }
}

/// Field-set constructor for an entry type; `None` for legacy types.
pub fn fields_factory(entry_type: LedgerEntryType) -> Option<FieldsConstructor> {
    let constructor: FieldsConstructor = match entry_type {
        LedgerEntryType::AccountRoot => |v| build::<AccountRootFields>(v).map(EntryFields::AccountRoot),
        LedgerEntryType::DirectoryNode => |v| build::<DirectoryNodeFields>(v).map(EntryFields::DirectoryNode),
        LedgerEntryType::RippleState => |v| build::<RippleStateFields>(v).map(EntryFields::RippleState),
        LedgerEntryType::Offer => |v| build::<OfferFields>(v).map(EntryFields::Offer),
        LedgerEntryType::LedgerHashes => |v| build::<LedgerHashesFields>(v).map(EntryFields::LedgerHashes),
        LedgerEntryType::Amendments => |v| build::<AmendmentsFields>(v).map(EntryFields::Amendments),
        LedgerEntryType::FeeSettings => |v| build::<FeeSettingsFields>(v).map(EntryFields::FeeSettings),
        LedgerEntryType::GeneratorMap | LedgerEntryType::Nickname | LedgerEntryType::Contract => return None,
    };
    Some(constructor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_transaction_type_has_a_constructor() {
        for t in TransactionType::ALL {
            let kind = tx_factory(*t)(&json!({}));
            // Types whose payload has required fields reject an empty object.
            if let Ok(kind) = kind {
                assert_eq!(kind.tx_type(), Some(*t));
            }
        }
        let kind = tx_factory(TransactionType::OfferCancel)(&json!({"OfferSequence": 4})).unwrap();
        assert_eq!(kind.tx_type(), Some(TransactionType::OfferCancel));
    }

    #[test]
    fn only_legacy_entries_lack_field_sets() {
        for t in LedgerEntryType::ALL {
            match fields_factory(*t) {
                Some(build) => {
                    assert!(!t.is_legacy());
                    assert_eq!(build(&json!({})).unwrap().entry_type(), Some(*t));
                }
                None => assert!(t.is_legacy()),
            }
        }
    }
}
