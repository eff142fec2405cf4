use rpl_binary::{BinaryError, Registry};
use rpl_types::Hash256;
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::error::{LedgerError, LedgerResult};

/// JSON object keyed by field name; the form objects take on their way to
/// and from the binary codec.
pub type FieldMap = Map<String, Json>;

/// Behaviour shared by every typed ledger object.
pub trait LedgerObject {
    /// Wire code of the object's type, or `None` for an opaque object whose
    /// type name is not registered.
    fn type_code(&self) -> Option<u16>;

    fn type_name(&self) -> &str;

    /// The object's fields, including its type tag.
    fn field_map(&self) -> LedgerResult<FieldMap>;

    /// Stable hash of the object, computed once and cached.
    fn content_hash(&self, registry: &Registry) -> LedgerResult<Hash256>;

    /// Names of the fields present on this object, in canonical order.
    fn present_fields(&self, registry: &Registry) -> LedgerResult<Vec<&'static str>> {
        let map = self.field_map()?;
        let mut present = Vec::with_capacity(map.len());
        for (name, value) in &map {
            if value.is_null() {
                continue;
            }
            let descriptor = registry
                .descriptor_by_name(name)
                .ok_or_else(|| BinaryError::UnknownFieldName(name.clone()))?;
            present.push(descriptor);
        }
        present.sort_by_key(|d| d.priority());
        Ok(present.into_iter().map(|d| d.name).collect())
    }
}

pub(crate) fn to_field_map<T: Serialize>(value: &T, context: &'static str) -> LedgerResult<FieldMap> {
    match serde_json::to_value(value)? {
        Json::Object(map) => Ok(map),
        _ => Err(LedgerError::NotAnObject(context)),
    }
}

pub(crate) fn as_object<'a>(value: &'a Json, context: &'static str) -> LedgerResult<&'a FieldMap> {
    value.as_object().ok_or(LedgerError::NotAnObject(context))
}

/// A string-valued tag that must be present.
pub(crate) fn required_tag<'a>(map: &'a FieldMap, tag: &'static str, context: &'static str) -> LedgerResult<&'a str> {
    map.get(tag)
        .and_then(Json::as_str)
        .ok_or(LedgerError::MissingTag { tag, context })
}

/// Entries of `input` that `known` does not account for, skipping the type
/// tag and explicit nulls.
pub(crate) fn leftover_fields(input: &FieldMap, known: &FieldMap, tag: &str) -> FieldMap {
    input
        .iter()
        .filter(|(key, value)| key.as_str() != tag && !value.is_null() && !known.contains_key(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
