use rpl_types::{
    Account, Amount, HexU64, LedgerEntryType, PathSet, TransactionResult, TransactionType,
};
use serde_json::{Map, Value as Json};

use crate::error::{BinaryError, BinaryResult};
use crate::field::{FieldDescriptor, FieldKey, FieldType, Registry};

/// Largest payload a length prefix can describe.
pub const MAX_VL_LENGTH: usize = 918_744;

/// Which fields of the top-level object are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeMode {
    Full,
    /// Omit signing fields; nested objects are always written in full.
    Signing,
}

/// Encode a JSON field map into canonical binary.
///
/// Fields are written in ascending canonical priority. Null values are
/// skipped; names missing from the registry are an error.
pub fn encode_object(registry: &Registry, map: &Map<String, Json>, mode: EncodeMode) -> BinaryResult<Vec<u8>> {
    let mut out = Vec::new();
    write_fields(registry, map, mode, &mut out)?;
    tracing::trace!(fields = map.len(), bytes = out.len(), ?mode, "encoded object");
    Ok(out)
}

fn write_fields(
    registry: &Registry,
    map: &Map<String, Json>,
    mode: EncodeMode,
    out: &mut Vec<u8>,
) -> BinaryResult<()> {
    let mut fields: Vec<(&FieldDescriptor, &Json)> = Vec::with_capacity(map.len());
    for (name, value) in map {
        if value.is_null() {
            continue;
        }
        let descriptor = registry
            .descriptor_by_name(name)
            .ok_or_else(|| BinaryError::UnknownFieldName(name.clone()))?;
        if mode == EncodeMode::Signing && descriptor.is_signing_field {
            continue;
        }
        fields.push((descriptor, value));
    }
    fields.sort_by_key(|(d, _)| d.priority());
    for (descriptor, value) in fields {
        write_field_header(out, descriptor.key);
        write_value(registry, descriptor, value, out)?;
    }
    Ok(())
}

/// One to three bytes: type and field codes share a byte when both are
/// below 16, otherwise a zero nibble escapes to a following byte.
pub fn write_field_header(out: &mut Vec<u8>, key: FieldKey) {
    let (t, f) = (key.type_code, key.field_code);
    match (t < 16, f < 16) {
        (true, true) => out.push(t << 4 | f),
        (false, true) => out.extend_from_slice(&[f, t]),
        (true, false) => out.extend_from_slice(&[t << 4, f]),
        (false, false) => out.extend_from_slice(&[0, t, f]),
    }
}

/// Fails with `LengthOverflow` past 918,744 bytes.
pub fn write_vl_length(out: &mut Vec<u8>, len: usize) -> BinaryResult<()> {
    if len <= 192 {
        out.push(len as u8);
    } else if len <= 12_480 {
        let l = len - 193;
        out.extend_from_slice(&[193 + (l >> 8) as u8, (l & 0xff) as u8]);
    } else if len <= MAX_VL_LENGTH {
        let l = len - 12_481;
        out.extend_from_slice(&[241 + (l >> 16) as u8, ((l >> 8) & 0xff) as u8, (l & 0xff) as u8]);
    } else {
        return Err(BinaryError::LengthOverflow(len));
    }
    Ok(())
}

/// Length prefix followed by `bytes`.
pub fn write_vl(out: &mut Vec<u8>, bytes: &[u8]) -> BinaryResult<()> {
    write_vl_length(out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Native: 8 bytes. Issued: 8 value bytes, 20 currency bytes, 20 issuer bytes.
pub fn write_amount(out: &mut Vec<u8>, amount: &Amount) {
    let value = &amount.value;
    if value.is_native() {
        let mut bits = value.mantissa();
        if !value.is_negative() {
            bits |= 1 << 62;
        }
        out.extend_from_slice(&bits.to_be_bytes());
        return;
    }
    let mut bits: u64 = 1 << 63;
    if !value.is_zero() {
        if !value.is_negative() {
            bits |= 1 << 62;
        }
        bits |= ((value.exponent() + 97) as u64) << 54;
        bits |= value.mantissa();
    }
    out.extend_from_slice(&bits.to_be_bytes());
    out.extend_from_slice(amount.currency.as_bytes());
    out.extend_from_slice(amount.issuer.as_bytes());
}

/// Paths joined by `0xff` and closed with `0x00`.
pub fn write_path_set(out: &mut Vec<u8>, paths: &PathSet) {
    for (i, path) in paths.paths().iter().enumerate() {
        if i > 0 {
            out.push(PathSet::PATH_BOUNDARY);
        }
        for step in path {
            out.push(step.flags());
            if let Some(account) = &step.account {
                out.extend_from_slice(account.as_bytes());
            }
            if let Some(currency) = &step.currency {
                out.extend_from_slice(currency.as_bytes());
            }
            if let Some(issuer) = &step.issuer {
                out.extend_from_slice(issuer.as_bytes());
            }
        }
    }
    out.push(PathSet::END);
}

fn write_value(
    registry: &Registry,
    descriptor: &FieldDescriptor,
    value: &Json,
    out: &mut Vec<u8>,
) -> BinaryResult<()> {
    let name = descriptor.name;
    match descriptor.field_type {
        FieldType::UInt8 => {
            let v = match (name, value) {
                ("TransactionResult", Json::String(s)) => TransactionResult::from_name(s)?.code(),
                _ => uint(name, value, u8::MAX.into())? as u8,
            };
            out.push(v);
        }
        FieldType::UInt16 => {
            let v = match (name, value) {
                ("TransactionType", Json::String(s)) => TransactionType::from_name(s)?.code(),
                ("LedgerEntryType", Json::String(s)) => LedgerEntryType::from_name(s)?.code(),
                _ => uint(name, value, u16::MAX.into())? as u16,
            };
            out.extend_from_slice(&v.to_be_bytes());
        }
        FieldType::UInt32 => {
            let v = uint(name, value, u32::MAX.into())? as u32;
            out.extend_from_slice(&v.to_be_bytes());
        }
        FieldType::UInt64 => {
            let v = match value {
                Json::String(s) => HexU64::from_hex(s)?.0,
                _ => uint(name, value, u64::MAX)?,
            };
            out.extend_from_slice(&v.to_be_bytes());
        }
        FieldType::Hash128 => out.extend_from_slice(rpl_types::Hash128::from_hex(text(name, value)?)?.as_bytes()),
        FieldType::Hash160 => out.extend_from_slice(rpl_types::Hash160::from_hex(text(name, value)?)?.as_bytes()),
        FieldType::Hash256 => out.extend_from_slice(rpl_types::Hash256::from_hex(text(name, value)?)?.as_bytes()),
        FieldType::Amount => {
            let amount: Amount = typed(name, value)?;
            write_amount(out, &amount);
        }
        FieldType::VariableLength => {
            let s = text(name, value)?;
            let bytes = hex::decode(s).map_err(|e| BinaryError::invalid(name, e.to_string()))?;
            write_vl(out, &bytes)?;
        }
        FieldType::Account => {
            let account = Account::from_address(text(name, value)?)?;
            write_vl(out, account.as_bytes())?;
        }
        FieldType::Object => {
            let map = value
                .as_object()
                .ok_or_else(|| BinaryError::invalid(name, "expected an object"))?;
            write_fields(registry, map, EncodeMode::Full, out)?;
            write_field_header(out, FieldKey::END_OF_OBJECT);
        }
        FieldType::Array => {
            let items = value
                .as_array()
                .ok_or_else(|| BinaryError::invalid(name, "expected an array"))?;
            for item in items {
                write_array_element(registry, name, item, out)?;
            }
            write_field_header(out, FieldKey::END_OF_ARRAY);
        }
        FieldType::PathSet => {
            let paths: PathSet = typed(name, value)?;
            write_path_set(out, &paths);
        }
        FieldType::Vector256 => {
            let hashes: rpl_types::Vector256 = typed(name, value)?;
            write_vl(out, &hashes.to_bytes())?;
        }
    }
    Ok(())
}

/// Array elements are single-key objects naming the wrapper field, e.g.
/// `{"Memo": {...}}`.
fn write_array_element(registry: &Registry, array: &str, item: &Json, out: &mut Vec<u8>) -> BinaryResult<()> {
    let wrapper = item
        .as_object()
        .filter(|m| m.len() == 1)
        .ok_or_else(|| BinaryError::invalid(array, "array elements must be single-field objects"))?;
    for (name, inner) in wrapper {
        let descriptor = registry
            .descriptor_by_name(name)
            .ok_or_else(|| BinaryError::UnknownFieldName(name.clone()))?;
        if descriptor.field_type != FieldType::Object {
            return Err(BinaryError::invalid(array, format!("element {name} is not an object field")));
        }
        write_field_header(out, descriptor.key);
        write_value(registry, descriptor, inner, out)?;
    }
    Ok(())
}

fn uint(name: &str, value: &Json, max: u64) -> BinaryResult<u64> {
    value
        .as_u64()
        .filter(|v| *v <= max)
        .ok_or_else(|| BinaryError::invalid(name, format!("expected an integer up to {max}, got {value}")))
}

fn text<'a>(name: &str, value: &'a Json) -> BinaryResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| BinaryError::invalid(name, format!("expected a string, got {value}")))
}

fn typed<T: serde::de::DeserializeOwned>(name: &str, value: &Json) -> BinaryResult<T> {
    T::deserialize(value).map_err(|e| BinaryError::invalid(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::build_registry;
    use rpl_types::{Currency, Value};
    use serde_json::json;

    fn header(t: u8, f: u8) -> Vec<u8> {
        let mut out = Vec::new();
        write_field_header(&mut out, FieldKey::new(t, f));
        out
    }

    #[test]
    fn field_headers_pack_small_codes() {
        assert_eq!(header(1, 2), vec![0x12]);
        assert_eq!(header(8, 1), vec![0x81]);
        assert_eq!(header(14, 1), vec![0xE1]);
        assert_eq!(header(15, 1), vec![0xF1]);
        assert_eq!(header(16, 3), vec![0x03, 0x10]);
        assert_eq!(header(2, 27), vec![0x20, 27]);
        assert_eq!(header(17, 17), vec![0x00, 17, 17]);
    }

    #[test]
    fn vl_length_boundaries() {
        for (len, expected) in [
            (0usize, vec![0u8]),
            (192, vec![192]),
            (193, vec![193, 0]),
            (12_480, vec![240, 255]),
            (12_481, vec![241, 0, 0]),
            (MAX_VL_LENGTH, vec![254, 212, 23]),
        ] {
            let mut out = Vec::new();
            write_vl_length(&mut out, len).unwrap();
            assert_eq!(out, expected, "{len}");
        }
        assert!(matches!(
            write_vl_length(&mut Vec::new(), MAX_VL_LENGTH + 1),
            Err(BinaryError::LengthOverflow(_))
        ));
    }

    #[test]
    fn native_amount_sets_positive_bit() {
        let mut out = Vec::new();
        write_amount(&mut out, &Amount::native(100));
        assert_eq!(hex::encode_upper(out), "4000000000000064");
    }

    #[test]
    fn issued_amount_layout() {
        let issuer = Account::from_array([0x11; 20]);
        let usd = Currency::from_code("USD").unwrap();
        let amount = Amount::issued(Value::parse_issued("1").unwrap(), usd, issuer).unwrap();
        let mut out = Vec::new();
        write_amount(&mut out, &amount);
        assert_eq!(out.len(), 48);
        assert_eq!(hex::encode_upper(&out[..8]), "D4838D7EA4C68000");
        assert_eq!(&out[8..28], usd.as_bytes());
        assert_eq!(&out[28..], issuer.as_bytes());

        let zero = Amount::issued(Value::zero_issued(), usd, issuer).unwrap();
        let mut out = Vec::new();
        write_amount(&mut out, &zero);
        assert_eq!(hex::encode_upper(&out[..8]), "8000000000000000");
    }

    #[test]
    fn fields_are_sorted_by_priority() {
        let registry = build_registry();
        let map = json!({
            "Sequence": 1,
            "TransactionType": "Payment",
            "Flags": 0,
        });
        let bytes = encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).unwrap();
        assert_eq!(hex::encode_upper(bytes), "12000022000000002400000001");
    }

    #[test]
    fn signing_mode_omits_signatures() {
        let registry = build_registry();
        let map = json!({
            "TransactionType": "Payment",
            "TxnSignature": "DEADBEEF",
            "SigningPubKey": "",
        });
        let map = map.as_object().unwrap();
        let full = encode_object(&registry, map, EncodeMode::Full).unwrap();
        let signing = encode_object(&registry, map, EncodeMode::Signing).unwrap();
        assert_eq!(hex::encode_upper(&signing), "1200007300");
        assert_eq!(hex::encode_upper(&full), "12000073007404DEADBEEF");
    }

    #[test]
    fn arrays_wrap_objects_and_end_with_marker() {
        let registry = build_registry();
        let map = json!({ "Memos": [ { "Memo": { "MemoData": "01" } } ] });
        let bytes = encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).unwrap();
        // F9 Memos, EA Memo, 7D MemoData, E1 end object, F1 end array.
        assert_eq!(hex::encode_upper(bytes), "F9EA7D0101E1F1");
    }

    #[test]
    fn unknown_names_and_bad_values_fail() {
        let registry = build_registry();
        let map = json!({ "Escrow": 1 });
        assert!(matches!(
            encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full),
            Err(BinaryError::UnknownFieldName(ref n)) if n == "Escrow"
        ));
        let map = json!({ "Sequence": "one" });
        assert!(matches!(
            encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full),
            Err(BinaryError::InvalidValue { .. })
        ));
        let map = json!({ "Memos": [ { "Fee": "10" } ] });
        assert!(encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).is_err());
    }
}
