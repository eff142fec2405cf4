use std::io::Read;

use rpl_types::{
    Account, Amount, Currency, Hash128, Hash160, Hash256, HexU64, LedgerEntryType, PathSet,
    PathStep, TransactionResult, TransactionType, Value, Vector256,
};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::config::BinaryConfig;
use crate::error::{BinaryError, BinaryResult};
use crate::field::{FieldDescriptor, FieldKey, FieldType, Registry};
use crate::reader::BoundedReader;

/// Decode a complete top-level object from `bytes`.
///
/// The input is checked against the configured size limit before any byte
/// is read and must be consumed exactly.
pub fn decode(registry: &Registry, bytes: &[u8], config: &BinaryConfig) -> BinaryResult<Map<String, Json>> {
    if bytes.len() > config.max_message_size {
        return Err(BinaryError::MessageTooLarge {
            size: bytes.len(),
            max: config.max_message_size,
        });
    }
    let mut reader = BoundedReader::from_slice(bytes);
    let map = Decoder::new(registry, config).top_level(&mut reader)?;
    reader.finish("object")?;
    debug!(bytes = bytes.len(), fields = map.len(), "decoded object");
    Ok(map)
}

/// Decode a top-level object that runs to the end of `reader`'s budget.
pub fn decode_object<R: Read>(
    registry: &Registry,
    reader: &mut BoundedReader<R>,
    config: &BinaryConfig,
) -> BinaryResult<Map<String, Json>> {
    Decoder::new(registry, config).top_level(reader)
}

/// Read a one to three byte field header.
pub fn read_field_header<R: Read>(reader: &mut BoundedReader<R>) -> BinaryResult<FieldKey> {
    let first = reader.read_byte()?;
    let mut type_code = first >> 4;
    let mut field_code = first & 0x0f;
    if type_code == 0 {
        type_code = reader.read_byte()?;
    }
    if field_code == 0 {
        field_code = reader.read_byte()?;
    }
    Ok(FieldKey::new(type_code, field_code))
}

/// Read a one to three byte length prefix.
pub fn read_vl_length<R: Read>(reader: &mut BoundedReader<R>) -> BinaryResult<usize> {
    let b1 = reader.read_byte()? as usize;
    match b1 {
        0..=192 => Ok(b1),
        193..=240 => {
            let b2 = reader.read_byte()? as usize;
            Ok(193 + (b1 - 193) * 256 + b2)
        }
        241..=254 => {
            let [b2, b3] = reader.read_array::<2>()?;
            Ok(12_481 + (b1 - 241) * 65_536 + (b2 as usize) * 256 + b3 as usize)
        }
        _ => Err(BinaryError::InvalidLengthPrefix(b1 as u8)),
    }
}

/// Read a length prefix and its payload through a nested reader that must
/// end fully consumed.
pub fn read_vl<R: Read>(reader: &mut BoundedReader<R>, context: &'static str) -> BinaryResult<Vec<u8>> {
    let len = read_vl_length(reader)?;
    let mut inner = reader.nested(len as u64)?;
    let bytes = inner.read_rest()?;
    inner.finish(context)?;
    Ok(bytes)
}

/// Read a native (8 byte) or issued (48 byte) amount, picked by the high bit.
pub fn read_amount<R: Read>(reader: &mut BoundedReader<R>) -> BinaryResult<Amount> {
    let bits = u64::from_be_bytes(reader.read_array::<8>()?);
    let positive = bits & (1 << 62) != 0;
    if bits & (1 << 63) == 0 {
        let drops = bits & ((1 << 62) - 1);
        let value = Value::native(drops, !positive)?;
        return Ok(Amount {
            value,
            currency: Currency::NATIVE,
            issuer: Account::default(),
        });
    }
    let currency = Currency::from_array(reader.read_array::<20>()?);
    let issuer = Account::from_array(reader.read_array::<20>()?);
    let mantissa = bits & ((1 << 54) - 1);
    let value = if mantissa == 0 {
        Value::zero_issued()
    } else {
        let exponent = ((bits >> 54) & 0xff) as i32 - 97;
        Value::issued(!positive, mantissa, exponent)?
    };
    Ok(Amount::issued(value, currency, issuer)?)
}

/// Read path steps up to the `0x00` terminator; `0xff` separates paths.
pub fn read_path_set<R: Read>(reader: &mut BoundedReader<R>) -> BinaryResult<PathSet> {
    let mut paths = Vec::new();
    let mut current = Vec::new();
    loop {
        let flags = reader.read_byte()?;
        match flags {
            PathSet::END => break,
            PathSet::PATH_BOUNDARY => paths.push(std::mem::take(&mut current)),
            _ => {
                let mut step = PathStep::default();
                if flags & PathStep::ACCOUNT_BIT != 0 {
                    step.account = Some(Account::from_array(reader.read_array::<20>()?));
                }
                if flags & PathStep::CURRENCY_BIT != 0 {
                    step.currency = Some(Currency::from_array(reader.read_array::<20>()?));
                }
                if flags & PathStep::ISSUER_BIT != 0 {
                    step.issuer = Some(Account::from_array(reader.read_array::<20>()?));
                }
                current.push(step);
            }
        }
    }
    if !current.is_empty() || !paths.is_empty() {
        paths.push(current);
    }
    Ok(PathSet::new(paths))
}

struct Decoder<'a> {
    registry: &'a Registry,
    config: &'a BinaryConfig,
}

impl<'a> Decoder<'a> {
    fn new(registry: &'a Registry, config: &'a BinaryConfig) -> Self {
        Self { registry, config }
    }

    fn top_level<R: Read>(&self, reader: &mut BoundedReader<R>) -> BinaryResult<Map<String, Json>> {
        let mut map = Map::new();
        while !reader.is_exhausted() {
            let key = read_field_header(reader)?;
            let descriptor = self.descriptor(key, "object")?;
            let value = self.read_value(reader, descriptor, 0)?;
            map.insert(descriptor.name.to_string(), value);
        }
        Ok(map)
    }

    /// Fields up to the end-of-object marker.
    fn inner_object<R: Read>(&self, reader: &mut BoundedReader<R>, depth: usize) -> BinaryResult<Map<String, Json>> {
        self.check_depth(depth)?;
        let mut map = Map::new();
        loop {
            let key = read_field_header(reader)?;
            if key == FieldKey::END_OF_OBJECT {
                return Ok(map);
            }
            let descriptor = self.descriptor(key, "object")?;
            let value = self.read_value(reader, descriptor, depth)?;
            map.insert(descriptor.name.to_string(), value);
        }
    }

    /// Wrapped objects up to the end-of-array marker.
    fn array<R: Read>(&self, reader: &mut BoundedReader<R>, depth: usize) -> BinaryResult<Vec<Json>> {
        self.check_depth(depth)?;
        let mut items = Vec::new();
        loop {
            let key = read_field_header(reader)?;
            if key == FieldKey::END_OF_ARRAY {
                return Ok(items);
            }
            let descriptor = self.descriptor(key, "array")?;
            if descriptor.field_type != FieldType::Object {
                return Err(BinaryError::invalid(
                    descriptor.name,
                    "array elements must be object fields",
                ));
            }
            let inner = self.inner_object(reader, depth + 1)?;
            let mut wrapper = Map::new();
            wrapper.insert(descriptor.name.to_string(), Json::Object(inner));
            items.push(Json::Object(wrapper));
        }
    }

    fn descriptor(&self, key: FieldKey, context: &'static str) -> BinaryResult<&'a FieldDescriptor> {
        if key == FieldKey::END_OF_OBJECT || key == FieldKey::END_OF_ARRAY {
            let marker = if key == FieldKey::END_OF_OBJECT {
                "end-of-object marker"
            } else {
                "end-of-array marker"
            };
            return Err(BinaryError::UnexpectedMarker { marker, context });
        }
        self.registry
            .descriptor(key)
            .ok_or(BinaryError::UnknownField(key))
    }

    fn check_depth(&self, depth: usize) -> BinaryResult<()> {
        if depth > self.config.max_nesting_depth {
            return Err(BinaryError::DepthExceeded {
                max: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn read_value<R: Read>(
        &self,
        reader: &mut BoundedReader<R>,
        descriptor: &FieldDescriptor,
        depth: usize,
    ) -> BinaryResult<Json> {
        let name = descriptor.name;
        trace!(field = name, remaining = reader.remaining(), "reading field");
        let value = match descriptor.field_type {
            FieldType::UInt8 => {
                let b = reader.read_byte()?;
                match name {
                    "TransactionResult" => Json::from(TransactionResult::from_code(b)?.name()),
                    _ => Json::from(b),
                }
            }
            FieldType::UInt16 => {
                let v = u16::from_be_bytes(reader.read_array::<2>()?);
                match name {
                    "TransactionType" => Json::from(TransactionType::from_code(v)?.name()),
                    "LedgerEntryType" => Json::from(LedgerEntryType::from_code(v)?.name()),
                    _ => Json::from(v),
                }
            }
            FieldType::UInt32 => Json::from(u32::from_be_bytes(reader.read_array::<4>()?)),
            FieldType::UInt64 => {
                let v = u64::from_be_bytes(reader.read_array::<8>()?);
                Json::from(HexU64(v).to_string())
            }
            FieldType::Hash128 => Json::from(Hash128::from_array(reader.read_array()?).to_hex()),
            FieldType::Hash160 => Json::from(Hash160::from_array(reader.read_array()?).to_hex()),
            FieldType::Hash256 => Json::from(Hash256::from_array(reader.read_array()?).to_hex()),
            FieldType::Amount => to_json(name, &read_amount(reader)?)?,
            FieldType::VariableLength => Json::from(hex::encode_upper(read_vl(reader, name)?)),
            FieldType::Account => {
                let bytes = read_vl(reader, name)?;
                Json::from(Account::from_slice(&bytes)?.to_address())
            }
            FieldType::Object => Json::Object(self.inner_object(reader, depth + 1)?),
            FieldType::Array => Json::Array(self.array(reader, depth + 1)?),
            FieldType::PathSet => to_json(name, &read_path_set(reader)?)?,
            FieldType::Vector256 => {
                let bytes = read_vl(reader, name)?;
                to_json(name, &Vector256::from_bytes(&bytes)?)?
            }
        };
        Ok(value)
    }
}

fn to_json<T: serde::Serialize>(name: &str, value: &T) -> BinaryResult<Json> {
    serde_json::to_value(value).map_err(|e| BinaryError::invalid(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_object, write_vl_length, EncodeMode, MAX_VL_LENGTH};
    use crate::field::build_registry;
    use proptest::prelude::*;
    use rpl_types::ErrorKind;
    use serde_json::json;

    const ISSUER: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

    fn payment() -> Json {
        json!({
            "TransactionType": "Payment",
            "Flags": 2147483648u32,
            "Sequence": 7,
            "LastLedgerSequence": 100,
            "Amount": { "value": "1.5", "currency": "USD", "issuer": ISSUER },
            "SendMax": "1000",
            "Fee": "10",
            "SigningPubKey": "",
            "TxnSignature": "3045022100",
            "Account": ISSUER,
            "Destination": "rrrrrrrrrrrrrrrrrrrrBZbvji",
            "Paths": [[{ "currency": "USD", "issuer": ISSUER }], [{ "account": ISSUER }]],
            "Memos": [{ "Memo": { "MemoType": "6869", "MemoData": "" } }],
            "InvoiceID": "AB".repeat(32),
        })
    }

    #[test]
    fn encoded_object_decodes_to_same_map() {
        let registry = build_registry();
        let map = payment();
        let bytes = encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).unwrap();
        let decoded = decode(&registry, &bytes, &BinaryConfig::default()).unwrap();
        assert_eq!(Json::Object(decoded), map);
    }

    #[test]
    fn metadata_shapes_decode() {
        let registry = build_registry();
        let meta = json!({
            "TransactionIndex": 3,
            "TransactionResult": "tecPATH_DRY",
            "AffectedNodes": [
                { "ModifiedNode": {
                    "LedgerEntryType": "AccountRoot",
                    "LedgerIndex": "00".repeat(32),
                    "FinalFields": { "Balance": "99", "OwnerNode": "000000000000000A" },
                    "PreviousFields": { "Balance": "100" },
                } },
                { "DeletedNode": {
                    "LedgerEntryType": "DirectoryNode",
                    "LedgerIndex": "11".repeat(32),
                    "FinalFields": { "Indexes": ["22".repeat(32)] },
                } },
            ],
        });
        let bytes = encode_object(&registry, meta.as_object().unwrap(), EncodeMode::Full).unwrap();
        let decoded = decode(&registry, &bytes, &BinaryConfig::default()).unwrap();
        assert_eq!(Json::Object(decoded), meta);
    }

    #[test]
    fn unknown_field_key_is_fatal() {
        let registry = build_registry();
        let err = decode(&registry, &[0x1F, 0x00, 0x00], &BinaryConfig::default()).unwrap_err();
        assert!(matches!(err, BinaryError::UnknownField(k) if k == FieldKey::new(1, 15)));
        assert_eq!(err.kind(), ErrorKind::UnknownTypeCode);
    }

    #[test]
    fn truncation_is_reported() {
        let registry = build_registry();
        let map = payment();
        let bytes = encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).unwrap();
        // Cuts inside a field; a cut between top-level fields is a shorter object.
        for cut in [1, 2, bytes.len() - 1] {
            let err = decode(&registry, &bytes[..cut], &BinaryConfig::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedInput, "cut at {cut}: {err}");
        }
    }

    #[test]
    fn limits_are_enforced() {
        let registry = build_registry();
        let map = payment();
        let bytes = encode_object(&registry, map.as_object().unwrap(), EncodeMode::Full).unwrap();

        let small = BinaryConfig {
            max_message_size: bytes.len() - 1,
            ..Default::default()
        };
        assert!(matches!(
            decode(&registry, &bytes, &small),
            Err(BinaryError::MessageTooLarge { .. })
        ));

        // Memos -> Memo sits two levels below the top.
        let shallow = BinaryConfig {
            max_nesting_depth: 1,
            ..Default::default()
        };
        let err = decode(&registry, &bytes, &shallow).unwrap_err();
        assert!(matches!(err, BinaryError::DepthExceeded { max: 1 }));
        assert_eq!(err.kind(), ErrorKind::Limit);
    }

    #[test]
    fn malformed_vl_payloads() {
        let registry = build_registry();
        // Indexes (19, 1) with a 33-byte payload.
        let mut bytes = vec![0x01, 19, 33];
        bytes.extend_from_slice(&[0u8; 33]);
        let err = decode(&registry, &bytes, &BinaryConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);

        // Account (8, 1) carrying 19 bytes.
        let mut bytes = vec![0x81, 19];
        bytes.extend_from_slice(&[0u8; 19]);
        let err = decode(&registry, &bytes, &BinaryConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);

        assert!(matches!(
            read_vl_length(&mut BoundedReader::from_slice(&[0xFF])),
            Err(BinaryError::InvalidLengthPrefix(0xFF))
        ));
    }

    #[test]
    fn stray_end_marker_is_rejected() {
        let registry = build_registry();
        let err = decode(&registry, &[0xE1], &BinaryConfig::default()).unwrap_err();
        assert!(matches!(err, BinaryError::UnexpectedMarker { .. }));
    }

    #[test]
    fn unknown_transaction_type_code_is_fatal() {
        let registry = build_registry();
        let err = decode(&registry, &[0x12, 0x00, 0x63], &BinaryConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeCode);
    }

    proptest! {
        #[test]
        fn prop_vl_length_roundtrip(len in 0usize..=MAX_VL_LENGTH) {
            let mut out = Vec::new();
            write_vl_length(&mut out, len).unwrap();
            let mut reader = BoundedReader::from_slice(&out);
            prop_assert_eq!(read_vl_length(&mut reader).unwrap(), len);
            prop_assert!(reader.is_exhausted());
        }

        #[test]
        fn prop_field_header_roundtrip(t in 1u8.., f in 1u8..) {
            let mut out = Vec::new();
            crate::encode::write_field_header(&mut out, FieldKey::new(t, f));
            let mut reader = BoundedReader::from_slice(&out);
            prop_assert_eq!(read_field_header(&mut reader).unwrap(), FieldKey::new(t, f));
            prop_assert!(reader.is_exhausted());
        }
    }
}
