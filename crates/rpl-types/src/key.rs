use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};
use crate::hash::{decode_fixed, fixed_from_slice};

/// 33-byte compressed public key.
///
/// The all-zero key stands for "no key" and has the empty string as its
/// text form; pseudo-transactions carry an empty `SigningPubKey`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    pub const LEN: usize = 33;
    /// Stands for "no key".
    pub const ZERO: Self = Self([0u8; 33]);

    pub const fn from_array(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }

    /// Accepts 33 bytes, or an empty slice for the zero key.
    pub fn from_slice(bytes: &[u8]) -> TypeResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::ZERO);
        }
        fixed_from_slice("PublicKey", bytes, &hex::encode_upper(bytes)).map(Self)
    }

    /// Empty text parses to the zero key.
    pub fn from_hex(s: &str) -> TypeResult<Self> {
        if s.is_empty() {
            return Ok(Self::ZERO);
        }
        decode_fixed("PublicKey", s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Wire bytes: empty for the zero key.
    pub fn wire_bytes(&self) -> &[u8] {
        if self.is_zero() {
            &[]
        } else {
            &self.0
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 33]
    }

    /// Uppercase hex; empty for the zero key.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.wire_bytes())
    }
}

impl Default for PublicKey {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Variable-length blob (signatures, domains, memo payloads).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct VariableLength(Vec<u8>);

impl VariableLength {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Any even number of hex digits, including none.
    pub fn from_hex(s: &str) -> TypeResult<Self> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| TypeError::hex(s, e))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl From<Vec<u8>> for VariableLength {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for VariableLength {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl fmt::Debug for VariableLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableLength({})", self.to_hex())
    }
}

impl fmt::Display for VariableLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for VariableLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VariableLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_zero_key() {
        let key = PublicKey::from_hex("").unwrap();
        assert!(key.is_zero());
        assert_eq!(key.to_hex(), "");
        assert!(key.wire_bytes().is_empty());
    }

    #[test]
    fn key_hex_roundtrip() {
        let mut bytes = [0x11u8; 33];
        bytes[0] = 0x02;
        let key = PublicKey::from_array(bytes);
        assert_eq!(key.to_hex().len(), 66);
        assert_eq!(PublicKey::from_hex(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn key_wrong_length() {
        assert!(matches!(
            PublicKey::from_hex(&"02".repeat(32)),
            Err(TypeError::InvalidLength { expected: 33, actual: 32, .. })
        ));
    }

    #[test]
    fn blob_accepts_any_length() {
        let blob = VariableLength::from_hex("DEADBEEF").unwrap();
        assert_eq!(blob.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(blob.to_hex(), "DEADBEEF");
        assert!(VariableLength::from_hex("").unwrap().is_empty());
    }

    #[test]
    fn blob_rejects_bad_hex() {
        assert!(matches!(
            VariableLength::from_hex("ABC"),
            Err(TypeError::InvalidHex { .. })
        ));
    }
}
