use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};

/// Decode hex text into exactly `N` bytes.
///
/// A length mismatch is an error; nothing is padded or truncated.
pub(crate) fn decode_fixed<const N: usize>(type_name: &'static str, s: &str) -> TypeResult<[u8; N]> {
    let bytes = hex::decode(s).map_err(|e| TypeError::hex(s, e))?;
    fixed_from_slice(type_name, &bytes, s)
}

pub(crate) fn fixed_from_slice<const N: usize>(
    type_name: &'static str,
    bytes: &[u8],
    input: &str,
) -> TypeResult<[u8; N]> {
    if bytes.len() != N {
        return Err(TypeError::InvalidLength {
            type_name,
            expected: N,
            actual: bytes.len(),
            input: input.to_string(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(bytes);
    Ok(arr)
}

macro_rules! fixed_hash {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Wrap raw bytes.
            pub const fn from_array(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copy from a slice that must be exactly the declared width.
            pub fn from_slice(bytes: &[u8]) -> TypeResult<Self> {
                fixed_from_slice(stringify!($name), bytes, &hex::encode_upper(bytes)).map(Self)
            }

            /// Parse from hex text that must decode to exactly the declared width.
            pub fn from_hex(s: &str) -> TypeResult<Self> {
                decode_fixed(stringify!($name), s).map(Self)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Uppercase hex.
            pub fn to_hex(&self) -> String {
                hex::encode_upper(self.0)
            }

            /// True for the all-zero value, used as "empty".
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> TypeResult<Self> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(h: $name) -> Self {
                h.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = TypeError;

            fn try_from(bytes: &[u8]) -> TypeResult<Self> {
                Self::from_slice(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hash!(
    /// 128-bit value (email hashes).
    Hash128,
    16
);

fixed_hash!(
    /// 160-bit value (currency codes and issuers in directory nodes).
    Hash160,
    20
);

fixed_hash!(
    /// 256-bit value: transaction ids, ledger indexes, tree node hashes.
    ///
    /// Ordering is byte-wise lexicographic, which is the order used for
    /// canonical tree layouts.
    Hash256,
    32
);

/// Untyped input accepted by [`Hash256::new`].
#[derive(Clone, Copy, Debug)]
pub enum HashInput<'a> {
    /// Raw bytes; must be exactly 32 long.
    Bytes(&'a [u8]),
    /// Hex text; must be exactly 64 characters.
    Hex(&'a str),
}

impl<'a> From<&'a [u8]> for HashInput<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a str> for HashInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Hex(s)
    }
}

impl Hash256 {
    /// Zero hash, used for empty tree branches.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Build from raw 32 bytes or 64 hex characters.
    pub fn new<'a>(input: impl Into<HashInput<'a>>) -> TypeResult<Self> {
        match input.into() {
            HashInput::Bytes(b) => Self::from_slice(b),
            HashInput::Hex(s) => {
                if s.len() != 64 {
                    return Err(TypeError::InvalidLength {
                        type_name: "Hash256",
                        expected: 32,
                        actual: s.len() / 2,
                        input: s.to_string(),
                    });
                }
                Self::from_hex(s)
            }
        }
    }

    /// Bytewise XOR.
    pub fn xor(&self, other: &Hash256) -> Hash256 {
        let mut out = [0u8; 32];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.0[i] ^ other.0[i];
        }
        Hash256(out)
    }

    /// Hex of the first `len` bytes, for log lines.
    pub fn short_hex(&self, len: usize) -> String {
        hex::encode_upper(&self.0[..len.min(32)])
    }
}

/// Ordered sequence of 256-bit hashes (directory indexes, amendment ids).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector256(pub Vec<Hash256>);

impl Vector256 {
    pub fn new(hashes: Vec<Hash256>) -> Self {
        Self(hashes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hash256> {
        self.0.iter()
    }

    /// Concatenated raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|h| h.0).collect()
    }

    /// Split raw bytes into hashes; the length must be a multiple of 32.
    pub fn from_bytes(bytes: &[u8]) -> TypeResult<Self> {
        if bytes.len() % Hash256::LEN != 0 {
            return Err(TypeError::InvalidLength {
                type_name: "Vector256",
                expected: (bytes.len() / Hash256::LEN + 1) * Hash256::LEN,
                actual: bytes.len(),
                input: hex::encode_upper(bytes),
            });
        }
        bytes
            .chunks_exact(Hash256::LEN)
            .map(Hash256::from_slice)
            .collect::<TypeResult<Vec<_>>>()
            .map(Self)
    }
}

impl From<Vec<Hash256>> for Vector256 {
    fn from(v: Vec<Hash256>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_zero() {
        assert!(Hash256::ZERO.is_zero());
        assert!(Hash256::default().is_zero());
        assert!(!Hash256::from_array([1; 32]).is_zero());
    }

    #[test]
    fn hex_is_uppercase() {
        let h = Hash256::from_array([0xab; 32]);
        assert_eq!(h.to_hex(), "AB".repeat(32));
        assert_eq!(format!("{h}"), h.to_hex());
    }

    #[test]
    fn lowercase_hex_is_accepted() {
        let h = Hash256::from_hex(&"cd".repeat(32)).unwrap();
        assert_eq!(h, Hash256::from_array([0xcd; 32]));
    }

    #[test]
    fn wrong_width_is_rejected_not_padded() {
        let short = "00".repeat(31);
        let long = "00".repeat(33);
        assert!(matches!(
            Hash256::from_hex(&short),
            Err(TypeError::InvalidLength { expected: 32, actual: 31, .. })
        ));
        assert!(matches!(
            Hash256::from_hex(&long),
            Err(TypeError::InvalidLength { expected: 32, actual: 33, .. })
        ));
        assert!(Hash128::from_hex(&"00".repeat(20)).is_err());
    }

    #[test]
    fn new_accepts_bytes_or_hex() {
        let bytes = [7u8; 32];
        let from_bytes = Hash256::new(&bytes[..]).unwrap();
        let from_hex = Hash256::new("07".repeat(32).as_str()).unwrap();
        assert_eq!(from_bytes, from_hex);
    }

    #[test]
    fn new_rejects_odd_inputs() {
        assert!(Hash256::new(&[1u8; 31][..]).is_err());
        assert!(Hash256::new("07".repeat(31).as_str()).is_err());
        let err = Hash256::new("ZZ".repeat(32).as_str()).unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex { ref input, .. } if input.starts_with("ZZ")));
    }

    #[test]
    fn xor_combines_both_operands() {
        let a = Hash256::from_array([0b1010_1010; 32]);
        let b = Hash256::from_array([0b0101_0101; 32]);
        assert_eq!(a.xor(&b), Hash256::from_array([0xff; 32]));
        assert_eq!(a.xor(&a), Hash256::ZERO);
    }

    #[test]
    fn ordering_is_bytewise() {
        let mut low = [0u8; 32];
        low[31] = 0xff;
        let mut high = [0u8; 32];
        high[0] = 0x01;
        assert!(Hash256::from_array(low) < Hash256::from_array(high));
    }

    #[test]
    fn short_hex_truncates() {
        let h = Hash256::from_array([0x12; 32]);
        assert_eq!(h.short_hex(4), "12121212");
    }

    #[test]
    fn serde_uses_hex_text() {
        let h = Hash160::from_array([0x0f; 20]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "0F".repeat(20)));
        let parsed: Hash160 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn vector256_splits_on_32_bytes() {
        let v = Vector256::new(vec![Hash256::from_array([1; 32]), Hash256::from_array([2; 32])]);
        let bytes = v.to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(Vector256::from_bytes(&bytes).unwrap(), v);
        assert!(Vector256::from_bytes(&bytes[..63]).is_err());
    }

    proptest! {
        #[test]
        fn prop_hex_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let h = Hash256::from_array(bytes);
            let parsed = Hash256::from_hex(&h.to_hex()).unwrap();
            prop_assert_eq!(parsed.as_bytes(), &bytes);
        }

        #[test]
        fn prop_ordering_matches_slices(
            a in proptest::array::uniform32(any::<u8>()),
            b in proptest::array::uniform32(any::<u8>()),
        ) {
            let ha = Hash256::from_array(a);
            let hb = Hash256::from_array(b);
            prop_assert_eq!(ha.cmp(&hb), a[..].cmp(&b[..]));
        }
    }
}
