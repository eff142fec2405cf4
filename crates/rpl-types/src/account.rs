use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};
use crate::hash::{fixed_from_slice, Hash256};

/// Version byte prefixed to account ids before base58-check encoding.
pub const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Encode `payload` with a leading version byte and a 4-byte double-SHA-256
/// checksum, using the ledger's base58 alphabet.
pub fn encode_base58_check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 1);
    data.push(version);
    data.extend_from_slice(payload);
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// Decode base58-check text, verify the checksum and version byte, and
/// return the payload without the version byte.
pub fn decode_base58_check(input: &str, version: u8) -> TypeResult<Vec<u8>> {
    let decoded = bs58::decode(input)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => TypeError::ChecksumMismatch {
                input: input.to_string(),
            },
            other => TypeError::InvalidBase58 {
                input: input.to_string(),
                reason: other.to_string(),
            },
        })?;
    let (&actual, payload) = decoded.split_first().ok_or_else(|| TypeError::InvalidBase58 {
        input: input.to_string(),
        reason: "empty payload".into(),
    })?;
    if actual != version {
        return Err(TypeError::WrongVersion {
            input: input.to_string(),
            expected: version,
            actual,
        });
    }
    Ok(payload.to_vec())
}

macro_rules! account_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 20]);

        impl $name {
            pub const LEN: usize = 20;

            pub const fn from_array(bytes: [u8; 20]) -> Self {
                Self(bytes)
            }

            /// Exactly 20 bytes.
            pub fn from_slice(bytes: &[u8]) -> TypeResult<Self> {
                fixed_from_slice(stringify!($name), bytes, &hex::encode_upper(bytes)).map(Self)
            }

            /// Parse a base58-check address carrying the account-id version byte.
            pub fn from_address(s: &str) -> TypeResult<Self> {
                let payload = decode_base58_check(s, ACCOUNT_ID_VERSION)?;
                fixed_from_slice(stringify!($name), &payload, s).map(Self)
            }

            /// Base58-check address, e.g. `rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh`.
            pub fn to_address(&self) -> String {
                encode_base58_check(ACCOUNT_ID_VERSION, &self.0)
            }

            pub fn as_bytes(&self) -> &[u8; 20] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 20]
            }

            /// The id left-aligned in a zero-filled 256-bit value.
            pub fn to_hash256(&self) -> Hash256 {
                let mut out = [0u8; 32];
                out[..20].copy_from_slice(&self.0);
                Hash256::from_array(out)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_address())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_address())
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> TypeResult<Self> {
                Self::from_address(s)
            }
        }

        impl From<[u8; 20]> for $name {
            fn from(bytes: [u8; 20]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_address())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_address(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

account_id!(
    /// 160-bit account identifier, shown as a base58-check address.
    Account
);

account_id!(
    /// Account id nominated as an alternative signing key for an account.
    RegularKey
);

impl From<RegularKey> for Account {
    fn from(k: RegularKey) -> Self {
        Account(k.0)
    }
}
