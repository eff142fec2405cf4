use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TypeError, TypeResult};

/// 64-bit protocol integer written as 16 uppercase hex digits in JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexU64(pub u64);

impl HexU64 {
    /// Up to 16 hex digits, either case.
    pub fn from_hex(s: &str) -> TypeResult<Self> {
        if s.is_empty() || s.len() > 16 {
            return Err(TypeError::InvalidLength {
                type_name: "HexU64",
                expected: 8,
                actual: s.len().div_ceil(2),
                input: s.to_string(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| TypeError::InvalidHex {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for HexU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl FromStr for HexU64 {
    type Err = TypeError;

    fn from_str(s: &str) -> TypeResult<Self> {
        Self::from_hex(s)
    }
}

impl From<u64> for HexU64 {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl Serialize for HexU64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
