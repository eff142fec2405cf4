use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::account::Account;
use crate::error::{TypeError, TypeResult};
use crate::hash::decode_fixed;

/// 20-byte currency code.
///
/// The all-zero code is the native currency. Standard codes are three ASCII
/// characters stored at bytes 12..15; anything else is shown as hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 20]);

const CURRENCY_SYMBOLS: &[u8] = b"?!@#$%^&*<>(){}[]|";

impl Currency {
    /// The all-zero code reserved for XRP.
    pub const NATIVE: Self = Self([0u8; 20]);

    pub const fn from_array(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_native(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse `XRP`, a three-character code, or 40 hex characters.
    pub fn from_code(s: &str) -> TypeResult<Self> {
        if s == "XRP" {
            return Ok(Self::NATIVE);
        }
        if s.len() == 3 {
            let code = s.as_bytes();
            if !code.iter().all(|c| valid_code_char(*c)) {
                return Err(TypeError::InvalidCurrency(s.to_string()));
            }
            let mut bytes = [0u8; 20];
            bytes[12..15].copy_from_slice(code);
            return Ok(Self(bytes));
        }
        if s.len() == 40 {
            return decode_fixed("Currency", s)
                .map(Self)
                .map_err(|_| TypeError::InvalidCurrency(s.to_string()));
        }
        Err(TypeError::InvalidCurrency(s.to_string()))
    }

    fn standard_code(&self) -> Option<&str> {
        let b = &self.0;
        let padding_clear = b[..12].iter().all(|x| *x == 0) && b[15..].iter().all(|x| *x == 0);
        if padding_clear && b[12..15].iter().all(|c| valid_code_char(*c)) {
            std::str::from_utf8(&b[12..15]).ok()
        } else {
            None
        }
    }
}

fn valid_code_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || CURRENCY_SYMBOLS.contains(&c)
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            return f.write_str("XRP");
        }
        match self.standard_code() {
            Some(code) => f.write_str(code),
            None => f.write_str(&hex::encode_upper(self.0)),
        }
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({self})")
    }
}

impl FromStr for Currency {
    type Err = TypeError;

    fn from_str(s: &str) -> TypeResult<Self> {
        Self::from_code(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_code(&s).map_err(de::Error::custom)
    }
}

/// Numeric part of an [`Amount`].
///
/// Native values are whole drops. Issued values keep a mantissa normalized
/// into `[10^15, 10^16)` and a decimal exponent in `[-96, 80]`; zero has
/// mantissa 0 and exponent 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Value {
    native: bool,
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl Value {
    /// Smallest normalized issued mantissa (16 digits).
    pub const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
    /// Largest normalized issued mantissa.
    pub const MAX_MANTISSA: u64 = 9_999_999_999_999_999;
    /// Smallest issued exponent.
    pub const MIN_EXPONENT: i32 = -96;
    /// Largest issued exponent.
    pub const MAX_EXPONENT: i32 = 80;
    /// 100 billion units of 10^6 drops.
    pub const MAX_NATIVE: u64 = 100_000_000_000_000_000;

    /// Fails above `MAX_NATIVE`. Negative zero is stored as zero.
    pub fn native(drops: u64, negative: bool) -> TypeResult<Self> {
        if drops > Self::MAX_NATIVE {
            return Err(TypeError::InvalidAmount {
                input: drops.to_string(),
                reason: "native amount out of range".into(),
            });
        }
        Ok(Self {
            native: true,
            negative: negative && drops != 0,
            mantissa: drops,
            exponent: 0,
        })
    }

    /// Build an issued value, normalizing mantissa and exponent.
    pub fn issued(negative: bool, mantissa: u64, exponent: i32) -> TypeResult<Self> {
        normalize(negative, mantissa, i64::from(exponent), &format!("{mantissa}e{exponent}"))
    }

    /// Issued zero, encoded with the canonical zero bit pattern.
    pub fn zero_issued() -> Self {
        Self {
            native: false,
            negative: false,
            mantissa: 0,
            exponent: 0,
        }
    }

    /// Parse a whole number of drops, optionally signed.
    pub fn parse_native(s: &str) -> TypeResult<Self> {
        let (negative, digits) = split_sign(s);
        if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(TypeError::InvalidAmount {
                input: s.to_string(),
                reason: "native amounts are whole drops".into(),
            });
        }
        let drops = digits.parse::<u64>().map_err(|e| TypeError::InvalidAmount {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::native(drops, negative).map_err(|_| TypeError::InvalidAmount {
            input: s.to_string(),
            reason: "native amount out of range".into(),
        })
    }

    /// Parse decimal text such as `1`, `-0.25` or `1.5e-3`.
    pub fn parse_issued(s: &str) -> TypeResult<Self> {
        let bad = |reason: &str| TypeError::InvalidAmount {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (negative, body) = split_sign(s);
        let (number, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exp = body[pos + 1..]
                    .parse::<i32>()
                    .map_err(|_| bad("bad exponent"))?;
                (&body[..pos], i64::from(exp))
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad("no digits"));
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|c| c.is_ascii_digit()) {
            return Err(bad("non-digit character"));
        }

        let all_digits = format!("{int_part}{frac_part}");
        let mut digits = all_digits.trim_start_matches('0').to_string();
        let mut exponent = exponent - frac_part.len() as i64;
        if digits.is_empty() {
            return Ok(Self::zero_issued());
        }
        // Digits past what a u64 holds cannot survive normalization anyway.
        while digits.len() > 18 {
            digits.pop();
            exponent += 1;
        }
        let mantissa = digits.parse::<u64>().map_err(|_| bad("mantissa overflow"))?;
        normalize(negative, mantissa, exponent, s)
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Drops for native values, the normalized mantissa otherwise.
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Always 0 for native values.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn normalize(negative: bool, mut mantissa: u64, mut exponent: i64, input: &str) -> TypeResult<Value> {
    if mantissa == 0 {
        return Ok(Value::zero_issued());
    }
    while mantissa < Value::MIN_MANTISSA {
        mantissa *= 10;
        exponent -= 1;
    }
    while mantissa > Value::MAX_MANTISSA {
        mantissa /= 10;
        exponent += 1;
    }
    if exponent > i64::from(Value::MAX_EXPONENT) {
        return Err(TypeError::InvalidAmount {
            input: input.to_string(),
            reason: "exponent overflow".into(),
        });
    }
    if exponent < i64::from(Value::MIN_EXPONENT) {
        return Ok(Value::zero_issued());
    }
    Ok(Value {
        native: false,
        negative,
        mantissa,
        exponent: exponent as i32,
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa == 0 {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        if self.native {
            return write!(f, "{}", self.mantissa);
        }
        let exponent = self.exponent;
        if exponent != 0 && !(-25..=-5).contains(&exponent) {
            return write!(f, "{}e{}", self.mantissa, exponent);
        }
        let shift = (-exponent) as usize;
        let mut digits = self.mantissa.to_string();
        if shift == 0 {
            return f.write_str(&digits);
        }
        if digits.len() <= shift {
            digits = format!("{}{digits}", "0".repeat(shift + 1 - digits.len()));
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - shift);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            f.write_str(int_part)
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

/// A quantity of native drops, or of an issued currency from an issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Amount {
    pub value: Value,
    pub currency: Currency,
    /// Zero for native amounts.
    pub issuer: Account,
}

impl Amount {
    /// Native amount; drops above `Value::MAX_NATIVE` are clamped.
    pub fn native(drops: u64) -> Self {
        Self {
            value: Value {
                native: true,
                negative: false,
                mantissa: drops.min(Value::MAX_NATIVE),
                exponent: 0,
            },
            currency: Currency::NATIVE,
            issuer: Account::default(),
        }
    }

    /// Fails when `value` or `currency` is native.
    pub fn issued(value: Value, currency: Currency, issuer: Account) -> TypeResult<Self> {
        if value.is_native() || currency.is_native() {
            return Err(TypeError::InvalidAmount {
                input: format!("{value}/{currency}"),
                reason: "issued amounts need a non-native value and currency".into(),
            });
        }
        Ok(Self {
            value,
            currency,
            issuer,
        })
    }

    /// Parse a drops string.
    pub fn from_drops(s: &str) -> TypeResult<Self> {
        let value = Value::parse_native(s)?;
        Ok(Self {
            value,
            currency: Currency::NATIVE,
            issuer: Account::default(),
        })
    }

    pub fn is_native(&self) -> bool {
        self.value.is_native()
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::native(0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_native() {
            return serializer.collect_str(&self.value);
        }
        let mut s = serializer.serialize_struct("Amount", 3)?;
        s.serialize_field("value", &self.value.to_string())?;
        s.serialize_field("currency", &self.currency)?;
        s.serialize_field("issuer", &self.issuer)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a drops string or an object with value, currency and issuer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_drops(v).map_err(E::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Amount, A::Error> {
        let mut value: Option<String> = None;
        let mut currency: Option<Currency> = None;
        let mut issuer: Option<Account> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "value" => value = Some(map.next_value()?),
                "currency" => currency = Some(map.next_value()?),
                "issuer" => issuer = Some(map.next_value()?),
                _ => {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
        }
        let value = value.ok_or_else(|| de::Error::missing_field("value"))?;
        let currency = currency.ok_or_else(|| de::Error::missing_field("currency"))?;
        let issuer = issuer.ok_or_else(|| de::Error::missing_field("issuer"))?;
        let value = Value::parse_issued(&value).map_err(de::Error::custom)?;
        Amount::issued(value, currency, issuer).map_err(de::Error::custom)
    }
}
