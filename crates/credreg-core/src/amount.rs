//! # Amounts — Unsigned Balance and Fee Values
//!
//! `Amount` is a non-negative 128-bit quantity of a currency. All arithmetic
//! is checked: an overflowing credit or an underflowing debit is an error,
//! never a wrap.
//!
//! Serializes as a decimal string so values above `u64::MAX` survive JSON
//! and YAML; deserialization also accepts a bare integer.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::canonical::{Canonical, CanonicalWriter};
use crate::error::CredregError;

/// A non-negative currency amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw value.
    pub const fn new(v: u128) -> Self {
        Self(v)
    }

    /// The raw value.
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Result<Amount, CredregError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| CredregError::Overflow(format!("{self} + {other}")))
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Result<Amount, CredregError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| CredregError::Overflow(format!("{self} - {other}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(u128::from(v))
    }
}

impl std::str::FromStr for Amount {
    type Err = CredregError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Amount)
            .map_err(|e| CredregError::InvalidValue(format!("amount {s:?}: {e}")))
    }
}

impl Canonical for Amount {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_u128(self.0);
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                u64::try_from(v)
                    .map(Amount::from)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Amount::new(10);
        let b = Amount::new(3);
        assert_eq!(a.checked_add(b).unwrap(), Amount::new(13));
        assert_eq!(a.checked_sub(b).unwrap(), Amount::new(7));
    }

    #[test]
    fn test_sub_underflow_is_error() {
        assert!(Amount::new(1).checked_sub(Amount::new(2)).is_err());
    }

    #[test]
    fn test_add_overflow_is_error() {
        assert!(Amount::new(u128::MAX).checked_add(Amount::new(1)).is_err());
    }

    #[test]
    fn test_serde_string_and_integer() {
        let a: Amount = serde_json::from_str("\"340282366920938463463374607431768211455\"").unwrap();
        assert_eq!(a.value(), u128::MAX);
        let b: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(b, Amount::new(42));
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"42\"");
        assert!(serde_json::from_str::<Amount>("-1").is_err());
    }

    #[test]
    fn test_canonical_is_16_bytes_be() {
        let cb = crate::CanonicalBytes::new(&Amount::new(1));
        assert_eq!(cb.len(), 16);
        assert_eq!(cb.as_bytes()[15], 1);
    }
}
