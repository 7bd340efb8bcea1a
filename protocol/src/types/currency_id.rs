//! Currency identifiers such as `MONEY` or `NOVA.X`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::{CURRENCY_ID_INNER_SYMBOLS, MAX_CURRENCY_ID_LENGTH, MIN_CURRENCY_ID_LENGTH};
use crate::error::ValidationError;

/// A validated currency id.
///
/// 3 to 10 characters; first and last are `A-Z0-9`, inner characters may
/// also be one of `_.!$*+@`. Construction is the only place validation
/// happens, so a `CurrencyId` in hand is always well formed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyId(String);

impl CurrencyId {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        validate(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

fn validate(s: &str) -> Result<(), ValidationError> {
    let len = s.len();
    if !(MIN_CURRENCY_ID_LENGTH..=MAX_CURRENCY_ID_LENGTH).contains(&len) {
        return Err(ValidationError::InvalidFormat(format!(
            "currency id {s:?} must be {MIN_CURRENCY_ID_LENGTH}..={MAX_CURRENCY_ID_LENGTH} characters"
        )));
    }

    let edge = |b: u8| b.is_ascii_uppercase() || b.is_ascii_digit();
    let inner = |b: u8| edge(b) || CURRENCY_ID_INNER_SYMBOLS.as_bytes().contains(&b);

    let bytes = s.as_bytes();
    let ok = edge(bytes[0])
        && edge(bytes[len - 1])
        && bytes[1..len - 1].iter().all(|b| inner(*b));
    if !ok {
        return Err(ValidationError::InvalidFormat(format!(
            "currency id {s:?} does not match [A-Z0-9][A-Z0-9{CURRENCY_ID_INNER_SYMBOLS}]*[A-Z0-9]"
        )));
    }
    Ok(())
}

impl FromStr for CurrencyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyId({})", self.0)
    }
}

impl Serialize for CurrencyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CurrencyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CurrencyId::new(s).map_err(serde::de::Error::custom)
    }
}
