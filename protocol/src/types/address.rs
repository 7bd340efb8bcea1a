//! Account addresses.
//!
//! An address is an opaque string ending in `mca`. Addresses of ordinary
//! accounts are derived from their key set, which ties an account's
//! identity to the authorization policy it was created with:
//!
//! ```text
//! single key  -> base58(public_key) + "mca"
//! multi key   -> base58(keys.hash)  + "mca"
//! ```
//!
//! Each currency also has a well-known zero account, `<currency>-Xmca`,
//! whose balance stays zero and whose existence marks the currency as
//! registered.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::account_keys::AccountKeys;
use super::currency_id::CurrencyId;
use crate::config::{ADDRESS_SUFFIX, MAX_ADDRESS_LENGTH, ZERO_ADDRESS_INFIX};
use crate::error::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let address = Self(s.into());
        address.is_valid()?;
        Ok(address)
    }

    /// Derive the address of an account from its keys.
    pub fn from_keys(keys: &AccountKeys) -> Self {
        let body = match keys.keys() {
            [only] => only.key().to_base58(),
            _ => bs58::encode(keys.hash().as_bytes()).into_string(),
        };
        Self(format!("{body}{ADDRESS_SUFFIX}"))
    }

    /// The zero account of `currency`.
    pub fn zero(currency: &CurrencyId) -> Self {
        Self(format!("{currency}{ZERO_ADDRESS_INFIX}{ADDRESS_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let Some(body) = self.0.strip_suffix(ADDRESS_SUFFIX) else {
            return Err(ValidationError::invalid(
                "address",
                format!("{:?} lacks the {ADDRESS_SUFFIX:?} suffix", self.0),
            ));
        };
        if body.is_empty() {
            return Err(ValidationError::invalid("address", "empty body"));
        }
        if self.0.len() > MAX_ADDRESS_LENGTH {
            return Err(ValidationError::invalid(
                "address",
                format!("longer than {MAX_ADDRESS_LENGTH}"),
            ));
        }
        if !body
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':' && b != b'/')
        {
            return Err(ValidationError::invalid(
                "address",
                format!("{:?} has forbidden characters", self.0),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::new(s).map_err(serde::de::Error::custom)
    }
}
