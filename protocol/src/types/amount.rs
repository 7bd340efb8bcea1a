//! Currency-tagged amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::big::Big;
use super::currency_id::CurrencyId;
use crate::error::ValidationError;

/// A [`Big`] value denominated in one currency.
///
/// Valid iff the value is `>= 0`. Operations that move funds additionally
/// require `> 0`; that check lives with the item that carries the amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    big: Big,
    currency: CurrencyId,
}

impl Amount {
    pub fn new(big: Big, currency: CurrencyId) -> Self {
        Self { big, currency }
    }

    /// A zero amount of `currency`.
    pub fn zero(currency: CurrencyId) -> Self {
        Self::new(Big::zero(), currency)
    }

    pub fn big(&self) -> &Big {
        &self.big
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    /// Same currency, different value.
    pub fn with_big(&self, big: Big) -> Self {
        Self::new(big, self.currency.clone())
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !self.big.over_nil() {
            return Err(ValidationError::invalid(
                "amount",
                format!("under zero, {}", self),
            ));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.big.to_bytes();
        buf.push(0x00);
        buf.extend_from_slice(&self.currency.to_bytes());
        buf
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.big, self.currency)
    }
}
