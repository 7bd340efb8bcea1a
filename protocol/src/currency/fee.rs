//! Fee aggregation across the items of a multi-item operation.

use std::collections::BTreeMap;

use super::pool::CurrencyPool;
use super::CurrencyError;
use crate::types::{Amount, Big, CurrencyId};

/// What a sender must hold in one currency to pay for an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredAmount {
    /// Amount moved plus fees.
    pub total: Big,
    /// Fees alone.
    pub fee: Big,
}

impl Default for RequiredAmount {
    fn default() -> Self {
        Self {
            total: Big::zero(),
            fee: Big::zero(),
        }
    }
}

/// Sum, per currency, the amount moved plus the fee charged on each
/// amount.
///
/// Without a pool every fee is zero and `total` is the raw sum. With a
/// pool, an amount in an unregistered currency is an error.
pub fn calculate_items_fee<'a, I>(
    pool: Option<&CurrencyPool>,
    amounts: I,
) -> Result<BTreeMap<CurrencyId, RequiredAmount>, CurrencyError>
where
    I: IntoIterator<Item = &'a Amount>,
{
    let mut required: BTreeMap<CurrencyId, RequiredAmount> = BTreeMap::new();

    for am in amounts {
        let fee = match pool {
            None => Big::zero(),
            Some(pool) => pool
                .feeer(am.currency())
                .ok_or_else(|| CurrencyError::UnknownCurrency(am.currency().clone()))?
                .fee(am.big()),
        };

        let entry = required.entry(am.currency().clone()).or_default();
        entry.total = entry.total.add(am.big()).add(&fee);
        entry.fee = entry.fee.add(&fee);
    }

    Ok(required)
}
