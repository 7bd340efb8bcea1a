//! State-key naming.
//!
//! Keys are opaque to the store but every component must build them the
//! same way:
//!
//! ```text
//! <address>-account
//! <address>-balance-<currency id>
//! <currency id>-currencydesign
//! ```

use crate::config::{
    STATE_KEY_ACCOUNT_SUFFIX, STATE_KEY_BALANCE_INFIX, STATE_KEY_CURRENCY_DESIGN_SUFFIX,
};
use crate::types::{Address, CurrencyId};

pub fn account(address: &Address) -> String {
    format!("{}{}", address, STATE_KEY_ACCOUNT_SUFFIX)
}

pub fn balance(address: &Address, currency: &CurrencyId) -> String {
    format!("{}{}{}", address, STATE_KEY_BALANCE_INFIX, currency)
}

pub fn currency_design(currency: &CurrencyId) -> String {
    format!("{}{}", currency, STATE_KEY_CURRENCY_DESIGN_SUFFIX)
}

pub fn is_account(key: &str) -> bool {
    key.ends_with(STATE_KEY_ACCOUNT_SUFFIX)
}

pub fn is_balance(key: &str) -> bool {
    key.contains(STATE_KEY_BALANCE_INFIX)
}

pub fn is_currency_design(key: &str) -> bool {
    key.ends_with(STATE_KEY_CURRENCY_DESIGN_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        let a = Address::new("abcmca").unwrap();
        let cid = CurrencyId::new("MONEY").unwrap();

        assert_eq!(account(&a), "abcmca-account");
        assert_eq!(balance(&a, &cid), "abcmca-balance-MONEY");
        assert_eq!(currency_design(&cid), "MONEY-currencydesign");

        assert!(is_account(&account(&a)));
        assert!(is_balance(&balance(&a, &cid)));
        assert!(is_currency_design(&currency_design(&cid)));
        assert!(!is_balance(&account(&a)));
    }
}
