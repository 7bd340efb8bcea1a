//! Accounts: an address bound to the keys that control it.

use serde::{Deserialize, Serialize};

use super::account_keys::AccountKeys;
use super::address::Address;
use super::currency_id::CurrencyId;
use crate::crypto::Hash;
use crate::error::ValidationError;

/// The value stored under `<address>-account`.
///
/// `keys` is `None` only for per-currency zero accounts, which nobody can
/// sign for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: Address,
    keys: Option<AccountKeys>,
    hash: Hash,
}

impl Account {
    /// A new account whose address is derived from `keys`.
    pub fn from_keys(keys: AccountKeys) -> Self {
        let address = Address::from_keys(&keys);
        Self::build(address, Some(keys))
    }

    /// The keyless zero account of `currency`.
    pub fn zero(currency: &CurrencyId) -> Self {
        Self::build(Address::zero(currency), None)
    }

    fn build(address: Address, keys: Option<AccountKeys>) -> Self {
        let hash = Hash::blake3(&account_bytes(&address, keys.as_ref()));
        Self {
            address,
            keys,
            hash,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn keys(&self) -> Option<&AccountKeys> {
        self.keys.as_ref()
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Same account, new keys. The address does not change when keys
    /// rotate.
    pub fn with_keys(&self, keys: AccountKeys) -> Self {
        Self::build(self.address.clone(), Some(keys))
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.address.is_valid()?;
        if let Some(keys) = &self.keys {
            keys.is_valid()?;
        }
        let generated = Hash::blake3(&account_bytes(&self.address, self.keys.as_ref()));
        if generated != self.hash {
            return Err(ValidationError::HashMismatch {
                what: "account",
                stored: self.hash.to_hex(),
                generated: generated.to_hex(),
            });
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        account_bytes(&self.address, self.keys.as_ref())
    }
}

fn account_bytes(address: &Address, keys: Option<&AccountKeys>) -> Vec<u8> {
    let mut buf = address.to_bytes();
    buf.push(0x00);
    if let Some(keys) = keys {
        buf.extend_from_slice(&keys.to_bytes());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::NovaKeypair;
    use crate::types::account_keys::AccountKey;

    fn single(seed: u8) -> AccountKeys {
        let pk = NovaKeypair::from_seed(&[seed; 32]).public_key();
        AccountKeys::new(vec![AccountKey::new(pk, 100).unwrap()], 100).unwrap()
    }

    #[test]
    fn address_derived_from_keys() {
        let keys = single(1);
        let account = Account::from_keys(keys.clone());
        assert_eq!(account.address(), &Address::from_keys(&keys));
        assert!(account.is_valid().is_ok());
    }

    #[test]
    fn key_rotation_keeps_address() {
        let account = Account::from_keys(single(1));
        let rotated = account.with_keys(single(2));
        assert_eq!(rotated.address(), account.address());
        assert_ne!(rotated.hash(), account.hash());
        assert_eq!(rotated.keys(), Some(&single(2)));
    }

    #[test]
    fn zero_account_has_no_keys() {
        let cid = CurrencyId::new("MONEY").unwrap();
        let zero = Account::zero(&cid);
        assert!(zero.keys().is_none());
        assert_eq!(zero.address(), &Address::zero(&cid));
        assert!(zero.is_valid().is_ok());
    }
}
