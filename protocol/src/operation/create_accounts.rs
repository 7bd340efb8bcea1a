//! Create accounts: a funded sender opens new accounts, each with its key
//! set and initial balances.

use serde::{Deserialize, Serialize};

use super::envelope::{check_unique, fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::config::{MAX_AMOUNTS_PER_ITEM, MAX_CREATE_ACCOUNTS_ITEMS};
use crate::crypto::Hash;
use crate::error::{ValidationError, ValidationResult};
use crate::types::{AccountKeys, Address, Amount};

pub type CreateAccounts = SignedFact<CreateAccountsFact>;

// ---------------------------------------------------------------------------
// CreateAccountsItem
// ---------------------------------------------------------------------------

/// One account to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountsItem {
    keys: AccountKeys,
    amounts: Vec<Amount>,
}

impl CreateAccountsItem {
    pub fn new(keys: AccountKeys, amounts: Vec<Amount>) -> Self {
        Self { keys, amounts }
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    /// Address the new account will live at.
    pub fn address(&self) -> Address {
        Address::from_keys(&self.keys)
    }

    pub fn is_valid(&self) -> ValidationResult {
        self.keys.is_valid()?;
        check_amounts(&self.amounts)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.keys.to_bytes();
        for am in &self.amounts {
            buf.push(0x00);
            buf.extend_from_slice(&am.to_bytes());
        }
        buf
    }
}

/// Amounts carried by one item: 1..=MAX_AMOUNTS_PER_ITEM, each over zero,
/// at most one per currency.
pub(crate) fn check_amounts(amounts: &[Amount]) -> ValidationResult {
    if amounts.is_empty() {
        return Err(ValidationError::invalid("item", "empty amounts"));
    }
    if amounts.len() > MAX_AMOUNTS_PER_ITEM {
        return Err(ValidationError::invalid(
            "item",
            format!("amounts over allowed, {} > {}", amounts.len(), MAX_AMOUNTS_PER_ITEM),
        ));
    }
    for am in amounts {
        am.is_valid()?;
        if !am.big().over_zero() {
            return Err(ValidationError::invalid(
                "item",
                format!("amount should be over zero, {}", am),
            ));
        }
    }
    check_unique("currency", amounts.iter().map(Amount::currency))
}

// ---------------------------------------------------------------------------
// CreateAccountsFact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountsFact {
    hash: Hash,
    token: Vec<u8>,
    sender: Address,
    items: Vec<CreateAccountsItem>,
}

impl CreateAccountsFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<CreateAccountsItem>) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            sender,
            items,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn items(&self) -> &[CreateAccountsItem] {
        &self.items
    }

    /// Every amount across all items.
    pub fn amounts(&self) -> impl Iterator<Item = &Amount> {
        self.items.iter().flat_map(|it| it.amounts.iter())
    }

    /// Addresses of the accounts to create, in item order.
    pub fn targets(&self) -> Vec<Address> {
        self.items.iter().map(CreateAccountsItem::address).collect()
    }
}

impl Fact for CreateAccountsFact {
    const HINT: &'static str = "nova-currency-create-accounts-fact";

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> Hash {
        self.hash
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = fact_bytes_header(Self::HINT, &self.token);
        buf.extend_from_slice(&self.sender.to_bytes());
        for item in &self.items {
            buf.push(0x00);
            buf.extend_from_slice(&item.to_bytes());
        }
        buf
    }

    fn is_valid(&self) -> ValidationResult {
        is_valid_fact(self)?;
        self.sender.is_valid()?;

        if self.items.is_empty() {
            return Err(ValidationError::invalid("create accounts", "empty items"));
        }
        if self.items.len() > MAX_CREATE_ACCOUNTS_ITEMS {
            return Err(ValidationError::invalid(
                "create accounts",
                format!(
                    "items over allowed, {} > {}",
                    self.items.len(),
                    MAX_CREATE_ACCOUNTS_ITEMS
                ),
            ));
        }

        for item in &self.items {
            item.is_valid()?;
        }

        let targets = self.targets();
        if targets.contains(&self.sender) {
            return Err(ValidationError::invalid(
                "create accounts",
                format!("target address is same with sender, {}", self.sender),
            ));
        }
        check_unique("target address", targets.iter())
    }
}
