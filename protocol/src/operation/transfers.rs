//! Transfers: move amounts from the sender to existing accounts.

use serde::{Deserialize, Serialize};

use super::create_accounts::check_amounts;
use super::envelope::{check_unique, fact_bytes_header, is_valid_fact, Fact, SignedFact};
use crate::config::MAX_TRANSFER_ITEMS;
use crate::crypto::Hash;
use crate::error::{ValidationError, ValidationResult};
use crate::types::{Address, Amount};

pub type Transfers = SignedFact<TransfersFact>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransfersItem {
    receiver: Address,
    amounts: Vec<Amount>,
}

impl TransfersItem {
    pub fn new(receiver: Address, amounts: Vec<Amount>) -> Self {
        Self { receiver, amounts }
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    pub fn is_valid(&self) -> ValidationResult {
        self.receiver.is_valid()?;
        check_amounts(&self.amounts)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.receiver.to_bytes();
        for am in &self.amounts {
            buf.push(0x00);
            buf.extend_from_slice(&am.to_bytes());
        }
        buf
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransfersFact {
    hash: Hash,
    token: Vec<u8>,
    sender: Address,
    items: Vec<TransfersItem>,
}

impl TransfersFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<TransfersItem>) -> Self {
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

    pub fn items(&self) -> &[TransfersItem] {
        &self.items
    }

    pub fn amounts(&self) -> impl Iterator<Item = &Amount> {
        self.items.iter().flat_map(|it| it.amounts.iter())
    }
}

impl Fact for TransfersFact {
    const HINT: &'static str = "nova-currency-transfers-fact";

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
            return Err(ValidationError::invalid("transfers", "empty items"));
        }
        if self.items.len() > MAX_TRANSFER_ITEMS {
            return Err(ValidationError::invalid(
                "transfers",
                format!("items over allowed, {} > {}", self.items.len(), MAX_TRANSFER_ITEMS),
            ));
        }

        for item in &self.items {
            item.is_valid()?;
            if item.receiver == self.sender {
                return Err(ValidationError::invalid(
                    "transfers",
                    format!("receiver is same with sender, {}", self.sender),
                ));
            }
        }
        check_unique("receiver", self.items.iter().map(TransfersItem::receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Big, CurrencyId};

    fn addr(s: &str) -> Address {
        Address::new(format!("{s}mca")).unwrap()
    }

    fn money(v: i64) -> Amount {
        Amount::new(Big::new(v), CurrencyId::new("MONEY").unwrap())
    }

    #[test]
    fn valid_fact() {
        let fact = TransfersFact::new(
            b"t".to_vec(),
            addr("sender"),
            vec![
                TransfersItem::new(addr("a"), vec![money(1)]),
                TransfersItem::new(addr("b"), vec![money(2)]),
            ],
        );
        assert!(fact.is_valid().is_ok());
        assert_eq!(fact.amounts().count(), 2);
    }

    #[test]
    fn sender_as_receiver_rejected() {
        let fact = TransfersFact::new(
            b"t".to_vec(),
            addr("sender"),
            vec![TransfersItem::new(addr("sender"), vec![money(1)])],
        );
        assert!(fact.is_valid().is_err());
    }

    #[test]
    fn duplicate_receivers_rejected() {
        let fact = TransfersFact::new(
            b"t".to_vec(),
            addr("sender"),
            vec![
                TransfersItem::new(addr("a"), vec![money(1)]),
                TransfersItem::new(addr("a"), vec![money(2)]),
            ],
        );
        assert!(matches!(
            fact.is_valid(),
            Err(ValidationError::Duplicate { what: "receiver", .. })
        ));
    }

    #[test]
    fn empty_items_rejected() {
        let fact = TransfersFact::new(b"t".to_vec(), addr("sender"), vec![]);
        assert!(fact.is_valid().is_err());
    }
}
