//! # Operations
//!
//! Every operation the engine understands, as a closed enum. Each kind is a
//! [`SignedFact`] over its own fact type, except the synthetic
//! [`FeeOperation`], which is produced by the engine itself and carries no
//! signatures.
//!
//! | Kind                    | Authorized by                       | Sender  |
//! |-------------------------|-------------------------------------|---------|
//! | `CreateAccounts`        | sender account keys                 | sender  |
//! | `Transfers`             | sender account keys                 | sender  |
//! | `KeyUpdater`            | target account's *current* keys     | target  |
//! | `CurrencyRegister`      | suffrage quorum                     | none    |
//! | `CurrencyPolicyUpdater` | suffrage quorum                     | none    |
//! | `SuffrageInflation`     | suffrage quorum                     | none    |
//! | `GenesisCurrencies`     | genesis node key alone              | none    |
//! | `Fee`                   | nobody (engine generated)           | none    |

pub mod create_accounts;
pub mod currency_policy_updater;
pub mod currency_register;
pub mod envelope;
pub mod fee;
pub mod genesis_currencies;
pub mod key_updater;
pub mod suffrage_inflation;
pub mod transfers;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use create_accounts::{CreateAccounts, CreateAccountsFact, CreateAccountsItem};
pub use currency_policy_updater::{CurrencyPolicyUpdater, CurrencyPolicyUpdaterFact};
pub use currency_register::{CurrencyRegister, CurrencyRegisterFact};
pub use envelope::{is_valid_fact, is_valid_signed_fact, Fact, FactSign, SignedFact};
pub use fee::{FeeFact, FeeOperation};
pub use genesis_currencies::{GenesisCurrencies, GenesisCurrenciesFact};
pub use key_updater::{KeyUpdater, KeyUpdaterFact};
pub use suffrage_inflation::{SuffrageInflation, SuffrageInflationFact, SuffrageInflationItem};
pub use transfers::{Transfers, TransfersFact, TransfersItem};

use crate::crypto::Hash;
use crate::error::ValidationResult;
use crate::types::Address;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateAccounts,
    Transfers,
    KeyUpdater,
    CurrencyRegister,
    CurrencyPolicyUpdater,
    SuffrageInflation,
    GenesisCurrencies,
    Fee,
}

impl OperationKind {
    pub const ALL: [OperationKind; 8] = [
        OperationKind::CreateAccounts,
        OperationKind::Transfers,
        OperationKind::KeyUpdater,
        OperationKind::CurrencyRegister,
        OperationKind::CurrencyPolicyUpdater,
        OperationKind::SuffrageInflation,
        OperationKind::GenesisCurrencies,
        OperationKind::Fee,
    ];

    /// Stable type tag of the operation.
    pub fn hint(&self) -> &'static str {
        match self {
            OperationKind::CreateAccounts => "nova-currency-create-accounts-operation",
            OperationKind::Transfers => "nova-currency-transfers-operation",
            OperationKind::KeyUpdater => "nova-currency-key-updater-operation",
            OperationKind::CurrencyRegister => "nova-currency-currency-register-operation",
            OperationKind::CurrencyPolicyUpdater => {
                "nova-currency-currency-policy-updater-operation"
            }
            OperationKind::SuffrageInflation => "nova-currency-suffrage-inflation-operation",
            OperationKind::GenesisCurrencies => "nova-currency-genesis-currencies-operation",
            OperationKind::Fee => "nova-currency-fee-operation",
        }
    }

    /// Governance kinds are authorized by a quorum, not by an account.
    pub fn is_governance(&self) -> bool {
        matches!(
            self,
            OperationKind::CurrencyRegister
                | OperationKind::CurrencyPolicyUpdater
                | OperationKind::SuffrageInflation
                | OperationKind::GenesisCurrencies
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::CreateAccounts => "create-accounts",
            OperationKind::Transfers => "transfers",
            OperationKind::KeyUpdater => "key-updater",
            OperationKind::CurrencyRegister => "currency-register",
            OperationKind::CurrencyPolicyUpdater => "currency-policy-updater",
            OperationKind::SuffrageInflation => "suffrage-inflation",
            OperationKind::GenesisCurrencies => "genesis-currencies",
            OperationKind::Fee => "fee",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "operation", rename_all = "snake_case")]
pub enum Operation {
    CreateAccounts(CreateAccounts),
    Transfers(Transfers),
    KeyUpdater(KeyUpdater),
    CurrencyRegister(CurrencyRegister),
    CurrencyPolicyUpdater(CurrencyPolicyUpdater),
    SuffrageInflation(SuffrageInflation),
    GenesisCurrencies(GenesisCurrencies),
    Fee(FeeOperation),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateAccounts(_) => OperationKind::CreateAccounts,
            Operation::Transfers(_) => OperationKind::Transfers,
            Operation::KeyUpdater(_) => OperationKind::KeyUpdater,
            Operation::CurrencyRegister(_) => OperationKind::CurrencyRegister,
            Operation::CurrencyPolicyUpdater(_) => OperationKind::CurrencyPolicyUpdater,
            Operation::SuffrageInflation(_) => OperationKind::SuffrageInflation,
            Operation::GenesisCurrencies(_) => OperationKind::GenesisCurrencies,
            Operation::Fee(_) => OperationKind::Fee,
        }
    }

    /// Operation hash.
    pub fn hash(&self) -> Hash {
        match self {
            Operation::CreateAccounts(op) => op.hash(),
            Operation::Transfers(op) => op.hash(),
            Operation::KeyUpdater(op) => op.hash(),
            Operation::CurrencyRegister(op) => op.hash(),
            Operation::CurrencyPolicyUpdater(op) => op.hash(),
            Operation::SuffrageInflation(op) => op.hash(),
            Operation::GenesisCurrencies(op) => op.hash(),
            Operation::Fee(op) => op.hash(),
        }
    }

    pub fn fact_hash(&self) -> Hash {
        match self {
            Operation::CreateAccounts(op) => op.fact().hash(),
            Operation::Transfers(op) => op.fact().hash(),
            Operation::KeyUpdater(op) => op.fact().hash(),
            Operation::CurrencyRegister(op) => op.fact().hash(),
            Operation::CurrencyPolicyUpdater(op) => op.fact().hash(),
            Operation::SuffrageInflation(op) => op.fact().hash(),
            Operation::GenesisCurrencies(op) => op.fact().hash(),
            Operation::Fee(op) => op.fact().hash(),
        }
    }

    /// The account whose balance backs this operation, if any.
    pub fn sender(&self) -> Option<&Address> {
        match self {
            Operation::CreateAccounts(op) => Some(op.fact().sender()),
            Operation::Transfers(op) => Some(op.fact().sender()),
            Operation::KeyUpdater(op) => Some(op.fact().target()),
            _ => None,
        }
    }

    pub fn signs(&self) -> &[FactSign] {
        match self {
            Operation::CreateAccounts(op) => op.signs(),
            Operation::Transfers(op) => op.signs(),
            Operation::KeyUpdater(op) => op.signs(),
            Operation::CurrencyRegister(op) => op.signs(),
            Operation::CurrencyPolicyUpdater(op) => op.signs(),
            Operation::SuffrageInflation(op) => op.signs(),
            Operation::GenesisCurrencies(op) => op.signs(),
            Operation::Fee(_) => &[],
        }
    }

    /// Admission-time validation.
    pub fn is_valid(&self, network_id: &[u8]) -> ValidationResult {
        match self {
            Operation::CreateAccounts(op) => op.is_valid(network_id),
            Operation::Transfers(op) => op.is_valid(network_id),
            Operation::KeyUpdater(op) => op.is_valid(network_id),
            Operation::CurrencyRegister(op) => op.is_valid(network_id),
            Operation::CurrencyPolicyUpdater(op) => op.is_valid(network_id),
            Operation::SuffrageInflation(op) => op.is_valid(network_id),
            Operation::GenesisCurrencies(op) => op.is_valid(network_id),
            Operation::Fee(op) => op.is_valid(),
        }
    }
}

impl From<CreateAccounts> for Operation {
    fn from(op: CreateAccounts) -> Self {
        Operation::CreateAccounts(op)
    }
}

impl From<Transfers> for Operation {
    fn from(op: Transfers) -> Self {
        Operation::Transfers(op)
    }
}

impl From<KeyUpdater> for Operation {
    fn from(op: KeyUpdater) -> Self {
        Operation::KeyUpdater(op)
    }
}

impl From<CurrencyRegister> for Operation {
    fn from(op: CurrencyRegister) -> Self {
        Operation::CurrencyRegister(op)
    }
}

impl From<CurrencyPolicyUpdater> for Operation {
    fn from(op: CurrencyPolicyUpdater) -> Self {
        Operation::CurrencyPolicyUpdater(op)
    }
}

impl From<SuffrageInflation> for Operation {
    fn from(op: SuffrageInflation) -> Self {
        Operation::SuffrageInflation(op)
    }
}

impl From<GenesisCurrencies> for Operation {
    fn from(op: GenesisCurrencies) -> Self {
        Operation::GenesisCurrencies(op)
    }
}

impl From<FeeOperation> for Operation {
    fn from(op: FeeOperation) -> Self {
        Operation::Fee(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::NovaKeypair;
    use crate::types::{Amount, Big, CurrencyId};

    #[test]
    fn kind_hints_are_distinct() {
        let mut hints: Vec<_> = OperationKind::ALL.iter().map(|k| k.hint()).collect();
        hints.sort();
        hints.dedup();
        assert_eq!(hints.len(), OperationKind::ALL.len());
    }

    #[test]
    fn transfer_operation_accessors() {
        let kp = NovaKeypair::from_seed(&[1u8; 32]);
        let sender = Address::new("sendermca").unwrap();
        let fact = TransfersFact::new(
            b"t".to_vec(),
            sender.clone(),
            vec![TransfersItem::new(
                Address::new("receivermca").unwrap(),
                vec![Amount::new(Big::new(1), CurrencyId::new("MONEY").unwrap())],
            )],
        );
        let op: Operation = SignedFact::sign(fact.clone(), &[&kp], b"net").into();

        assert_eq!(op.kind(), OperationKind::Transfers);
        assert_eq!(op.kind().to_string(), "transfers");
        assert_eq!(op.sender(), Some(&sender));
        assert_eq!(op.fact_hash(), fact.hash());
        assert_eq!(op.signs().len(), 1);
        assert!(op.is_valid(b"net").is_ok());
        assert!(!op.kind().is_governance());
    }

    #[test]
    fn fee_operation_has_no_sender_or_signs() {
        let op: Operation = FeeOperation::for_height(3, vec![]).into();
        assert_eq!(op.kind(), OperationKind::Fee);
        assert!(op.sender().is_none());
        assert!(op.signs().is_empty());
        assert!(op.is_valid(b"net").is_ok());
    }
}
