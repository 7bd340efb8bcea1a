//! Key updater processor.
//!
//! Signatures are checked against the account's *current* keys. The fee is
//! what the currency's policy charges for moving zero, so a fixed fee
//! applies and a ratio fee falls to its minimum.

use std::sync::Arc;

use tracing::debug;

use super::error::{ProcessError, RejectReason};
use super::helpers::{check_account_signs, exists_state, wrong_operation};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, AmountState, State, StateReader, StateUpdate, StateWriter};
use crate::types::Big;

const KIND: OperationKind = OperationKind::KeyUpdater;

struct Staged {
    op_hash: Hash,
    account: State,
    balance: AmountState,
    fee: Big,
}

pub struct KeyUpdaterProcessor {
    currency_pool: Arc<CurrencyPool>,
    staged: Option<Staged>,
}

impl KeyUpdaterProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self {
            currency_pool,
            staged: None,
        }
    }
}

impl Processor for KeyUpdaterProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::KeyUpdater(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        let (account_state, account) = check_account_signs(KIND, reader, fact.target(), op.signers())?;
        if account.keys().is_some_and(|ks| ks.equal(fact.keys())) {
            return Err(ProcessError::rejected(
                KIND,
                RejectReason::NoOp("same Keys with the existing".into()),
            ));
        }

        let feeer = self.currency_pool.feeer(fact.currency()).ok_or_else(|| {
            ProcessError::rejected(KIND, RejectReason::UnknownCurrency(fact.currency().clone()))
        })?;
        let fee = feeer.fee(&Big::zero());

        let st = exists_state(
            KIND,
            reader,
            &keys::balance(fact.target(), fact.currency()),
            "balance of target",
        )?;
        let balance = AmountState::new(st, fact.currency().clone());
        let held = balance.balance()?;
        if held.compare(&fee).is_lt() {
            return Err(ProcessError::rejected(
                KIND,
                RejectReason::InsufficientBalance {
                    holder: fact.target().clone(),
                    balance: held,
                    required: fee,
                },
            ));
        }

        debug!(op_hash = %op.hash(), target = %fact.target(), fee = %fee, "key updater pre-processed");

        self.staged = Some(Staged {
            op_hash: op.hash(),
            account: account_state.with_value(account.with_keys(fact.keys().clone())),
            balance,
            fee,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;
        let debit = staged.balance.sub(&staged.fee).add_fee(&staged.fee);
        writer.set_state(
            &staged.op_hash,
            vec![StateUpdate::from(staged.account), StateUpdate::from(debit)],
        )?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::testing::{single_keys, Fixture};

    #[test]
    fn rotates_keys_and_charges_fee() {
        let fx = Fixture::new(10, 3);
        let op = fx.update_keys(single_keys(77));

        let mut p = KeyUpdaterProcessor::new(fx.currency_pool.clone());
        p.pre_process(&op, &fx.pool).unwrap();
        p.process(&fx.pool).unwrap();

        let account = fx.account(&fx.sender_address).unwrap();
        assert_eq!(account.keys(), Some(&single_keys(77)));
        assert_eq!(account.address(), &fx.sender_address);
        assert_eq!(fx.balance(&fx.sender_address), Big::new(7));
    }

    #[test]
    fn same_keys_is_no_op() {
        let fx = Fixture::new(10, 0);
        let op = fx.update_keys(fx.sender_keys());

        let mut p = KeyUpdaterProcessor::new(fx.currency_pool.clone());
        let err = p.pre_process(&op, &fx.pool).unwrap_err();
        assert_eq!(
            err.reason(),
            Some(&RejectReason::NoOp("same Keys with the existing".into()))
        );
    }

    #[test]
    fn fee_must_be_covered() {
        let fx = Fixture::new(2, 3);
        let op = fx.update_keys(single_keys(77));
        let mut p = KeyUpdaterProcessor::new(fx.currency_pool.clone());
        let err = p.pre_process(&op, &fx.pool).unwrap_err();
        assert!(matches!(err.reason(), Some(RejectReason::InsufficientBalance { .. })));
    }
}
