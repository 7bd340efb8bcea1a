//! Create accounts processor.
//!
//! Pre-process:
//! 1. sender account exists and the signers meet its threshold
//! 2. each target account and each target balance does not exist yet
//! 3. each amount meets its currency's new-account minimum balance
//! 4. the sender holds amount + fee in every currency
//!
//! Process writes the new accounts, their initial balances and the sender
//! debit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::error::{ProcessError, RejectReason};
use super::helpers::{
    check_account_signs, check_enough_balance, debit_sender, not_exists_state, wrong_operation,
};
use super::{not_prepared, Processor};
use crate::crypto::Hash;
use crate::currency::{calculate_items_fee, CurrencyPool, RequiredAmount};
use crate::operation::{Operation, OperationKind};
use crate::state::{keys, AmountState, State, StateReader, StateUpdate, StateWriter};
use crate::types::{Account, CurrencyId};

const KIND: OperationKind = OperationKind::CreateAccounts;

struct Staged {
    op_hash: Hash,
    /// New account state per item.
    accounts: Vec<State>,
    /// Initial balance credits per item.
    balances: Vec<AmountState>,
    sender_balances: BTreeMap<CurrencyId, AmountState>,
    required: BTreeMap<CurrencyId, RequiredAmount>,
}

pub struct CreateAccountsProcessor {
    currency_pool: Arc<CurrencyPool>,
    staged: Option<Staged>,
}

impl CreateAccountsProcessor {
    pub fn new(currency_pool: Arc<CurrencyPool>) -> Self {
        Self {
            currency_pool,
            staged: None,
        }
    }
}

impl Processor for CreateAccountsProcessor {
    fn kind(&self) -> OperationKind {
        KIND
    }

    fn pre_process(&mut self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let Operation::CreateAccounts(op) = op else {
            return Err(wrong_operation(KIND, op));
        };
        let fact = op.fact();

        check_account_signs(KIND, reader, fact.sender(), op.signers())?;

        let mut accounts = Vec::with_capacity(fact.items().len());
        let mut balances = Vec::new();
        for item in fact.items() {
            let target = item.address();
            let st = not_exists_state(KIND, reader, &keys::account(&target), "keys of account")?;
            accounts.push(st.with_value(Account::from_keys(item.keys().clone())));

            for am in item.amounts() {
                let policy = self.currency_pool.policy(am.currency()).ok_or_else(|| {
                    ProcessError::rejected(KIND, RejectReason::UnknownCurrency(am.currency().clone()))
                })?;
                let min = policy.new_account_min_balance();
                if am.big().compare(min).is_lt() {
                    return Err(ProcessError::rejected(
                        KIND,
                        RejectReason::BelowMinimumBalance {
                            amount: am.big().clone(),
                            min: min.clone(),
                            currency: am.currency().clone(),
                        },
                    ));
                }

                let st = not_exists_state(
                    KIND,
                    reader,
                    &keys::balance(&target, am.currency()),
                    "balance of account",
                )?;
                balances.push(AmountState::new(st, am.currency().clone()).add(am.big()));
            }
        }

        let required = calculate_items_fee(Some(self.currency_pool.as_ref()), fact.amounts())
            .map_err(|e| ProcessError::rejected(KIND, e))?;
        let sender_balances = check_enough_balance(KIND, reader, fact.sender(), &required)?;

        debug!(
            op_hash = %op.hash(),
            sender = %fact.sender(),
            items = fact.items().len(),
            "create accounts pre-processed"
        );

        self.staged = Some(Staged {
            op_hash: op.hash(),
            accounts,
            balances,
            sender_balances,
            required,
        });
        Ok(())
    }

    fn process(&mut self, writer: &dyn StateWriter) -> Result<(), ProcessError> {
        let staged = self.staged.take().ok_or_else(|| not_prepared(KIND))?;

        let mut updates: Vec<StateUpdate> = Vec::new();
        let debits = debit_sender(&staged.sender_balances, &staged.required)?;
        updates.extend(debits.into_iter().map(StateUpdate::from));
        updates.extend(staged.accounts.into_iter().map(StateUpdate::from));
        updates.extend(staged.balances.into_iter().map(StateUpdate::from));

        writer.set_state(&staged.op_hash, updates)?;
        Ok(())
    }

    fn close(&mut self) {
        self.staged = None;
    }
}
