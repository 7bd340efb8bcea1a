//! State checks shared by the per-kind processors.

use std::collections::BTreeMap;

use super::error::{ProcessError, RejectReason};
use crate::crypto::NovaPublicKey;
use crate::currency::{CurrencyPool, RequiredAmount};
use crate::operation::{Operation, OperationKind};
use crate::state::{get_or_blank, keys, AmountState, State, StateReader};
use crate::types::{check_threshold, Account, Address, CurrencyId, Suffrage};

/// The state under `key`, which must exist.
pub fn exists_state(
    kind: OperationKind,
    reader: &dyn StateReader,
    key: &str,
    what: &str,
) -> Result<State, ProcessError> {
    match reader.get_state(key)? {
        Some(st) if !st.is_blank() => Ok(st),
        _ => Err(ProcessError::rejected(
            kind,
            RejectReason::NotFound(format!("{what}, {key}")),
        )),
    }
}

/// A blank state for `key`, which must not exist yet.
pub fn not_exists_state(
    kind: OperationKind,
    reader: &dyn StateReader,
    key: &str,
    what: &str,
) -> Result<State, ProcessError> {
    match reader.get_state(key)? {
        Some(st) if !st.is_blank() => Err(ProcessError::rejected(
            kind,
            RejectReason::AlreadyExists(format!("{what}, {key}")),
        )),
        _ => Ok(State::blank(key.to_string())),
    }
}

/// Load `address`'s account and check that `signers` meet its threshold.
pub fn check_account_signs<'a, I>(
    kind: OperationKind,
    reader: &dyn StateReader,
    address: &Address,
    signers: I,
) -> Result<(State, Account), ProcessError>
where
    I: IntoIterator<Item = &'a NovaPublicKey>,
{
    let st = exists_state(kind, reader, &keys::account(address), "account")?;
    let account = st.account_value()?.clone();
    let account_keys = account.keys().ok_or_else(|| {
        ProcessError::rejected(
            kind,
            RejectReason::Unauthorized(format!("account {address} has no keys")),
        )
    })?;
    check_threshold(signers, account_keys).map_err(|e| ProcessError::rejected(kind, e))?;
    Ok((st, account))
}

/// Governance operations need a quorum of the suffrage.
pub fn check_suffrage_signs<'a, I>(
    kind: OperationKind,
    suffrage: &Suffrage,
    signers: I,
) -> Result<(), ProcessError>
where
    I: IntoIterator<Item = &'a NovaPublicKey>,
{
    suffrage
        .check_signs(signers)
        .map_err(|e| ProcessError::rejected(kind, e))
}

/// Check that `holder` can pay every required amount. Returns the staged
/// balance of each currency, untouched.
pub fn check_enough_balance(
    kind: OperationKind,
    reader: &dyn StateReader,
    holder: &Address,
    required: &BTreeMap<CurrencyId, RequiredAmount>,
) -> Result<BTreeMap<CurrencyId, AmountState>, ProcessError> {
    let mut staged = BTreeMap::new();
    for (cid, rq) in required {
        let st = exists_state(kind, reader, &keys::balance(holder, cid), "balance of account")?;
        let am = AmountState::new(st, cid.clone());
        let balance = am.balance()?;
        if balance.compare(&rq.total).is_lt() {
            return Err(ProcessError::rejected(
                kind,
                RejectReason::InsufficientBalance {
                    holder: holder.clone(),
                    balance,
                    required: rq.total.clone(),
                },
            ));
        }
        staged.insert(cid.clone(), am);
    }
    Ok(staged)
}

/// Reject crediting the zero account of `cid`, whose balance stays zero.
pub fn check_not_zero_account(
    kind: OperationKind,
    receiver: &Address,
    cid: &CurrencyId,
) -> Result<(), ProcessError> {
    if *receiver == Address::zero(cid) {
        return Err(ProcessError::rejected(
            kind,
            RejectReason::ZeroAccountReceiver(receiver.clone()),
        ));
    }
    Ok(())
}

/// A balance to credit; the key may be blank.
pub fn receiver_balance(
    reader: &dyn StateReader,
    receiver: &Address,
    cid: &CurrencyId,
) -> Result<AmountState, ProcessError> {
    let st = get_or_blank(reader, &keys::balance(receiver, cid))?;
    Ok(AmountState::new(st, cid.clone()))
}

pub fn ensure_currency(
    kind: OperationKind,
    pool: &CurrencyPool,
    cid: &CurrencyId,
) -> Result<(), ProcessError> {
    if !pool.exists(cid) {
        return Err(ProcessError::rejected(
            kind,
            RejectReason::UnknownCurrency(cid.clone()),
        ));
    }
    Ok(())
}

/// Debit each staged sender balance by its required total, recording the
/// fee part.
pub fn debit_sender(
    staged: &BTreeMap<CurrencyId, AmountState>,
    required: &BTreeMap<CurrencyId, RequiredAmount>,
) -> Result<Vec<AmountState>, ProcessError> {
    required
        .iter()
        .map(|(cid, rq)| {
            let am = staged.get(cid).ok_or_else(|| {
                ProcessError::Fatal(format!("sender balance of {cid} not staged"))
            })?;
            Ok(am.sub(&rq.total).add_fee(&rq.fee))
        })
        .collect()
}

/// A processor was handed an operation of another kind.
pub fn wrong_operation(expected: OperationKind, op: &Operation) -> ProcessError {
    ProcessError::Fatal(format!(
        "{expected} processor handed a {} operation",
        op.kind()
    ))
}
