//! # Block Orchestrator
//!
//! One [`OperationProcessor`] is bound to one block's [`StatePool`]. It
//! dispatches each operation to the processor registered for its kind,
//! keeps the per-block duplication gates, collects fees and, when the block
//! is finished, emits the synthetic fee operation.
//!
//! ## Duplication gates
//!
//! | Operation kind                          | Gate keys                         |
//! |-----------------------------------------|-----------------------------------|
//! | `CreateAccounts`                        | sender, every new target address  |
//! | `Transfers`                             | sender                            |
//! | `KeyUpdater`                            | target (as sender)                |
//! | `CurrencyRegister`, `PolicyUpdater`     | the currency                      |
//! | `SuffrageInflation`                     | every inflated currency           |
//! | `GenesisCurrencies`                     | every currency, genesis address   |
//!
//! An operation claiming a key already claimed in this block is rejected;
//! a claimed new address was created in this block and reads as already
//! existing. Keys are claimed only once pre-processing succeeds, so a rejected
//! operation never blocks a later one.
//!
//! ## Batches
//!
//! ```text
//! phase 1 (rayon):   pre_process every op against the pre-batch state
//! phase 2 (ordered): gate check -> re-run pre_process if phase 1 failed
//!                    -> claim gates -> process
//! ```
//!
//! Only operations holding a gate key can lower a balance or replace an
//! account or design, so a phase 1 success stays valid once the gates
//! pass. A phase 1 failure may have been caused by state written earlier
//! in the batch and is retried in order. The result equals processing the
//! batch one operation at a time.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::error::{ProcessError, RejectReason};
use super::registry::ProcessorRegistry;
use super::{Processor, ProcessorContext};
use crate::config::ProcessorConfig;
use crate::crypto::Hash;
use crate::currency::CurrencyPool;
use crate::operation::{FeeOperation, Operation, OperationKind};
use crate::state::{keys, StateError, StatePool, StateUpdate, StateWriter};
use crate::types::{Address, Amount, Big, CurrencyId};

// ---------------------------------------------------------------------------
// Duplication gates
// ---------------------------------------------------------------------------

/// A resource at most one operation per block may claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DuplicationKey {
    Sender(Address),
    Currency(CurrencyId),
    NewAddress(Address),
}

impl DuplicationKey {
    fn reject_reason(&self) -> RejectReason {
        match self {
            DuplicationKey::Sender(a) => RejectReason::DuplicateSender(a.clone()),
            DuplicationKey::Currency(c) => RejectReason::DuplicateCurrency(c.clone()),
            // Held only once the address was created earlier in the block.
            DuplicationKey::NewAddress(a) => {
                RejectReason::AlreadyExists(format!("keys of account, {}", keys::account(a)))
            }
        }
    }

    /// Every key `op` must claim.
    pub fn of(op: &Operation) -> Vec<DuplicationKey> {
        let mut keys = Vec::new();
        if let Some(sender) = op.sender() {
            keys.push(DuplicationKey::Sender(sender.clone()));
        }
        match op {
            Operation::CreateAccounts(op) => {
                keys.extend(op.fact().targets().into_iter().map(DuplicationKey::NewAddress));
            }
            Operation::CurrencyRegister(op) => {
                keys.push(DuplicationKey::Currency(op.fact().currency().currency().clone()));
            }
            Operation::CurrencyPolicyUpdater(op) => {
                keys.push(DuplicationKey::Currency(op.fact().currency().clone()));
            }
            Operation::SuffrageInflation(op) => {
                for item in op.fact().items() {
                    let key = DuplicationKey::Currency(item.amount().currency().clone());
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            Operation::GenesisCurrencies(op) => {
                keys.push(DuplicationKey::NewAddress(op.fact().genesis_address()));
                keys.extend(
                    op.fact()
                        .currencies()
                        .iter()
                        .map(|d| DuplicationKey::Currency(d.currency().clone())),
                );
            }
            Operation::Transfers(_) | Operation::KeyUpdater(_) | Operation::Fee(_) => {}
        }
        keys
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOperation {
    pub hash: Hash,
    pub kind: OperationKind,
    pub reason: RejectReason,
}

/// Outcome of a batch, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub included: Vec<Hash>,
    pub rejected: Vec<RejectedOperation>,
}

impl ProcessResult {
    fn record(&mut self, op: &Operation, outcome: Result<(), ProcessError>) -> Result<(), ProcessError> {
        match outcome {
            Ok(()) => self.included.push(op.hash()),
            Err(ProcessError::Rejected { kind, reason }) => self.rejected.push(RejectedOperation {
                hash: op.hash(),
                kind,
                reason,
            }),
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Aborts an orchestrator from another thread. Operations already committed
/// stay in the pool; nothing new starts.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Processor recycling
// ---------------------------------------------------------------------------

struct ProcessorPool {
    idle: Mutex<HashMap<OperationKind, Vec<Box<dyn Processor>>>>,
    capacity: usize,
}

impl ProcessorPool {
    fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn take(&self, kind: OperationKind) -> Option<Box<dyn Processor>> {
        self.idle.lock().get_mut(&kind).and_then(Vec::pop)
    }

    fn put(&self, mut processor: Box<dyn Processor>) {
        processor.close();
        let mut idle = self.idle.lock();
        let slot = idle.entry(processor.kind()).or_default();
        if slot.len() < self.capacity {
            slot.push(processor);
        }
    }

    fn idle(&self, kind: OperationKind) -> usize {
        self.idle.lock().get(&kind).map_or(0, Vec::len)
    }
}

// ---------------------------------------------------------------------------
// Fee collection
// ---------------------------------------------------------------------------

/// Adds the fee recorded on every balance update to the block total, once
/// the wrapped pool accepted the operation.
struct FeeCollectingWriter<'a> {
    inner: &'a StatePool,
    fees: &'a Mutex<BTreeMap<CurrencyId, Big>>,
}

impl StateWriter for FeeCollectingWriter<'_> {
    fn set_state(&self, op_hash: &Hash, updates: Vec<StateUpdate>) -> Result<(), StateError> {
        let collected: Vec<(CurrencyId, Big)> = updates
            .iter()
            .filter_map(|u| match u {
                StateUpdate::Merge(am) if am.fee().over_zero() => {
                    Some((am.currency().clone(), am.fee().clone()))
                }
                _ => None,
            })
            .collect();

        self.inner.set_state(op_hash, updates)?;

        let mut fees = self.fees.lock();
        for (cid, fee) in collected {
            let total = fees.entry(cid).or_insert_with(Big::zero);
            *total = total.add(&fee);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Fee operations are unsigned; only [`OperationProcessor::finish`] builds
/// and applies them.
fn admit(op: &Operation) -> Result<(), ProcessError> {
    match op {
        Operation::Fee(_) => Err(ProcessError::rejected(
            op.kind(),
            RejectReason::Unauthorized("fee operations are emitted by the block".into()),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// OperationProcessor
// ---------------------------------------------------------------------------

pub struct OperationProcessor {
    state_pool: Arc<StatePool>,
    currency_pool: Arc<CurrencyPool>,
    registry: ProcessorRegistry,
    context: ProcessorContext,
    config: ProcessorConfig,
    gates: Mutex<HashSet<DuplicationKey>>,
    processors: ProcessorPool,
    fees: Mutex<BTreeMap<CurrencyId, Big>>,
    abort: AbortHandle,
}

impl OperationProcessor {
    pub fn new(
        state_pool: Arc<StatePool>,
        currency_pool: Arc<CurrencyPool>,
        registry: ProcessorRegistry,
        config: ProcessorConfig,
    ) -> Self {
        let context = ProcessorContext::new(currency_pool.clone());
        let processors = ProcessorPool::new(config.max_recycled_processors);
        Self {
            state_pool,
            currency_pool,
            registry,
            context,
            config,
            gates: Mutex::new(HashSet::new()),
            processors,
            fees: Mutex::new(BTreeMap::new()),
            abort: AbortHandle::default(),
        }
    }

    pub fn state_pool(&self) -> &Arc<StatePool> {
        &self.state_pool
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Fees collected so far, per currency.
    pub fn collected_fees(&self) -> BTreeMap<CurrencyId, Big> {
        self.fees.lock().clone()
    }

    /// Processors currently parked for reuse.
    pub fn idle_processors(&self, kind: OperationKind) -> usize {
        self.processors.idle(kind)
    }

    /// Process one operation.
    ///
    /// `Err(Rejected)` leaves the block untouched; any other error means the
    /// block must be abandoned.
    pub fn process(&self, op: &Operation) -> Result<(), ProcessError> {
        self.ensure_running()?;
        let keys = DuplicationKey::of(op);
        let outcome = admit(op)
            .and_then(|()| self.check_gates(op.kind(), &keys))
            .and_then(|()| self.prepare(op))
            .and_then(|prepared| self.commit(op, prepared, &keys));
        self.log_outcome(op, &outcome);
        outcome
    }

    /// Process `ops` in order, fanning pre-processing out to the rayon pool
    /// when the batch is large enough.
    pub fn process_batch(&self, ops: &[Operation]) -> Result<ProcessResult, ProcessError> {
        self.ensure_running()?;
        let mut result = ProcessResult::default();
        let parallel = ops.len() >= self.config.parallel_threshold;

        if parallel {
            let prepared: Vec<Result<Option<Box<dyn Processor>>, ProcessError>> =
                ops.par_iter()
                    .map(|op| admit(op).and_then(|()| self.prepare(op)))
                    .collect();

            for (op, first) in ops.iter().zip(prepared) {
                if let Err(e) = self.ensure_running() {
                    if let Ok(Some(p)) = first {
                        self.processors.put(p);
                    }
                    return Err(e);
                }
                let keys = DuplicationKey::of(op);
                let outcome = match admit(op).and_then(|()| self.check_gates(op.kind(), &keys)) {
                    Err(e) => {
                        if let Ok(Some(p)) = first {
                            self.processors.put(p);
                        }
                        Err(e)
                    }
                    Ok(()) => match first {
                        Ok(prepared) => self.commit(op, prepared, &keys),
                        Err(_) => self
                            .prepare(op)
                            .and_then(|prepared| self.commit(op, prepared, &keys)),
                    },
                };
                self.log_outcome(op, &outcome);
                result.record(op, outcome)?;
            }
        } else {
            for op in ops {
                result.record(op, self.process(op))?;
            }
        }

        info!(
            height = self.state_pool.height(),
            included = result.included.len(),
            rejected = result.rejected.len(),
            parallel,
            "batch processed"
        );
        Ok(result)
    }

    /// Close the block: process the fee operation for everything collected
    /// and refresh the currency pool from the designs written in this
    /// block. Returns the fee operation, if one was emitted.
    pub fn finish(&self) -> Result<Option<FeeOperation>, ProcessError> {
        self.ensure_running()?;
        let fees = std::mem::take(&mut *self.fees.lock());

        let mut emitted = None;
        if self.config.emit_fee_operation && !fees.is_empty() {
            let amounts: Vec<Amount> = fees
                .into_iter()
                .map(|(cid, total)| Amount::new(total, cid))
                .collect();
            let fee_op = FeeOperation::for_height(self.state_pool.height(), amounts);
            let op = Operation::Fee(fee_op.clone());

            let prepared = self.prepare(&op)?;
            self.apply(&op, prepared, self.state_pool.as_ref())?;

            info!(
                op_hash = %fee_op.hash(),
                height = self.state_pool.height(),
                currencies = fee_op.fact().amounts().len(),
                "fee operation emitted"
            );
            emitted = Some(fee_op);
        }

        let refreshed = self.currency_pool.refresh_from(&self.state_pool)?;
        if refreshed > 0 {
            info!(currencies = refreshed, "currency pool refreshed");
        }
        Ok(emitted)
    }

    // -- internals ---------------------------------------------------------

    fn ensure_running(&self) -> Result<(), ProcessError> {
        if self.abort.is_aborted() {
            return Err(ProcessError::Cancelled);
        }
        Ok(())
    }

    fn check_gates(&self, kind: OperationKind, keys: &[DuplicationKey]) -> Result<(), ProcessError> {
        let gates = self.gates.lock();
        match keys.iter().find(|k| gates.contains(k)) {
            Some(k) => Err(ProcessError::rejected(kind, k.reject_reason())),
            None => Ok(()),
        }
    }

    /// Claim every key or none.
    fn try_claim(&self, kind: OperationKind, keys: &[DuplicationKey]) -> Result<(), ProcessError> {
        let mut gates = self.gates.lock();
        if let Some(k) = keys.iter().find(|k| gates.contains(k)) {
            return Err(ProcessError::rejected(kind, k.reject_reason()));
        }
        gates.extend(keys.iter().cloned());
        Ok(())
    }

    fn checkout(&self, kind: OperationKind) -> Option<Box<dyn Processor>> {
        self.processors.take(kind).or_else(|| {
            self.registry
                .factory(kind)
                .map(|factory| factory(&self.context))
        })
    }

    /// Pre-process `op`. `None` means no processor is registered for its
    /// kind and the operation passes through.
    fn prepare(&self, op: &Operation) -> Result<Option<Box<dyn Processor>>, ProcessError> {
        self.ensure_running()?;
        let Some(mut processor) = self.checkout(op.kind()) else {
            return Ok(None);
        };
        match processor.pre_process(op, self.state_pool.as_ref()) {
            Ok(()) => Ok(Some(processor)),
            Err(e) => {
                self.processors.put(processor);
                Err(e)
            }
        }
    }

    fn commit(
        &self,
        op: &Operation,
        prepared: Option<Box<dyn Processor>>,
        keys: &[DuplicationKey],
    ) -> Result<(), ProcessError> {
        if let Err(e) = self.try_claim(op.kind(), keys) {
            if let Some(p) = prepared {
                self.processors.put(p);
            }
            return Err(e);
        }
        let writer = FeeCollectingWriter {
            inner: self.state_pool.as_ref(),
            fees: &self.fees,
        };
        self.apply(op, prepared, &writer)
    }

    fn apply(
        &self,
        op: &Operation,
        prepared: Option<Box<dyn Processor>>,
        writer: &dyn StateWriter,
    ) -> Result<(), ProcessError> {
        let Some(mut processor) = prepared else {
            writer.set_state(&op.hash(), Vec::new())?;
            return Ok(());
        };
        let outcome = processor.process(writer);
        self.processors.put(processor);
        outcome.map_err(|e| match e {
            ProcessError::Rejected { kind, reason } => {
                ProcessError::Fatal(format!("{kind} process failed after pre-process: {reason}"))
            }
            other => other,
        })
    }

    fn log_outcome(&self, op: &Operation, outcome: &Result<(), ProcessError>) {
        match outcome {
            Ok(()) => debug!(op_hash = %op.hash(), kind = %op.kind(), "operation processed"),
            Err(ProcessError::Rejected { reason, .. }) => debug!(
                op_hash = %op.hash(),
                kind = %op.kind(),
                reason = %reason,
                "operation rejected"
            ),
            Err(e) => warn!(op_hash = %op.hash(), kind = %op.kind(), error = %e, "operation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::testing::{single_keys, Fixture, NETWORK_ID};

    fn orchestrator(fx: &Fixture) -> OperationProcessor {
        let pool = Arc::new(StatePool::new(fx.store.clone(), 1));
        let registry = ProcessorRegistry::with_defaults((*fx.suffrage).clone());
        let config = ProcessorConfig {
            network_id: NETWORK_ID.to_vec(),
            ..ProcessorConfig::default()
        };
        OperationProcessor::new(pool, fx.currency_pool.clone(), registry, config)
    }

    fn balance(op: &OperationProcessor, fx: &Fixture, address: &Address) -> Big {
        use crate::state::StateReader;
        op.state_pool()
            .get_state(&keys::balance(address, &fx.cid))
            .unwrap()
            .map(|st| st.balance_value().unwrap().big().clone())
            .unwrap_or_else(Big::zero)
    }

    #[test]
    fn second_operation_of_sender_rejected() {
        let fx = Fixture::new(100, 1);
        let (_, receiver) = fx.add_account(7, 0);
        let p = orchestrator(&fx);

        p.process(&fx.transfer(&[(&receiver, 10)])).unwrap();
        let err = p.process(&fx.transfer(&[(&receiver, 10)])).unwrap_err();
        assert_eq!(
            err.reason(),
            Some(&RejectReason::DuplicateSender(fx.sender_address.clone()))
        );
        assert_eq!(balance(&p, &fx, &receiver), Big::new(10));
    }

    #[test]
    fn rejected_operation_does_not_claim_sender() {
        let fx = Fixture::new(10, 1);
        let (_, receiver) = fx.add_account(7, 0);
        let p = orchestrator(&fx);

        assert!(p.process(&fx.transfer(&[(&receiver, 50)])).unwrap_err().is_rejected());
        p.process(&fx.transfer(&[(&receiver, 5)])).unwrap();
        assert_eq!(balance(&p, &fx, &fx.sender_address), Big::new(4));
    }

    #[test]
    fn account_created_earlier_in_block_already_exists() {
        let fx = Fixture::new(100, 0);
        let (other_kp, other) = fx.add_account(8, 100);
        let p = orchestrator(&fx);

        let (first, target) = fx.create_account_with_token(10, b"first");
        p.process(&first).unwrap();

        let (second, same_target) = fx.create_account_from(&other_kp, &other, 10, b"second");
        assert_eq!(target, same_target);
        let err = p.process(&second).unwrap_err();
        assert_eq!(
            err.reason(),
            Some(&RejectReason::AlreadyExists(format!(
                "keys of account, {}",
                keys::account(&target)
            )))
        );
        assert_eq!(balance(&p, &fx, &other), Big::new(100));
        assert_eq!(balance(&p, &fx, &target), Big::new(10));
    }

    #[test]
    fn submitted_fee_operation_rejected() {
        let fx = Fixture::new(100, 1);
        let p = orchestrator(&fx);
        let forged = Operation::Fee(FeeOperation::for_height(
            99,
            vec![Amount::new(Big::new(1_000_000), fx.cid.clone())],
        ));

        let err = p.process(&forged).unwrap_err();
        assert!(matches!(err.reason(), Some(RejectReason::Unauthorized(_))));

        // Large enough to take the parallel path.
        let batch = vec![forged.clone(); 4];
        let result = p.process_batch(&batch).unwrap();
        assert!(result.included.is_empty());
        assert_eq!(result.rejected.len(), 4);

        assert_eq!(balance(&p, &fx, &fx.fee_receiver), Big::zero());
        assert!(!p.state_pool().is_committed(&forged.hash()));
        assert!(p.finish().unwrap().is_none());
    }

    #[test]
    fn one_governance_operation_per_currency() {
        let fx = Fixture::new(10, 0);
        let (_, a) = fx.add_account(7, 0);
        let p = orchestrator(&fx);

        p.process(&fx.inflate(&[(&a, 5)])).unwrap();
        let err = p
            .process(&fx.update_policy(fx.cid.as_str(), Big::zero(), crate::currency::Feeer::Nil))
            .unwrap_err();
        assert_eq!(err.reason(), Some(&RejectReason::DuplicateCurrency(fx.cid.clone())));
    }

    #[test]
    fn finish_emits_fee_operation_and_credits_receiver() {
        let fx = Fixture::new(100, 2);
        let (_, r1) = fx.add_account(7, 0);
        let (kp, r2) = fx.add_account(8, 50);
        let p = orchestrator(&fx);

        p.process(&fx.transfer(&[(&r1, 10)])).unwrap();
        p.process(&fx.transfer_signed_by_account(&kp, &r2, &[(&r1, 10)])).unwrap();
        assert_eq!(p.collected_fees().get(&fx.cid), Some(&Big::new(4)));

        let fee_op = p.finish().unwrap().unwrap();
        assert_eq!(fee_op.fact().amounts(), &[Amount::new(Big::new(4), fx.cid.clone())]);
        assert_eq!(balance(&p, &fx, &fx.fee_receiver), Big::new(4));
        assert!(p.state_pool().is_committed(&fee_op.hash()));
        assert!(p.collected_fees().is_empty());
    }

    #[test]
    fn finish_without_fees_emits_nothing() {
        let fx = Fixture::new(100, 0);
        let (_, r1) = fx.add_account(7, 0);
        let p = orchestrator(&fx);
        p.process(&fx.transfer(&[(&r1, 10)])).unwrap();
        assert!(p.finish().unwrap().is_none());
    }

    #[test]
    fn registered_currency_usable_after_finish() {
        let fx = Fixture::new(10, 0);
        let p = orchestrator(&fx);
        p.process(&fx.register_currency("NEW", 500)).unwrap();
        let cid = CurrencyId::new("NEW").unwrap();
        assert!(!fx.currency_pool.exists(&cid));

        p.finish().unwrap();
        assert!(fx.currency_pool.exists(&cid));
    }

    #[test]
    fn unregistered_kind_passes_through() {
        let fx = Fixture::new(10, 0);
        let (_, r1) = fx.add_account(7, 0);
        let pool = Arc::new(StatePool::new(fx.store.clone(), 1));
        let p = OperationProcessor::new(
            pool,
            fx.currency_pool.clone(),
            ProcessorRegistry::new(),
            ProcessorConfig::default(),
        );
        let op = fx.transfer(&[(&r1, 10)]);
        p.process(&op).unwrap();
        assert!(p.state_pool().is_committed(&op.hash()));
        assert!(p.state_pool().is_empty());
    }

    #[test]
    fn aborted_orchestrator_cancels() {
        let fx = Fixture::new(10, 0);
        let (_, r1) = fx.add_account(7, 0);
        let p = orchestrator(&fx);
        p.abort_handle().abort();
        assert_eq!(p.process(&fx.transfer(&[(&r1, 1)])), Err(ProcessError::Cancelled));
        assert_eq!(p.finish(), Err(ProcessError::Cancelled));
    }

    #[test]
    fn processors_are_recycled() {
        let fx = Fixture::new(100, 0);
        let (_, r1) = fx.add_account(7, 0);
        let p = orchestrator(&fx);
        p.process(&fx.transfer(&[(&r1, 1)])).unwrap();
        assert_eq!(p.idle_processors(OperationKind::Transfers), 1);
        let _ = p.process(&fx.transfer(&[(&r1, 1)]));
        assert_eq!(p.idle_processors(OperationKind::Transfers), 1);
    }

    #[test]
    fn parallel_batch_matches_sequential_order() {
        // The new account is funded by the first operation and spends in the
        // third; the duplicate sender in the second is rejected.
        let fx = Fixture::new(100, 1);
        let (_, r1) = fx.add_account(7, 0);
        let (create, new_account) = fx.create_account(20);
        let new_kp = crate::crypto::NovaKeypair::from_seed(&[50u8; 32]);
        let ops = vec![
            create,
            fx.transfer(&[(&r1, 5)]),
            fx.transfer_signed_by_account(&new_kp, &new_account, &[(&r1, 5)]),
            fx.update_keys(single_keys(90)),
        ];

        let p = orchestrator(&fx);
        let result = p.process_batch(&ops).unwrap();

        assert_eq!(result.included, vec![ops[0].hash(), ops[2].hash()]);
        assert_eq!(result.rejected.len(), 2);
        assert!(result
            .rejected
            .iter()
            .all(|r| r.reason == RejectReason::DuplicateSender(fx.sender_address.clone())));
        assert_eq!(balance(&p, &fx, &fx.sender_address), Big::new(79));
        assert_eq!(balance(&p, &fx, &new_account), Big::new(14));
        assert_eq!(balance(&p, &fx, &r1), Big::new(5));
    }

    #[test]
    fn fatal_state_error_aborts_batch() {
        let fx = Fixture::new(100, 0);
        let (_, r1) = fx.add_account(7, 0);
        let failing = Arc::new(|_: &str| -> Result<Option<crate::state::State>, StateError> {
            Err(StateError::Store("disk gone".into()))
        });
        let pool = Arc::new(StatePool::new(failing, 1));
        let registry = ProcessorRegistry::with_defaults((*fx.suffrage).clone());
        let p = OperationProcessor::new(
            pool,
            fx.currency_pool.clone(),
            registry,
            ProcessorConfig::default(),
        );

        let err = p.process_batch(&[fx.transfer(&[(&r1, 1)])]).unwrap_err();
        assert!(matches!(err, ProcessError::State(StateError::Store(_))));
    }
}
