//! # State Pool -- Per-Block Overlay
//!
//! Every write made while a block is processed lands here, never in the
//! backing store. Reads check the overlay first and fall through to the
//! backing store, so an operation always sees the effect of the operations
//! committed before it in the same block.
//!
//! ## Atomicity
//!
//! [`StatePool::set_state`] stages all of one operation's updates in a
//! scratch map before touching the overlay. If any update fails to merge
//! the overlay is left exactly as it was: an operation contributes all of
//! its writes or none of them.
//!
//! ## Merging
//!
//! [`StateUpdate::Merge`] carries an [`AmountState`]; its pending delta is
//! added to the *latest* value of the key (scratch, then overlay, then
//! backing store), not to the value the processor read. Two updates to the
//! same balance within one operation therefore compose.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use super::amount::AmountState;
use super::value::{State, StateValue};
use super::{StateError, StateReader, StateWriter};
use crate::crypto::Hash;

// ---------------------------------------------------------------------------
// StateUpdate
// ---------------------------------------------------------------------------

/// One write handed to [`StateWriter::set_state`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// Store this state's value as is.
    Replace(State),
    /// Add the staged delta to the latest balance under this key.
    Merge(AmountState),
}

impl StateUpdate {
    pub fn key(&self) -> &str {
        match self {
            StateUpdate::Replace(st) => st.key(),
            StateUpdate::Merge(am) => am.key(),
        }
    }
}

impl From<State> for StateUpdate {
    fn from(st: State) -> Self {
        StateUpdate::Replace(st)
    }
}

impl From<AmountState> for StateUpdate {
    fn from(am: AmountState) -> Self {
        StateUpdate::Merge(am)
    }
}

// ---------------------------------------------------------------------------
// StatePool
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Overlay {
    states: HashMap<String, State>,
    /// Keys in first-write order.
    order: Vec<String>,
    /// Operations committed into this block, in order.
    operations: Vec<Hash>,
}

pub struct StatePool {
    backing: Arc<dyn StateReader + Send + Sync>,
    height: u64,
    overlay: RwLock<Overlay>,
}

impl StatePool {
    /// An empty overlay for the block at `height`.
    pub fn new(backing: Arc<dyn StateReader + Send + Sync>, height: u64) -> Self {
        Self {
            backing,
            height,
            overlay: RwLock::new(Overlay::default()),
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Every state written during this block, in first-write order.
    pub fn updated(&self) -> Vec<State> {
        let overlay = self.overlay.read();
        overlay
            .order
            .iter()
            .filter_map(|k| overlay.states.get(k).cloned())
            .collect()
    }

    /// Hashes of the operations committed into this block, in order.
    pub fn operations(&self) -> Vec<Hash> {
        self.overlay.read().operations.clone()
    }

    pub fn is_committed(&self, op_hash: &Hash) -> bool {
        self.overlay.read().operations.contains(op_hash)
    }

    pub fn len(&self) -> usize {
        self.overlay.read().states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlay.read().states.is_empty()
    }

    fn latest(
        &self,
        overlay: &Overlay,
        scratch: &HashMap<String, State>,
        key: &str,
    ) -> Result<State, StateError> {
        if let Some(st) = scratch.get(key).or_else(|| overlay.states.get(key)) {
            return Ok(st.clone());
        }
        Ok(self
            .backing
            .get_state(key)?
            .unwrap_or_else(|| State::blank(key.to_string())))
    }
}

impl StateReader for StatePool {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        if let Some(st) = self.overlay.read().states.get(key) {
            return Ok(Some(st.clone()));
        }
        self.backing.get_state(key)
    }
}

impl StateWriter for StatePool {
    fn set_state(&self, op_hash: &Hash, updates: Vec<StateUpdate>) -> Result<(), StateError> {
        let mut overlay = self.overlay.write();
        if overlay.operations.contains(op_hash) {
            return Err(StateError::AlreadyCommitted(*op_hash));
        }

        let mut scratch: HashMap<String, State> = HashMap::with_capacity(updates.len());
        let mut touched: Vec<String> = Vec::with_capacity(updates.len());

        for update in updates {
            let key = update.key().to_string();
            let base = self.latest(&overlay, &scratch, &key)?;
            let value = match update {
                StateUpdate::Replace(st) => st
                    .value()
                    .cloned()
                    .ok_or_else(|| StateError::Blank(key.clone()))?,
                StateUpdate::Merge(am) => StateValue::Balance(am.merge(&base)?),
            };
            let next = base.succeed(value, self.height, *op_hash);
            if !touched.contains(&key) {
                touched.push(key.clone());
            }
            scratch.insert(key, next);
        }

        for key in touched {
            if !overlay.states.contains_key(&key) {
                overlay.order.push(key.clone());
            }
            if let Some(st) = scratch.remove(&key) {
                overlay.states.insert(key, st);
            }
        }
        overlay.operations.push(*op_hash);

        trace!(op_hash = %op_hash, states = overlay.states.len(), "operation states applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateStore;
    use crate::types::{Amount, Big, CurrencyId};

    fn money() -> CurrencyId {
        CurrencyId::new("MONEY").unwrap()
    }

    fn balance(key: &str, v: i64) -> State {
        State::new(
            key.to_string(),
            StateValue::Balance(Amount::new(Big::new(v), money())),
            1,
        )
    }

    fn pool_with(states: Vec<State>) -> StatePool {
        let store = MemoryStateStore::new();
        for st in states {
            store.insert(st);
        }
        StatePool::new(Arc::new(store), 2)
    }

    fn read_balance(pool: &StatePool, key: &str) -> Big {
        pool.get_state(key)
            .unwrap()
            .unwrap()
            .balance_value()
            .unwrap()
            .big()
            .clone()
    }

    #[test]
    fn reads_fall_through_to_backing() {
        let pool = pool_with(vec![balance("a", 10)]);
        assert_eq!(read_balance(&pool, "a"), Big::new(10));
        assert!(pool.get_state("missing").unwrap().is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn merge_applies_to_latest_value() {
        let pool = pool_with(vec![balance("a", 10)]);
        let staged = AmountState::new(balance("a", 10), money());

        pool.set_state(&Hash::blake3(b"op1"), vec![staged.add(&Big::new(5)).into()])
            .unwrap();
        // Staged against the stale read; still lands on top of op1's write.
        pool.set_state(&Hash::blake3(b"op2"), vec![staged.sub(&Big::new(3)).into()])
            .unwrap();

        assert_eq!(read_balance(&pool, "a"), Big::new(12));
        let st = pool.get_state("a").unwrap().unwrap();
        assert_eq!(st.height(), 2);
        assert_eq!(st.previous_height(), Some(1));
        assert_eq!(st.operations().len(), 2);
    }

    #[test]
    fn two_merges_in_one_operation_compose() {
        let pool = pool_with(vec![balance("a", 10)]);
        let staged = AmountState::new(balance("a", 10), money());
        pool.set_state(
            &Hash::blake3(b"op"),
            vec![
                staged.add(&Big::new(1)).into(),
                staged.add(&Big::new(2)).into(),
            ],
        )
        .unwrap();
        assert_eq!(read_balance(&pool, "a"), Big::new(13));
    }

    #[test]
    fn failed_update_leaves_overlay_untouched() {
        let pool = pool_with(vec![balance("a", 10)]);
        let staged = AmountState::new(balance("a", 10), money());
        let result = pool.set_state(
            &Hash::blake3(b"op"),
            vec![
                staged.add(&Big::new(1)).into(),
                StateUpdate::Replace(State::blank("b".into())),
            ],
        );
        assert!(matches!(result, Err(StateError::Blank(_))));
        assert!(pool.is_empty());
        assert_eq!(read_balance(&pool, "a"), Big::new(10));
        assert!(pool.operations().is_empty());
    }

    #[test]
    fn operation_committed_once() {
        let pool = pool_with(vec![]);
        let op = Hash::blake3(b"op");
        pool.set_state(&op, vec![balance("x", 1).into()]).unwrap();
        assert!(pool.is_committed(&op));
        assert!(matches!(
            pool.set_state(&op, vec![balance("y", 1).into()]),
            Err(StateError::AlreadyCommitted(_))
        ));
    }

    #[test]
    fn updated_in_first_write_order() {
        let pool = pool_with(vec![]);
        pool.set_state(&Hash::blake3(b"1"), vec![balance("z", 1).into(), balance("a", 1).into()])
            .unwrap();
        pool.set_state(&Hash::blake3(b"2"), vec![balance("m", 1).into(), balance("z", 2).into()])
            .unwrap();

        let keys: Vec<String> = pool.updated().iter().map(|s| s.key().to_string()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(pool.operations().len(), 2);
    }
}
