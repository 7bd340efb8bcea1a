//! In-memory backing store.
//!
//! Stands in for the host's persistent store during bootstrap and tests.
//! Lock-free reads through `DashMap`, so parallel pre-processing never
//! serializes on it.

use dashmap::DashMap;
use tracing::debug;

use super::pool::StatePool;
use super::value::State;
use super::{StateError, StateReader};

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: DashMap<String, State>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a state directly, bypassing any block.
    pub fn insert(&self, state: State) {
        self.states.insert(state.key().to_string(), state);
    }

    pub fn get(&self, key: &str) -> Option<State> {
        self.states.get(key).map(|s| s.value().clone())
    }

    /// Fold a finished block's writes into the store. Returns the number of
    /// states written.
    pub fn commit(&self, pool: &StatePool) -> usize {
        let updated = pool.updated();
        let count = updated.len();
        for state in updated {
            self.insert(state);
        }
        debug!(height = pool.height(), states = count, "block states committed");
        count
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateReader for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        Ok(self.get(key))
    }
}
