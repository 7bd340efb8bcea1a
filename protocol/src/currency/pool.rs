//! # Currency Pool
//!
//! Registry of every known currency, shared by all processors. Reads
//! vastly outnumber writes (every fee calculation reads, only finished
//! blocks that touched a currency design write), so the map sits behind a
//! `parking_lot::RwLock` and concurrent pre-processing never contends.
//!
//! The pool is rebuilt from finished blocks rather than mutated while a
//! block is in flight: operations within one block all see the policy that
//! was in force when the block started.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::feeer::Feeer;
use super::policy::{CurrencyDesign, CurrencyPolicy};
use crate::state::{State, StateError, StatePool};
use crate::types::CurrencyId;

#[derive(Debug, Default)]
pub struct CurrencyPool {
    entries: RwLock<HashMap<CurrencyId, (CurrencyDesign, State)>>,
}

impl CurrencyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) the design carried by `state`, replacing
    /// any earlier entry for the same currency.
    pub fn set(&self, state: &State) -> Result<(), StateError> {
        let design = state.currency_design_value()?.clone();
        debug!(
            currency = %design.currency(),
            aggregate = %design.aggregate(),
            "currency design registered"
        );
        self.entries
            .write()
            .insert(design.currency().clone(), (design, state.clone()));
        Ok(())
    }

    /// Re-register every currency design written during a block.
    pub fn refresh_from(&self, pool: &StatePool) -> Result<usize, StateError> {
        let mut count = 0;
        for state in pool.updated() {
            if state.value().is_some_and(|v| v.is_currency_design()) {
                self.set(&state)?;
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn get(&self, cid: &CurrencyId) -> Option<CurrencyDesign> {
        self.entries.read().get(cid).map(|(d, _)| d.clone())
    }

    pub fn exists(&self, cid: &CurrencyId) -> bool {
        self.entries.read().contains_key(cid)
    }

    pub fn policy(&self, cid: &CurrencyId) -> Option<CurrencyPolicy> {
        self.entries.read().get(cid).map(|(d, _)| d.policy().clone())
    }

    pub fn feeer(&self, cid: &CurrencyId) -> Option<Feeer> {
        self.entries
            .read()
            .get(cid)
            .map(|(d, _)| d.policy().feeer().clone())
    }

    /// The state the design was registered from.
    pub fn state(&self, cid: &CurrencyId) -> Option<State> {
        self.entries.read().get(cid).map(|(_, s)| s.clone())
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<CurrencyId> {
        let mut ids: Vec<_> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
