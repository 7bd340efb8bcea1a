//! Operation kind to processor factory table.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    CreateAccountsProcessor, CurrencyPolicyUpdaterProcessor, CurrencyRegisterProcessor,
    FeeProcessor, GenesisCurrenciesProcessor, KeyUpdaterProcessor, Processor, ProcessorContext,
    SuffrageInflationProcessor, TransfersProcessor,
};
use crate::operation::OperationKind;
use crate::types::Suffrage;

/// Builds a fresh processor bound to the shared context.
pub type ProcessorFactory = Arc<dyn Fn(&ProcessorContext) -> Box<dyn Processor> + Send + Sync>;

/// Which processor handles which operation kind.
///
/// Cheap to clone, so one registry can be built at startup and handed to
/// the orchestrator of every block.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    factories: HashMap<OperationKind, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// An empty registry. Every operation passes through unprocessed until
    /// a factory is set for its kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in kind, with governance kinds authorized by `suffrage`.
    pub fn with_defaults(suffrage: Suffrage) -> Self {
        let suffrage = Arc::new(suffrage);
        let mut registry = Self::new();

        registry.set_processor(
            OperationKind::CreateAccounts,
            Arc::new(|ctx: &ProcessorContext| {
                Box::new(CreateAccountsProcessor::new(ctx.currency_pool.clone())) as Box<dyn Processor>
            }),
        );
        registry.set_processor(
            OperationKind::Transfers,
            Arc::new(|ctx: &ProcessorContext| {
                Box::new(TransfersProcessor::new(ctx.currency_pool.clone())) as Box<dyn Processor>
            }),
        );
        registry.set_processor(
            OperationKind::KeyUpdater,
            Arc::new(|ctx: &ProcessorContext| {
                Box::new(KeyUpdaterProcessor::new(ctx.currency_pool.clone())) as Box<dyn Processor>
            }),
        );

        let s = suffrage.clone();
        registry.set_processor(
            OperationKind::CurrencyRegister,
            Arc::new(move |ctx: &ProcessorContext| {
                Box::new(CurrencyRegisterProcessor::new(ctx.currency_pool.clone(), s.clone()))
                    as Box<dyn Processor>
            }),
        );
        let s = suffrage.clone();
        registry.set_processor(
            OperationKind::CurrencyPolicyUpdater,
            Arc::new(move |ctx: &ProcessorContext| {
                Box::new(CurrencyPolicyUpdaterProcessor::new(
                    ctx.currency_pool.clone(),
                    s.clone(),
                )) as Box<dyn Processor>
            }),
        );
        let s = suffrage;
        registry.set_processor(
            OperationKind::SuffrageInflation,
            Arc::new(move |ctx: &ProcessorContext| {
                Box::new(SuffrageInflationProcessor::new(ctx.currency_pool.clone(), s.clone()))
                    as Box<dyn Processor>
            }),
        );

        registry.set_processor(
            OperationKind::GenesisCurrencies,
            Arc::new(|ctx: &ProcessorContext| {
                Box::new(GenesisCurrenciesProcessor::new(ctx.currency_pool.clone()))
                    as Box<dyn Processor>
            }),
        );
        registry.set_processor(
            OperationKind::Fee,
            Arc::new(|ctx: &ProcessorContext| {
                Box::new(FeeProcessor::new(ctx.currency_pool.clone())) as Box<dyn Processor>
            }),
        );

        registry
    }

    /// Register (or replace) the factory for `kind`.
    pub fn set_processor(&mut self, kind: OperationKind, factory: ProcessorFactory) -> &mut Self {
        self.factories.insert(kind, factory);
        self
    }

    pub fn factory(&self, kind: OperationKind) -> Option<&ProcessorFactory> {
        self.factories.get(&kind)
    }

    pub fn contains(&self, kind: OperationKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::NovaKeypair;

    #[test]
    fn defaults_cover_every_kind() {
        let node = NovaKeypair::from_seed(&[1u8; 32]).public_key();
        let registry = ProcessorRegistry::with_defaults(Suffrage::new(vec![node], 100).unwrap());
        for kind in OperationKind::ALL {
            assert!(registry.contains(kind), "missing {kind}");
        }
        assert_eq!(registry.len(), OperationKind::ALL.len());
    }

    #[test]
    fn factory_builds_processor_of_its_kind() {
        let node = NovaKeypair::from_seed(&[1u8; 32]).public_key();
        let registry = ProcessorRegistry::with_defaults(Suffrage::new(vec![node], 100).unwrap());
        let ctx = ProcessorContext::new(Arc::new(crate::currency::CurrencyPool::new()));
        for kind in OperationKind::ALL {
            let p = (registry.factory(kind).unwrap())(&ctx);
            assert_eq!(p.kind(), kind);
        }
    }

    #[test]
    fn empty_registry() {
        let registry = ProcessorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.factory(OperationKind::Transfers).is_none());
    }
}
