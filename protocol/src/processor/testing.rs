//! Shared fixture for processor tests: one currency with a fixed fee, a
//! funded sender, a fee receiver and a single-node suffrage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::crypto::NovaKeypair;
use crate::currency::{CurrencyDesign, CurrencyPolicy, CurrencyPool, Feeer, FixedFeeer};
use crate::operation::{
    CreateAccounts, CreateAccountsFact, CreateAccountsItem, CurrencyPolicyUpdater,
    CurrencyPolicyUpdaterFact, CurrencyRegister, CurrencyRegisterFact, KeyUpdater, KeyUpdaterFact,
    Operation, SuffrageInflation, SuffrageInflationFact, SuffrageInflationItem, Transfers,
    TransfersFact, TransfersItem,
};
use crate::state::{keys, MemoryStateStore, State, StatePool, StateReader};
use crate::types::{Account, AccountKey, AccountKeys, Address, Amount, Big, CurrencyId, Suffrage};

pub(crate) const NETWORK_ID: &[u8] = b"processor-test";

/// Single key of weight 100, threshold 100, derived from `seed`.
pub(crate) fn single_keys(seed: u8) -> AccountKeys {
    let pk = NovaKeypair::from_seed(&[seed; 32]).public_key();
    AccountKeys::new(vec![AccountKey::new(pk, 100).unwrap()], 100).unwrap()
}

pub(crate) struct Fixture {
    pub network_id: Vec<u8>,
    pub currency_pool: Arc<CurrencyPool>,
    pub store: Arc<MemoryStateStore>,
    pub pool: StatePool,
    pub sender: NovaKeypair,
    pub sender_address: Address,
    pub fee_receiver: Address,
    pub cid: CurrencyId,
    pub suffrage_node: NovaKeypair,
    pub suffrage: Arc<Suffrage>,
    tokens: AtomicU64,
}

impl Fixture {
    pub fn new(sender_balance: i64, fee: i64) -> Self {
        Self::with_min_balance(sender_balance, fee, 0)
    }

    pub fn with_min_balance(sender_balance: i64, fee: i64, min: i64) -> Self {
        let cid = CurrencyId::new("MCC").unwrap();
        let store = Arc::new(MemoryStateStore::new());

        let sender = NovaKeypair::from_seed(&[1u8; 32]);
        let sender_address = seed_account(&store, single_keys(1));
        seed_balance(&store, &sender_address, &cid, sender_balance);

        let fee_receiver = seed_account(&store, single_keys(2));
        seed_balance(&store, &fee_receiver, &cid, 0);

        let feeer = Feeer::Fixed(FixedFeeer::new(fee_receiver.clone(), Big::new(fee)));
        let design = CurrencyDesign::new(
            Amount::new(Big::new(1_000_000), cid.clone()),
            Some(sender_address.clone()),
            CurrencyPolicy::new(Big::new(min), feeer),
        );
        let design_state = State::new(keys::currency_design(&cid), design.into(), 0);
        store.insert(design_state.clone());

        let currency_pool = Arc::new(CurrencyPool::new());
        currency_pool.set(&design_state).unwrap();

        let suffrage_node = NovaKeypair::from_seed(&[200u8; 32]);
        let suffrage = Arc::new(Suffrage::new(vec![suffrage_node.public_key()], 100).unwrap());

        Self {
            network_id: NETWORK_ID.to_vec(),
            currency_pool,
            pool: StatePool::new(store.clone(), 1),
            store,
            sender,
            sender_address,
            fee_receiver,
            cid,
            suffrage_node,
            suffrage,
            tokens: AtomicU64::new(0),
        }
    }

    fn next_token(&self) -> Vec<u8> {
        let n = self.tokens.fetch_add(1, Ordering::Relaxed);
        format!("token-{n}").into_bytes()
    }

    fn amount(&self, v: i64) -> Amount {
        Amount::new(Big::new(v), self.cid.clone())
    }

    // -- accounts ----------------------------------------------------------

    pub fn add_account(&self, seed: u8, balance: i64) -> (NovaKeypair, Address) {
        let (kp, address) = self.add_account_without_balance(seed);
        seed_balance(&self.store, &address, &self.cid, balance);
        (kp, address)
    }

    pub fn add_account_without_balance(&self, seed: u8) -> (NovaKeypair, Address) {
        let address = seed_account(&self.store, single_keys(seed));
        (NovaKeypair::from_seed(&[seed; 32]), address)
    }

    /// Seed the fixture currency's zero account as registration leaves it.
    pub fn add_zero_account(&self) -> Address {
        let zero = Address::zero(&self.cid);
        self.store
            .insert(State::new(keys::account(&zero), Account::zero(&self.cid).into(), 0));
        seed_balance(&self.store, &zero, &self.cid, 0);
        zero
    }

    pub fn sender_keys(&self) -> AccountKeys {
        single_keys(1)
    }

    pub fn balance(&self, address: &Address) -> Big {
        self.balance_of(address, &self.cid)
    }

    /// Current balance as seen through the pool; zero when never written.
    pub fn balance_of(&self, address: &Address, cid: &CurrencyId) -> Big {
        self.pool
            .get_state(&keys::balance(address, cid))
            .unwrap()
            .and_then(|st| st.balance_value().ok().map(|am| am.big().clone()))
            .unwrap_or_else(Big::zero)
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.pool
            .get_state(&keys::account(address))
            .unwrap()
            .and_then(|st| st.account_value().ok().cloned())
    }

    pub fn design(&self, cid: &CurrencyId) -> Option<CurrencyDesign> {
        self.pool
            .get_state(&keys::currency_design(cid))
            .unwrap()
            .and_then(|st| st.currency_design_value().ok().cloned())
    }

    // -- account operations ------------------------------------------------

    /// Create the account of `single_keys(50)` funded with `amount`.
    pub fn create_account(&self, amount: i64) -> (Operation, Address) {
        let token = self.next_token();
        self.create_account_with_token(amount, &token)
    }

    pub fn create_account_with_token(&self, amount: i64, token: &[u8]) -> (Operation, Address) {
        self.create_account_from(&self.sender, &self.sender_address, amount, token)
    }

    /// Create the account of `single_keys(50)` out of `sender`.
    pub fn create_account_from(
        &self,
        signer: &NovaKeypair,
        sender: &Address,
        amount: i64,
        token: &[u8],
    ) -> (Operation, Address) {
        let keys = single_keys(50);
        let target = Address::from_keys(&keys);
        let fact = CreateAccountsFact::new(
            token.to_vec(),
            sender.clone(),
            vec![CreateAccountsItem::new(keys, vec![self.amount(amount)])],
        );
        let op = CreateAccounts::sign(fact, &[signer], &self.network_id);
        (op.into(), target)
    }

    pub fn transfer(&self, items: &[(&Address, i64)]) -> Operation {
        self.transfer_signed_by(&self.sender, items)
    }

    pub fn transfer_signed_by(&self, signer: &NovaKeypair, items: &[(&Address, i64)]) -> Operation {
        self.transfer_signed_by_account(signer, &self.sender_address, items)
    }

    /// Transfer out of `sender`, signed by `signer`.
    pub fn transfer_signed_by_account(
        &self,
        signer: &NovaKeypair,
        sender: &Address,
        items: &[(&Address, i64)],
    ) -> Operation {
        let items = items
            .iter()
            .map(|(receiver, v)| TransfersItem::new((*receiver).clone(), vec![self.amount(*v)]))
            .collect();
        let fact = TransfersFact::new(self.next_token(), sender.clone(), items);
        Transfers::sign(fact, &[signer], &self.network_id).into()
    }

    pub fn update_keys(&self, keys: AccountKeys) -> Operation {
        let fact = KeyUpdaterFact::new(
            self.next_token(),
            self.sender_address.clone(),
            keys,
            self.cid.clone(),
        );
        KeyUpdater::sign(fact, &[&self.sender], &self.network_id).into()
    }

    // -- governance operations ---------------------------------------------

    /// Register `cid` with the sender as genesis account and a nil fee.
    pub fn register_currency(&self, cid: &str, amount: i64) -> Operation {
        self.register_currency_signed_by(&self.suffrage_node, cid, amount)
    }

    pub fn register_currency_signed_by(
        &self,
        signer: &NovaKeypair,
        cid: &str,
        amount: i64,
    ) -> Operation {
        let design = CurrencyDesign::new(
            Amount::new(Big::new(amount), CurrencyId::new(cid).unwrap()),
            Some(self.sender_address.clone()),
            CurrencyPolicy::new(Big::zero(), Feeer::Nil),
        );
        let fact = CurrencyRegisterFact::new(self.next_token(), design);
        CurrencyRegister::sign(fact, &[signer], &self.network_id).into()
    }

    pub fn update_policy(&self, cid: &str, min: Big, feeer: Feeer) -> Operation {
        let fact = CurrencyPolicyUpdaterFact::new(
            self.next_token(),
            CurrencyId::new(cid).unwrap(),
            CurrencyPolicy::new(min, feeer),
        );
        CurrencyPolicyUpdater::sign(fact, &[&self.suffrage_node], &self.network_id).into()
    }

    pub fn inflate(&self, items: &[(&Address, i64)]) -> Operation {
        let items = items
            .iter()
            .map(|(receiver, v)| SuffrageInflationItem::new((*receiver).clone(), self.amount(*v)))
            .collect();
        let fact = SuffrageInflationFact::new(self.next_token(), items);
        SuffrageInflation::sign(fact, &[&self.suffrage_node], &self.network_id).into()
    }
}

fn seed_account(store: &MemoryStateStore, account_keys: AccountKeys) -> Address {
    let account = Account::from_keys(account_keys);
    let address = account.address().clone();
    store.insert(State::new(keys::account(&address), account.into(), 0));
    address
}

fn seed_balance(store: &MemoryStateStore, address: &Address, cid: &CurrencyId, v: i64) {
    let amount = Amount::new(Big::new(v), cid.clone());
    store.insert(State::new(keys::balance(address, cid), amount.into(), 0));
}
