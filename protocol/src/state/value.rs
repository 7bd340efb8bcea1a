//! Versioned key/value records.

use serde::{Deserialize, Serialize};

use super::StateError;
use crate::crypto::Hash;
use crate::currency::CurrencyDesign;
use crate::types::{Account, Amount};

/// Hint strings tagging each kind of stored value.
pub const ACCOUNT_STATE_VALUE_HINT: &str = "nova-currency-account-state-value";
pub const BALANCE_STATE_VALUE_HINT: &str = "nova-currency-balance-state-value";
pub const CURRENCY_DESIGN_STATE_VALUE_HINT: &str = "nova-currency-currency-design-state-value";

// ---------------------------------------------------------------------------
// StateValue
// ---------------------------------------------------------------------------

/// Everything the engine ever stores. The serde tag plays the role of a
/// type hint, so a stored value always decodes back to the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hint", content = "value")]
pub enum StateValue {
    #[serde(rename = "nova-currency-account-state-value")]
    Account(Account),
    #[serde(rename = "nova-currency-balance-state-value")]
    Balance(Amount),
    #[serde(rename = "nova-currency-currency-design-state-value")]
    CurrencyDesign(CurrencyDesign),
}

impl StateValue {
    pub fn hint(&self) -> &'static str {
        match self {
            StateValue::Account(_) => ACCOUNT_STATE_VALUE_HINT,
            StateValue::Balance(_) => BALANCE_STATE_VALUE_HINT,
            StateValue::CurrencyDesign(_) => CURRENCY_DESIGN_STATE_VALUE_HINT,
        }
    }

    pub fn is_currency_design(&self) -> bool {
        matches!(self, StateValue::CurrencyDesign(_))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.hint().as_bytes().to_vec();
        buf.push(0x00);
        match self {
            StateValue::Account(a) => buf.extend_from_slice(&a.to_bytes()),
            StateValue::Balance(a) => buf.extend_from_slice(&a.to_bytes()),
            StateValue::CurrencyDesign(d) => buf.extend_from_slice(&d.to_bytes()),
        }
        buf
    }
}

impl From<Account> for StateValue {
    fn from(a: Account) -> Self {
        StateValue::Account(a)
    }
}

impl From<Amount> for StateValue {
    fn from(a: Amount) -> Self {
        StateValue::Balance(a)
    }
}

impl From<CurrencyDesign> for StateValue {
    fn from(d: CurrencyDesign) -> Self {
        StateValue::CurrencyDesign(d)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One record of the ledger.
///
/// A state with no value is a *blank*: the key is known but nothing has
/// been written there yet. Processors stage blanks for balances and
/// accounts they are about to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    key: String,
    value: Option<StateValue>,
    hash: Hash,
    height: u64,
    previous_height: Option<u64>,
    operations: Vec<Hash>,
}

impl State {
    /// A state holding `value` at `height`, with no history.
    pub fn new(key: String, value: StateValue, height: u64) -> Self {
        let hash = state_hash(&key, Some(&value), height);
        Self {
            key,
            value: Some(value),
            hash,
            height,
            previous_height: None,
            operations: Vec::new(),
        }
    }

    /// A key with nothing stored under it yet.
    pub fn blank(key: String) -> Self {
        let hash = state_hash(&key, None, 0);
        Self {
            key,
            value: None,
            hash,
            height: 0,
            previous_height: None,
            operations: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&StateValue> {
        self.value.as_ref()
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Height at which the value this state replaced was written.
    pub fn previous_height(&self) -> Option<u64> {
        self.previous_height
    }

    /// Operations that wrote this state in its current block, in order.
    pub fn operations(&self) -> &[Hash] {
        &self.operations
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_none()
    }

    /// Same key and history, new value. Height and hash are restamped when
    /// the state pool commits it.
    pub fn with_value(&self, value: impl Into<StateValue>) -> Self {
        let value = value.into();
        Self {
            hash: state_hash(&self.key, Some(&value), self.height),
            value: Some(value),
            ..self.clone()
        }
    }

    /// The committed successor of this state: `value` written at `height`
    /// by operation `op`.
    pub(crate) fn succeed(&self, value: StateValue, height: u64, op: Hash) -> Self {
        let same_block = self.height == height && !self.operations.is_empty();
        let (previous_height, operations) = if same_block {
            let mut ops = self.operations.clone();
            if ops.last() != Some(&op) {
                ops.push(op);
            }
            (self.previous_height, ops)
        } else {
            let previous = self.value.as_ref().map(|_| self.height);
            (previous, vec![op])
        };

        Self {
            key: self.key.clone(),
            hash: state_hash(&self.key, Some(&value), height),
            value: Some(value),
            height,
            previous_height,
            operations,
        }
    }

    pub fn account_value(&self) -> Result<&Account, StateError> {
        match self.stored()? {
            StateValue::Account(a) => Ok(a),
            other => Err(self.mismatch(ACCOUNT_STATE_VALUE_HINT, other)),
        }
    }

    pub fn balance_value(&self) -> Result<&Amount, StateError> {
        match self.stored()? {
            StateValue::Balance(a) => Ok(a),
            other => Err(self.mismatch(BALANCE_STATE_VALUE_HINT, other)),
        }
    }

    pub fn currency_design_value(&self) -> Result<&CurrencyDesign, StateError> {
        match self.stored()? {
            StateValue::CurrencyDesign(d) => Ok(d),
            other => Err(self.mismatch(CURRENCY_DESIGN_STATE_VALUE_HINT, other)),
        }
    }

    fn stored(&self) -> Result<&StateValue, StateError> {
        self.value
            .as_ref()
            .ok_or_else(|| StateError::Blank(self.key.clone()))
    }

    fn mismatch(&self, expected: &'static str, found: &StateValue) -> StateError {
        StateError::ValueMismatch {
            key: self.key.clone(),
            expected,
            found: found.hint(),
        }
    }
}

fn state_hash(key: &str, value: Option<&StateValue>, height: u64) -> Hash {
    let mut buf = key.as_bytes().to_vec();
    buf.push(0x00);
    if let Some(v) = value {
        buf.extend_from_slice(&v.to_bytes());
    }
    buf.extend_from_slice(&height.to_be_bytes());
    Hash::blake3(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Big, CurrencyId};

    fn balance(v: i64) -> StateValue {
        StateValue::Balance(Amount::new(Big::new(v), CurrencyId::new("MONEY").unwrap()))
    }

    #[test]
    fn blank_state_has_no_value() {
        let st = State::blank("a-balance-MONEY".into());
        assert!(st.is_blank());
        assert!(matches!(st.balance_value(), Err(StateError::Blank(_))));
    }

    #[test]
    fn typed_accessor_mismatch() {
        let st = State::new("a-balance-MONEY".into(), balance(3), 1);
        assert!(st.balance_value().is_ok());
        assert!(matches!(
            st.account_value(),
            Err(StateError::ValueMismatch { expected: ACCOUNT_STATE_VALUE_HINT, .. })
        ));
    }

    #[test]
    fn succeed_tracks_history() {
        let st = State::new("k".into(), balance(1), 4);
        let op1 = Hash::blake3(b"op1");
        let op2 = Hash::blake3(b"op2");

        let next = st.succeed(balance(2), 5, op1);
        assert_eq!(next.height(), 5);
        assert_eq!(next.previous_height(), Some(4));
        assert_eq!(next.operations(), &[op1]);

        let again = next.succeed(balance(3), 5, op2);
        assert_eq!(again.previous_height(), Some(4));
        assert_eq!(again.operations(), &[op1, op2]);
        assert_ne!(again.hash(), next.hash());
    }

    #[test]
    fn blank_successor_has_no_previous_height() {
        let next = State::blank("k".into()).succeed(balance(1), 0, Hash::blake3(b"op"));
        assert_eq!(next.previous_height(), None);
        assert_eq!(next.operations().len(), 1);
    }

    #[test]
    fn hint_tagged_serde() {
        let st = State::new("k".into(), balance(7), 1);
        let json = serde_json::to_value(&st).unwrap();
        assert_eq!(json["value"]["hint"], BALANCE_STATE_VALUE_HINT);
        let back: State = serde_json::from_value(json).unwrap();
        assert_eq!(back, st);
    }
}
