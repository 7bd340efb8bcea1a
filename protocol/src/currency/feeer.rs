//! # Fee Policies
//!
//! A [`Feeer`] turns "amount moved" into "fee owed" and names who receives
//! the fee. Three policies exist:
//!
//! | Policy  | Fee                                               |
//! |---------|---------------------------------------------------|
//! | `Nil`   | always zero, no receiver                          |
//! | `Fixed` | a constant; a zero constant is a true no-op       |
//! | `Ratio` | `trunc(amount * ratio)`, floored at `min`, capped at `max` |
//!
//! Ratio fees use [`Big::mul_float64`], which truncates toward zero. A
//! `max` equal to [`Big::nil`] means "no cap". The two degenerate ratios
//! short-circuit: `0` is always free, `1` charges exactly the amount moved
//! and ignores `min`/`max`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{Address, Big};

/// Hint strings identifying each policy in encoded form.
pub const NIL_FEEER_HINT: &str = "nova-currency-nil-feeer";
pub const FIXED_FEEER_HINT: &str = "nova-currency-fixed-feeer";
pub const RATIO_FEEER_HINT: &str = "nova-currency-ratio-feeer";

/// A fee policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feeer {
    Nil,
    Fixed(FixedFeeer),
    Ratio(RatioFeeer),
}

impl Feeer {
    /// Fee owed for moving `amount`.
    pub fn fee(&self, amount: &Big) -> Big {
        match self {
            Feeer::Nil => Big::zero(),
            Feeer::Fixed(f) => f.fee(),
            Feeer::Ratio(r) => r.fee(amount),
        }
    }

    /// Smallest fee this policy ever charges for a non-degenerate amount.
    pub fn min(&self) -> Big {
        match self {
            Feeer::Nil => Big::zero(),
            Feeer::Fixed(f) => f.amount.clone(),
            Feeer::Ratio(r) => r.min.clone(),
        }
    }

    /// Where collected fees go. `None` means fees are burned.
    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Feeer::Nil => None,
            Feeer::Fixed(f) => Some(&f.receiver),
            Feeer::Ratio(r) => Some(&r.receiver),
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Feeer::Nil => NIL_FEEER_HINT,
            Feeer::Fixed(_) => FIXED_FEEER_HINT,
            Feeer::Ratio(_) => RATIO_FEEER_HINT,
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        match self {
            Feeer::Nil => Ok(()),
            Feeer::Fixed(f) => f.is_valid(),
            Feeer::Ratio(r) => r.is_valid(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.hint().as_bytes().to_vec();
        buf.push(0x00);
        match self {
            Feeer::Nil => {}
            Feeer::Fixed(f) => {
                buf.extend_from_slice(&f.receiver.to_bytes());
                buf.push(0x00);
                buf.extend_from_slice(&f.amount.to_bytes());
            }
            Feeer::Ratio(r) => {
                buf.extend_from_slice(&r.receiver.to_bytes());
                buf.push(0x00);
                buf.extend_from_slice(&r.ratio.to_bits().to_be_bytes());
                buf.extend_from_slice(&r.min.to_bytes());
                buf.push(0x00);
                buf.extend_from_slice(&r.max.to_bytes());
            }
        }
        buf
    }
}

// ---------------------------------------------------------------------------
// FixedFeeer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFeeer {
    receiver: Address,
    amount: Big,
}

impl FixedFeeer {
    pub fn new(receiver: Address, amount: Big) -> Self {
        Self { receiver, amount }
    }

    fn fee(&self) -> Big {
        if self.amount.is_zero() {
            return Big::zero();
        }
        self.amount.clone()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.receiver.is_valid()?;
        if !self.amount.over_nil() {
            return Err(ValidationError::invalid(
                "fixed feeer",
                format!("fee amount under zero, {}", self.amount),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RatioFeeer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioFeeer {
    receiver: Address,
    ratio: f64,
    min: Big,
    max: Big,
}

impl RatioFeeer {
    /// `max` may be [`Big::nil`] for an uncapped fee.
    pub fn new(receiver: Address, ratio: f64, min: Big, max: Big) -> Self {
        Self {
            receiver,
            ratio,
            min,
            max,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    fn unlimited(&self) -> bool {
        self.max.is_nil()
    }

    fn fee(&self, amount: &Big) -> Big {
        if self.ratio == 0.0 {
            return Big::zero();
        }
        if self.ratio == 1.0 {
            return amount.clone();
        }

        let f = amount.mul_float64(self.ratio);
        if f.compare(&self.min).is_lt() {
            return self.min.clone();
        }
        if !self.unlimited() && f.compare(&self.max).is_gt() {
            return self.max.clone();
        }
        f
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.receiver.is_valid()?;
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(ValidationError::invalid(
                "ratio feeer",
                format!("ratio {} out of range 0..=1", self.ratio),
            ));
        }
        if !self.min.over_nil() {
            return Err(ValidationError::invalid(
                "ratio feeer",
                format!("min under zero, {}", self.min),
            ));
        }
        if !self.unlimited() {
            if !self.max.over_nil() {
                return Err(ValidationError::invalid(
                    "ratio feeer",
                    format!("max under zero, {}", self.max),
                ));
            }
            if self.min.compare(&self.max).is_gt() {
                return Err(ValidationError::invalid(
                    "ratio feeer",
                    format!("min over max, {} > {}", self.min, self.max),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> Address {
        Address::new("feereceivermca").unwrap()
    }

    fn ratio(r: f64, min: i64, max: Big) -> Feeer {
        Feeer::Ratio(RatioFeeer::new(receiver(), r, Big::new(min), max))
    }

    #[test]
    fn nil_feeer_is_free() {
        assert_eq!(Feeer::Nil.fee(&Big::new(1_000)), Big::zero());
        assert!(Feeer::Nil.receiver().is_none());
        assert!(Feeer::Nil.min().is_zero());
    }

    #[test]
    fn fixed_feeer() {
        let f = Feeer::Fixed(FixedFeeer::new(receiver(), Big::new(3)));
        assert_eq!(f.fee(&Big::new(1)), Big::new(3));
        assert_eq!(f.fee(&Big::zero()), Big::new(3));
        assert_eq!(f.receiver(), Some(&receiver()));

        let zero = Feeer::Fixed(FixedFeeer::new(receiver(), Big::zero()));
        assert_eq!(zero.fee(&Big::new(1_000)), Big::zero());
        assert!(zero.is_valid().is_ok());

        let under = Feeer::Fixed(FixedFeeer::new(receiver(), Big::nil()));
        assert!(under.is_valid().is_err());
    }

    #[test]
    fn ratio_half() {
        assert_eq!(ratio(0.5, 0, Big::nil()).fee(&Big::new(10)), Big::new(5));
    }

    #[test]
    fn ratio_min_floor_wins() {
        assert_eq!(ratio(0.01, 2, Big::nil()).fee(&Big::new(10)), Big::new(2));
    }

    #[test]
    fn ratio_max_cap_wins() {
        assert_eq!(
            ratio(0.99, 1, Big::new(10)).fee(&Big::new(20)),
            Big::new(10)
        );
    }

    #[test]
    fn ratio_unlimited_max_does_not_cap() {
        assert_eq!(
            ratio(0.99, 1, Big::nil()).fee(&Big::new(20)),
            Big::new(19)
        );
    }

    #[test]
    fn ratio_degenerate_values() {
        assert_eq!(ratio(0.0, 5, Big::nil()).fee(&Big::new(100)), Big::zero());
        assert_eq!(
            ratio(1.0, 5, Big::new(10)).fee(&Big::new(100)),
            Big::new(100)
        );
    }

    #[test]
    fn ratio_validity() {
        assert!(ratio(0.5, 0, Big::nil()).is_valid().is_ok());
        assert!(ratio(1.5, 0, Big::nil()).is_valid().is_err());
        assert!(ratio(-0.1, 0, Big::nil()).is_valid().is_err());
        assert!(ratio(0.5, -3, Big::nil()).is_valid().is_err());
        assert!(ratio(0.5, 0, Big::new(-3)).is_valid().is_err());
        assert!(ratio(0.5, 10, Big::new(5)).is_valid().is_err());
        assert!(ratio(f64::NAN, 0, Big::nil()).is_valid().is_err());
    }

    #[test]
    fn tagged_serde() {
        let f = Feeer::Fixed(FixedFeeer::new(receiver(), Big::new(3)));
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["type"], "fixed");
        let back: Feeer = serde_json::from_value(json).unwrap();
        assert_eq!(back, f);
    }
}
