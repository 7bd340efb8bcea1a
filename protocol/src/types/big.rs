//! # Arbitrary-Precision Balances
//!
//! [`Big`] is the integer every balance, fee and supply is expressed in.
//! It is a signed, arbitrary-precision value with value semantics: every
//! operation returns a new `Big` and never panics. There is no overflow to
//! check for, which is the whole point.
//!
//! ## The nil marker
//!
//! `Big::nil()` is `-1`. It marks "absent / unlimited" in places where a
//! balance-like field is optional, most notably the `max` of a ratio fee
//! policy. Real balances are never negative, so any negative value is
//! "under nil" as far as validity checks are concerned and the marker can
//! not be confused with a legitimate amount.
//!
//! ## Division and floats
//!
//! [`Big::div`] truncates toward zero. [`Big::mul_float64`] multiplies by the
//! exact binary value of the `f64` and truncates toward zero as well; it is
//! used only for ratio fees, and the truncation is part of the fee contract.

use num_bigint::{BigInt, Sign};
use num_traits::float::FloatCore;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::error::ValidationError;

/// Signed arbitrary-precision integer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Big(BigInt);

impl Big {
    /// Build from an `i64`.
    pub fn new(v: i64) -> Self {
        Self(BigInt::from(v))
    }

    /// Zero.
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// The nil marker (`-1`).
    pub fn nil() -> Self {
        Self(BigInt::from(-1))
    }

    /// Parse a base-10 integer with an optional leading `-`.
    ///
    /// Anything else (whitespace, `+`, underscores, hex) is
    /// [`ValidationError::InvalidFormat`].
    pub fn from_string(s: &str) -> Result<Self, ValidationError> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat(format!(
                "not a base-10 integer: {s:?}"
            )));
        }
        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidFormat(format!("not a base-10 integer: {s:?}")))
    }

    pub fn add(&self, other: &Big) -> Big {
        Big(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Big) -> Big {
        Big(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Big) -> Big {
        Big(&self.0 * &other.0)
    }

    pub fn mul_int64(&self, v: i64) -> Big {
        Big(&self.0 * BigInt::from(v))
    }

    /// Multiply by `f` and truncate toward zero.
    ///
    /// The `f64` is decomposed into `mantissa * 2^exponent` so the product is
    /// exact before truncation. Non-finite factors yield [`Big::nil`].
    pub fn mul_float64(&self, f: f64) -> Big {
        if !f.is_finite() {
            return Big::nil();
        }
        let (mantissa, exponent, sign) = FloatCore::integer_decode(f);
        let mut product = &self.0 * BigInt::from(mantissa);
        if sign < 0 {
            product = -product;
        }
        if exponent >= 0 {
            Big(product << (exponent as usize))
        } else {
            // BigInt division truncates toward zero.
            Big(product / (BigInt::one() << ((-exponent) as usize)))
        }
    }

    /// Truncating division. Division by zero yields [`Big::nil`].
    pub fn div(&self, other: &Big) -> Big {
        if other.0.is_zero() {
            return Big::nil();
        }
        Big(&self.0 / &other.0)
    }

    pub fn neg(&self) -> Big {
        Big(-&self.0)
    }

    pub fn compare(&self, other: &Big) -> Ordering {
        self.0.cmp(&other.0)
    }

    pub fn equal(&self, other: &Big) -> bool {
        self.0 == other.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `> 0`
    pub fn over_zero(&self) -> bool {
        self.0.is_positive()
    }

    /// `> nil`, i.e. `>= 0`.
    pub fn over_nil(&self) -> bool {
        !self.0.is_negative()
    }

    /// Exactly the nil marker.
    pub fn is_nil(&self) -> bool {
        self.0 == BigInt::from(-1)
    }

    /// Canonical bytes for hashing: sign byte followed by big-endian
    /// magnitude.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (sign, mut magnitude) = self.0.to_bytes_be();
        let mut out = Vec::with_capacity(magnitude.len() + 1);
        out.push(match sign {
            Sign::Minus => 0x2d,
            _ => 0x2b,
        });
        out.append(&mut magnitude);
        out
    }
}

impl Default for Big {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Big {
    fn from(v: i64) -> Self {
        Self::new(v)
    }
}

impl fmt::Display for Big {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Big {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Big({})", self.0)
    }
}

impl Serialize for Big {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Big {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Big::from_string(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> Big {
        Big::from_string(s).unwrap()
    }

    #[test]
    fn string_roundtrip_including_extremes() {
        for s in [
            "0",
            "1",
            "-1",
            "9223372036854775807",
            "-9223372036854775808",
            "18446744073709551616",
            "340282366920938463463374607431768211457",
            "-115792089237316195423570985008687907853269984665640564039457584007913129639936",
        ] {
            assert_eq!(big(s).to_string(), s);
        }
    }

    #[test]
    fn non_decimal_input_rejected() {
        for s in ["", "-", "0x10", "1_000", "+5", " 5", "1.5", "abc"] {
            assert!(
                matches!(Big::from_string(s), Err(ValidationError::InvalidFormat(_))),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn arithmetic_is_immutable() {
        let a = Big::new(10);
        let b = Big::new(3);
        assert_eq!(a.add(&b), Big::new(13));
        assert_eq!(a.sub(&b), Big::new(7));
        assert_eq!(a.mul(&b), Big::new(30));
        assert_eq!(a.mul_int64(-2), Big::new(-20));
        assert_eq!(a.neg(), Big::new(-10));
        assert_eq!(a, Big::new(10));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(Big::new(7).div(&Big::new(2)), Big::new(3));
        assert_eq!(Big::new(-7).div(&Big::new(2)), Big::new(-3));
        assert!(Big::new(7).div(&Big::zero()).is_nil());
    }

    #[test]
    fn mul_float64_truncates_toward_zero() {
        assert_eq!(Big::new(10).mul_float64(0.5), Big::new(5));
        assert_eq!(Big::new(10).mul_float64(0.01), Big::new(0));
        assert_eq!(Big::new(20).mul_float64(0.99), Big::new(19));
        assert_eq!(Big::new(-20).mul_float64(0.99), Big::new(-19));
        assert_eq!(Big::new(3).mul_float64(0.0), Big::zero());
        assert!(Big::new(3).mul_float64(f64::NAN).is_nil());
    }

    #[test]
    fn mul_float64_beyond_64_bits() {
        let huge = big("100000000000000000000000000000000");
        assert_eq!(
            huge.mul_float64(0.5).to_string(),
            "50000000000000000000000000000000"
        );
    }

    #[test]
    fn sign_predicates() {
        assert!(Big::new(1).over_zero());
        assert!(!Big::zero().over_zero());
        assert!(Big::zero().over_nil());
        assert!(!Big::nil().over_nil());
        assert!(Big::nil().is_nil());
        assert!(!Big::new(-2).is_nil());
        assert!(Big::zero().is_zero());
    }

    #[test]
    fn compare_and_equal() {
        assert_eq!(Big::new(5).compare(&Big::new(10)), Ordering::Less);
        assert!(Big::new(5).equal(&big("5")));
    }

    #[test]
    fn serde_as_decimal_string() {
        let v = big("123456789012345678901234567890");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"123456789012345678901234567890\"");
        let back: Big = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Big>("\"12a\"").is_err());
    }

    #[test]
    fn canonical_bytes_distinguish_sign() {
        assert_ne!(Big::new(5).to_bytes(), Big::new(-5).to_bytes());
    }
}
