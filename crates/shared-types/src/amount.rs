//! # Fixed-Point Amounts
//!
//! Balances are non-negative fixed-point numbers: an unsigned 256-bit integer
//! value plus a decimal scale. The scale of every balance row must equal the
//! precision declared by its asset, so arithmetic is only defined between
//! amounts of the same scale.
//!
//! ## Type Decisions
//!
//! - `value: U256` - non-negative by construction; wide enough that overflow
//!   only occurs on adversarial input, where the checked operations turn it
//!   into a command failure rather than wraparound.
//! - `scale: u8` - decimal digits to the right of the point, 0..=255.

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing decimal literals.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// The literal contained a non-digit character.
    #[error("Invalid character in amount literal '{0}'")]
    InvalidCharacter(String),

    /// The literal was empty or just a decimal point.
    #[error("Empty amount literal")]
    Empty,

    /// More fractional digits than a u8 scale can carry.
    #[error("Scale overflow in amount literal '{0}'")]
    ScaleOverflow(String),

    /// The integral value exceeds 256 bits.
    #[error("Value overflow in amount literal '{0}'")]
    ValueOverflow(String),
}

/// A non-negative fixed-point number: `value * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    value: U256,
    scale: u8,
}

impl Amount {
    /// Create an amount from a raw integer value and scale.
    #[must_use]
    pub fn new(value: U256, scale: u8) -> Self {
        Self { value, scale }
    }

    /// The zero amount at the given scale.
    #[must_use]
    pub fn zero(scale: u8) -> Self {
        Self {
            value: U256::zero(),
            scale,
        }
    }

    /// Raw integer value.
    #[must_use]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Decimal scale (digits right of the point).
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// True if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Checked addition. `None` on scale mismatch or 256-bit overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        if self.scale != other.scale {
            return None;
        }
        self.value.checked_add(other.value).map(|value| Amount {
            value,
            scale: self.scale,
        })
    }

    /// Checked subtraction. `None` on scale mismatch or underflow below zero.
    #[must_use]
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.scale != other.scale {
            return None;
        }
        self.value.checked_sub(other.value).map(|value| Amount {
            value,
            scale: self.scale,
        })
    }

    /// Re-express this amount at a coarser-or-equal target scale.
    ///
    /// Widening `"1"` (scale 0) to scale 1 yields value 10 (`"1.0"`).
    /// Returns `None` when the target is narrower than the current scale or
    /// the value would overflow.
    #[must_use]
    pub fn rescale(&self, target: u8) -> Option<Amount> {
        if target < self.scale {
            return None;
        }
        let mut value = self.value;
        for _ in self.scale..target {
            value = value.checked_mul(U256::from(10u8))?;
        }
        Some(Amount {
            value,
            scale: target,
        })
    }
}

impl PartialOrd for Amount {
    /// Amounts of different scales are incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.scale != other.scale {
            return None;
        }
        Some(self.value.cmp(&other.value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }
        let digits = self.value.to_string();
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{digits:0>width$}", width = scale)
        }
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parse a decimal literal; the scale is the number of fractional digits
    /// as written, so `"1.0"` and `"1"` parse to different scales.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountParseError::InvalidCharacter(s.to_owned()));
        }
        let scale = u8::try_from(frac_part.len())
            .map_err(|_| AmountParseError::ScaleOverflow(s.to_owned()))?;
        let mut value = U256::zero();
        for b in int_part.bytes().chain(frac_part.bytes()) {
            value = value
                .checked_mul(U256::from(10u8))
                .and_then(|v| v.checked_add(U256::from(b - b'0')))
                .ok_or_else(|| AmountParseError::ValueOverflow(s.to_owned()))?;
        }
        Ok(Self { value, scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let a: Amount = "1.0".parse().unwrap();
        assert_eq!(a.value(), U256::from(10u8));
        assert_eq!(a.scale(), 1);
        assert_eq!(a.to_string(), "1.0");

        let b: Amount = "0.05".parse().unwrap();
        assert_eq!(b.value(), U256::from(5u8));
        assert_eq!(b.to_string(), "0.05");

        let c: Amount = "7".parse().unwrap();
        assert_eq!(c.scale(), 0);
        assert_eq!(c.to_string(), "7");
    }

    #[test]
    fn add_then_sub_restores_prior_balance() {
        let prior: Amount = "10.00".parse().unwrap();
        let x: Amount = "3.25".parse().unwrap();
        let after = prior.checked_add(&x).unwrap().checked_sub(&x).unwrap();
        assert_eq!(after, prior);
    }

    #[test]
    fn mismatched_scales_do_not_combine() {
        let a: Amount = "1.0".parse().unwrap();
        let b: Amount = "1".parse().unwrap();
        assert!(a.checked_add(&b).is_none());
        assert!(a.partial_cmp(&b).is_none());
        assert_eq!(b.rescale(1).unwrap(), a);
    }

    #[test]
    fn subtraction_below_zero_fails() {
        let a: Amount = "1.0".parse().unwrap();
        let b: Amount = "2.0".parse().unwrap();
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn overflow_is_detected() {
        let max = Amount::new(U256::MAX, 0);
        let one = Amount::new(U256::one(), 0);
        assert!(max.checked_add(&one).is_none());
    }
}
