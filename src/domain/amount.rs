//! PYUSD amounts in micro-units.
//!
//! [`Amount`] stores a token quantity as an integer count of the smallest
//! unit (PYUSD has 6 decimals) so stake arithmetic never touches floats.
//! Amounts cross the payment gateway boundary as decimal strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LotteryError;

/// Number of decimal places used by PYUSD.
pub const DECIMALS: u32 = 6;

const UNIT: u128 = 10u128.pow(DECIMALS);

/// A non-negative PYUSD amount in micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw micro-unit count.
    #[must_use]
    pub const fn from_micros(micros: u128) -> Self {
        Self(micros)
    }

    /// Creates an amount from a whole number of tokens.
    #[must_use]
    pub const fn from_whole(tokens: u64) -> Self {
        Self(tokens as u128 * UNIT)
    }

    /// Returns the raw micro-unit count.
    #[must_use]
    pub const fn micros(&self) -> u128 {
        self.0
    }

    /// Multiplies by a count, saturating at `u128::MAX`.
    #[must_use]
    pub fn saturating_mul(self, count: usize) -> Self {
        Self(self.0.saturating_mul(count as u128))
    }

    /// Adds two amounts, saturating at `u128::MAX`.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, returning `None` on underflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl FromStr for Amount {
    type Err = LotteryError;

    /// Parses a decimal string such as `"1"`, `"12.5"` or `"0.000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || LotteryError::InvalidRequest(format!("invalid amount: {s:?}"));

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_digits = if frac.is_empty() {
            0
        } else {
            frac.parse::<u128>().map_err(|_| invalid())?
        };
        let scale = 10u128.pow(DECIMALS - frac.len() as u32);

        whole
            .checked_mul(UNIT)
            .and_then(|w| w.checked_add(frac_digits * scale))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Amount {
        let Ok(amount) = s.parse::<Amount>() else {
            panic!("expected {s:?} to parse");
        };
        amount
    }

    #[test]
    fn parses_whole_and_fractional_values() {
        assert_eq!(parse("1"), Amount::from_whole(1));
        assert_eq!(parse("12.5"), Amount::from_micros(12_500_000));
        assert_eq!(parse("0.000001"), Amount::from_micros(1));
        assert_eq!(parse(".5"), Amount::from_micros(500_000));
        assert_eq!(parse(" 100 "), Amount::from_whole(100));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", ".", "-1", "1.2.3", "abc", "1.0000001", "1e6"] {
            assert!(bad.parse::<Amount>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Amount::from_whole(100).to_string(), "100");
        assert_eq!(Amount::from_micros(12_500_000).to_string(), "12.5");
        assert_eq!(Amount::from_micros(1).to_string(), "0.000001");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn ordering_follows_value() {
        assert!(parse("0.999999") < Amount::from_whole(1));
        assert!(parse("1.000001") > Amount::from_whole(1));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::from_micros(1_500_000)).unwrap_or_default();
        assert_eq!(json, "\"1.5\"");
    }

    #[test]
    fn stake_total_multiplies_entries() {
        assert_eq!(Amount::from_whole(1).saturating_mul(14), Amount::from_whole(14));
        assert_eq!(
            Amount::from_whole(3).checked_sub(Amount::from_whole(1)),
            Some(Amount::from_whole(2))
        );
        assert_eq!(Amount::ZERO.checked_sub(Amount::from_whole(1)), None);
    }
}
