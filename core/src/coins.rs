//! Fixed-point in-game currency.

use std::fmt;

use serde::{Deserialize, Serialize};

const HUNDREDTHS_PER_COIN: u64 = 100;

/// Amount of in-game currency measured in hundredths of a coin.
///
/// Balances are unsigned, so a ledger built on `Coins` cannot represent a
/// negative balance. Fractional rewards produced by difficulty scaling are
/// rounded to the nearest hundredth when converted from floating point.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Coins(u64);

impl Coins {
    /// Zero coins.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a whole number of coins.
    #[must_use]
    pub const fn from_whole(coins: u64) -> Self {
        Self(coins.saturating_mul(HUNDREDTHS_PER_COIN))
    }

    /// Creates an amount from a raw number of hundredths.
    #[must_use]
    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// Converts a floating point coin amount, rounding to the nearest hundredth.
    ///
    /// Negative and non-finite inputs collapse to zero.
    #[must_use]
    pub fn from_f32(amount: f32) -> Self {
        let scaled = (f64::from(amount) * HUNDREDTHS_PER_COIN as f64).round();
        if !scaled.is_finite() || scaled <= 0.0 {
            return Self::ZERO;
        }
        if scaled >= u64::MAX as f64 {
            return Self(u64::MAX);
        }
        Self(scaled as u64)
    }

    /// Raw number of hundredths stored in the amount.
    #[must_use]
    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Lossy floating point view of the amount, in whole coins.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / HUNDREDTHS_PER_COIN as f64
    }

    /// Reports whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtracts `other`, returning `None` when the result would be negative.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Adds `other`, clamping at the maximum representable amount.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies the amount by an integer factor, clamping on overflow.
    #[must_use]
    pub const fn saturating_mul(self, factor: u32) -> Self {
        Self(self.0.saturating_mul(factor as u64))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / HUNDREDTHS_PER_COIN,
            self.0 % HUNDREDTHS_PER_COIN
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Coins;

    #[test]
    fn scaled_reward_rounds_to_hundredths() {
        let reward = Coins::from_f32(10.0 * (1.0 + 0.05));
        assert_eq!(reward, Coins::from_hundredths(1050));
        assert_eq!(reward.to_string(), "10.50");
    }

    #[test]
    fn negative_and_nan_amounts_collapse_to_zero() {
        assert_eq!(Coins::from_f32(-3.0), Coins::ZERO);
        assert_eq!(Coins::from_f32(f32::NAN), Coins::ZERO);
    }

    #[test]
    fn checked_sub_refuses_overdraft() {
        let balance = Coins::from_whole(20);
        assert_eq!(balance.checked_sub(Coins::from_whole(25)), None);
        assert_eq!(
            balance.checked_sub(Coins::from_whole(5)),
            Some(Coins::from_whole(15))
        );
    }

    #[test]
    fn upgrade_cost_scales_with_level() {
        assert_eq!(Coins::from_whole(50).saturating_mul(3), Coins::from_whole(150));
    }
}
