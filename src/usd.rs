use rust_decimal::{Decimal, RoundingStrategy};
use serde_with::SerializeDisplay;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{AddAssign, Mul},
    str::FromStr,
};

use crate::error::Error;

/// Represents an amount of money in USD currency.
///
/// The amount is held as an exact decimal. Parsing rounds to whole cents
/// (half away from zero), so a parsed price is exactly what gets written
/// back out; products and sums of such amounts are exact too. The
/// [`Display`] implementation formats it as dollars to 2 decimal places, and
/// honours width and alignment flags, so `format!("{amount:>12}")`
/// right-aligns it.
#[derive(Clone, Copy, Default, SerializeDisplay, Eq, PartialEq, Ord, PartialOrd)]
pub struct Usd(Decimal);

/// The largest unit price the ledger accepts, in whole dollars.
///
/// Keeps `u32::MAX` units at this price, and any sum of such amounts that
/// fits in memory, within [`Decimal`]'s range.
pub const MAX_PRICE_DOLLARS: i64 = 1_000_000_000;

impl Usd {
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Whether this is more than [`MAX_PRICE_DOLLARS`].
    #[must_use]
    pub fn exceeds_max_price(&self) -> bool {
        self.0 > Decimal::from(MAX_PRICE_DOLLARS)
    }

    /// Creates an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }
}

/// Shows the exact amount, unrounded.
impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dollars = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        dollars.rescale(2);
        f.pad(&dollars.to_string())
    }
}

impl FromStr for Usd {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .replace(',', "")
            .parse::<Decimal>()
            .map(|d| Self(d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)))
            .map_err(|_| Error::NumericParse {
                field: "unit_price",
                value: s.to_string(),
            })
    }
}

impl AddAssign for Usd {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Usd {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut total, amount| {
            total += amount;
            total
        })
    }
}
