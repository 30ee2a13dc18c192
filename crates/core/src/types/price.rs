//! Type-safe price representation using decimal arithmetic.
//!
//! Prices in the source spreadsheet are typed by hand, so besides the strict
//! constructor there is a loose parser that tolerates thousands separators and
//! Arabic-Indic digits.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty or only whitespace.
    #[error("price is empty")]
    Empty,
    /// The input is not a number.
    #[error("price is not a number: {0}")]
    Invalid(String),
    /// The input is a number below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit price.
///
/// The currency is not part of the value: a catalog is priced in a single
/// currency, and its label only matters when the order message is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero, used for rows whose price could not be read.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse a hand-typed price.
    ///
    /// Whitespace and thousands separators (`,` and `٬`) are ignored and
    /// Arabic-Indic digits are read as their ASCII equivalents, so `"1,250"`
    /// and `"١٢٥٠"` both parse to 1250.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, or negative.
    pub fn parse_loose(s: &str) -> Result<Self, PriceError> {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '٬')
            .map(|c| match c {
                '٠'..='٩' => char::from(b'0' + digit_offset(c, '٠')),
                '۰'..='۹' => char::from(b'0' + digit_offset(c, '۰')),
                '٫' => '.',
                other => other,
            })
            .collect();

        if cleaned.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .map_err(|_| PriceError::Invalid(s.trim().to_owned()))?;
        Self::new(amount)
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the cost of `quantity` units at this price, or `None` if it
    /// does not fit in a `Decimal`.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Decimal> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(|cost| cost.normalize())
    }
}

/// Position of `c` within the ten-character digit block starting at `zero`.
fn digit_offset(c: char, zero: char) -> u8 {
    u8::try_from(u32::from(c) - u32::from(zero)).unwrap_or(0)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_loose(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
