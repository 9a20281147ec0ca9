//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Print pricing is a chain of fractional steps:                          │
//! │    (400 W / 1000) × (120 min / 60) × 907 per kWh = 725.6                │
//! │    30% of 7225.6 = 2167.68                                              │
//! │                                                                         │
//! │  In f64 these drift (0.1 + 0.2 = 0.30000000000000004) and a report      │
//! │  recomputed twice could disagree with itself in the last digit.         │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Base-10 arithmetic, exact for every constant in the formulas, so     │
//! │    recomputing a stored quotation always yields identical figures.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Currency is a single implicit unit. Rounding for display (the shop
//! quotes whole pesos) happens in the presentation layer.
//!
//! Arithmetic saturates at `Decimal::MAX`/`Decimal::MIN` instead of
//! panicking, so pricing stays infallible for any non-negative input.
//!
//! ## Usage
//! ```rust
//! use morfika_core::money::Money;
//! use rust_decimal_macros::dec;
//!
//! let spool = Money::new(dec!(70000));
//! let per_gram = spool / dec!(1000);
//! assert_eq!(per_gram.amount(), dec!(70));
//! assert_eq!((per_gram * dec!(50)).amount(), dec!(3500));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the shop's single currency unit.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values appear only in profit figures
/// - **Newtype**: keeps prices and quantities (grams, minutes) apart at
///   the type level, so `mass_grams + material_cost` does not compile
/// - **Serde**: serialized as a decimal string, never a float
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a Money value from a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from a whole number of currency units.
    ///
    /// ## Example
    /// ```rust
    /// use morfika_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::from_units(20000).amount(), dec!(20000));
    /// ```
    #[inline]
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to whole currency units (banker's rounding).
    ///
    /// ## Example
    /// ```rust
    /// use morfika_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::new(dec!(14747.4496)).rounded().amount(), dec!(14747));
    /// ```
    pub fn rounded(&self) -> Money {
        Money(self.0.round())
    }

    /// Applies a fractional discount (`0.10` = 10% off).
    ///
    /// ## Example
    /// ```rust
    /// use morfika_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// let gross = Money::new(dec!(100000));
    /// assert_eq!(gross.apply_discount(dec!(0.05)).amount(), dec!(95000));
    /// ```
    pub fn apply_discount(&self, rate: Decimal) -> Money {
        Money(self.0.saturating_mul(Decimal::ONE.saturating_sub(rate)))
    }
}

/// `a / b`, clamped to the representable range. Division by zero
/// saturates toward the sign of `a`.
pub fn saturating_div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b).unwrap_or_else(|| {
        if a.is_zero() {
            Decimal::ZERO
        } else if a.is_sign_negative() == b.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals. For debugging and logs; the UI
/// handles locale formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Scaling by a quantity (grams, minutes, rates).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0.saturating_mul(factor))
    }
}

/// Splitting a price into a per-unit price (per gram, per ml).
impl Div<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn div(self, divisor: Decimal) -> Self {
        Money(saturating_div(self.0, divisor))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
