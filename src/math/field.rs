use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use malachite::base::num::conversion::traits::RoundingFrom;
use malachite::base::rounding_modes::RoundingMode;
use malachite::rational::Rational;

/// An exact ordered number field.
///
/// Every predicate the flow engine relies on (colinearity, hitting a vertex,
/// closing up) is an exact comparison against zero, so implementors must not
/// round.
pub trait Field:
    Clone
    + Debug
    + Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Embeds an integer.
    fn from_integer(n: i64) -> Self;

    /// Nearest `f64`, for angle computations and display only.
    fn to_f64(&self) -> f64;

    /// Returns `true` if this is exactly zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Returns `true` if this is strictly greater than zero.
    fn is_positive(&self) -> bool {
        *self > Self::zero()
    }

    /// Returns `true` if this is strictly less than zero.
    fn is_negative(&self) -> bool {
        *self < Self::zero()
    }
}

impl Field for Rational {
    fn zero() -> Self {
        Rational::from(0i64)
    }

    fn one() -> Self {
        Rational::from(1i64)
    }

    fn from_integer(n: i64) -> Self {
        Rational::from(n)
    }

    fn to_f64(&self) -> f64 {
        f64::rounding_from(self, RoundingMode::Nearest).0
    }
}
