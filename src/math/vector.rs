use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::error::{GeometryError, Result};

use super::{ApproxVector2, Field};

/// A vector (or point) in the plane with exact coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vec2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Field> Vec2<F> {
    /// Creates a new vector.
    #[must_use]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(F::zero(), F::zero())
    }

    /// Creates a vector from integer coordinates.
    #[must_use]
    pub fn from_integers(x: i64, y: i64) -> Self {
        Self::new(F::from_integer(x), F::from_integer(y))
    }

    /// Returns `true` if both coordinates are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// The 2D cross product `self.x * other.y - self.y * other.x`.
    ///
    /// Positive when `other` is counter-clockwise from `self`.
    #[must_use]
    pub fn wedge(&self, other: &Self) -> F {
        self.x.clone() * other.y.clone() - self.y.clone() * other.x.clone()
    }

    /// The dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> F {
        self.x.clone() * other.x.clone() + self.y.clone() * other.y.clone()
    }

    /// Multiplies both coordinates by `s`.
    #[must_use]
    pub fn scale(&self, s: &F) -> Self {
        Self::new(self.x.clone() * s.clone(), self.y.clone() * s.clone())
    }

    /// Divides both coordinates by `s`.
    #[must_use]
    pub fn divided_by(&self, s: &F) -> Self {
        Self::new(self.x.clone() / s.clone(), self.y.clone() / s.clone())
    }

    /// Product of `self` and `other` read as complex numbers `x + iy`.
    #[must_use]
    pub fn complex_mul(&self, other: &Self) -> Self {
        Self::new(
            self.x.clone() * other.x.clone() - self.y.clone() * other.y.clone(),
            self.x.clone() * other.y.clone() + self.y.clone() * other.x.clone(),
        )
    }

    /// Quotient `self / other` read as complex numbers.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `other` is zero.
    pub fn complex_div(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        let norm = other.dot(other);
        let conj = Self::new(other.x.clone(), -other.y.clone());
        Ok(self.complex_mul(&conj).divided_by(&norm))
    }

    /// Nearest floating point vector.
    #[must_use]
    pub fn to_approx(&self) -> ApproxVector2 {
        ApproxVector2::new(self.x.to_f64(), self.y.to_f64())
    }
}

impl<F: Field> Add for Vec2<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<F: Field> Sub for Vec2<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<F: Field> Neg for Vec2<F> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<F: fmt::Display> fmt::Display for Vec2<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Returns `a` such that `v = a * u`.
///
/// # Errors
///
/// Returns [`GeometryError::NotColinear`] if `v` is not a multiple of `u`, and
/// [`GeometryError::ZeroVector`] if `u` is zero (and `v` is not obviously
/// off its line).
pub fn linearity_coefficient<F: Field>(u: &Vec2<F>, v: &Vec2<F>) -> Result<F> {
    if !u.x.is_zero() {
        let a = v.x.clone() / u.x.clone();
        if v.y != a.clone() * u.y.clone() {
            return Err(GeometryError::NotColinear.into());
        }
        Ok(a)
    } else if !v.x.is_zero() {
        Err(GeometryError::NotColinear.into())
    } else if !u.y.is_zero() {
        Ok(v.y.clone() / u.y.clone())
    } else {
        Err(GeometryError::ZeroVector.into())
    }
}

/// Returns `true` if `u` and `v` are positive multiples of each other.
#[must_use]
pub fn is_same_direction<F: Field>(u: &Vec2<F>, v: &Vec2<F>) -> bool {
    u.wedge(v).is_zero() && u.dot(v).is_positive()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FlatflowError;
    use crate::math::Rational;
    use proptest::prelude::*;

    type V = Vec2<Rational>;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_signeds(n, d)
    }

    #[test]
    fn linearity_coefficient_examples() {
        let c = |u: (i64, i64), v: (i64, i64)| {
            linearity_coefficient(&V::from_integers(u.0, u.1), &V::from_integers(v.0, v.1))
        };
        assert_eq!(c((1, 0), (2, 0)).unwrap(), q(2, 1));
        assert_eq!(c((2, 0), (1, 0)).unwrap(), q(1, 2));
        assert_eq!(c((0, 1), (0, 2)).unwrap(), q(2, 1));
        assert_eq!(c((0, 2), (0, 1)).unwrap(), q(1, 2));
        assert_eq!(c((1, 2), (-2, -4)).unwrap(), q(-2, 1));
    }

    #[test]
    fn linearity_coefficient_not_colinear() {
        let err = linearity_coefficient(&V::from_integers(1, 1), &V::from_integers(-1, 1));
        assert!(matches!(
            err,
            Err(FlatflowError::Geometry(GeometryError::NotColinear))
        ));
        let err = linearity_coefficient(&V::from_integers(0, 1), &V::from_integers(1, 1));
        assert!(matches!(
            err,
            Err(FlatflowError::Geometry(GeometryError::NotColinear))
        ));
    }

    #[test]
    fn linearity_coefficient_zero_vector() {
        let err = linearity_coefficient(&V::zero(), &V::zero());
        assert!(matches!(
            err,
            Err(FlatflowError::Geometry(GeometryError::ZeroVector))
        ));
    }

    #[test]
    fn wedge_orientation() {
        let e0 = V::from_integers(1, 0);
        let e1 = V::from_integers(0, 1);
        assert_eq!(e0.wedge(&e1), q(1, 1));
        assert_eq!(e1.wedge(&e0), q(-1, 1));
        assert!(e0.wedge(&e0).is_zero());
    }

    #[test]
    fn complex_division_inverts_multiplication() {
        let a = V::new(q(3, 2), q(-1, 2));
        let z = V::new(q(2, 1), q(-2, 3));
        assert_eq!(a.complex_mul(&z).complex_div(&a).unwrap(), z);
        assert!(z.complex_div(&V::zero()).is_err());
    }

    #[test]
    fn same_direction() {
        let u = V::from_integers(1, 2);
        assert!(is_same_direction(&u, &V::from_integers(3, 6)));
        assert!(!is_same_direction(&u, &V::from_integers(-1, -2)));
        assert!(!is_same_direction(&u, &V::from_integers(2, 1)));
    }

    #[test]
    fn display() {
        assert_eq!(V::new(q(1, 3), q(-1, 4)).to_string(), "(1/3, -1/4)");
    }

    proptest! {
        #[test]
        fn linearity_coefficient_recovers_scalar(
            ux in -50i64..50, uy in -50i64..50,
            an in -100i64..100, ad in 1i64..20,
        ) {
            prop_assume!(ux != 0 || uy != 0);
            let u = V::from_integers(ux, uy);
            let a = q(an, ad);
            prop_assert_eq!(linearity_coefficient(&u, &u.scale(&a)).unwrap(), a);
        }

        #[test]
        fn linearity_coefficient_rejects_independent_vectors(
            ux in -50i64..50, uy in -50i64..50,
            vx in -50i64..50, vy in -50i64..50,
        ) {
            let u = V::from_integers(ux, uy);
            let v = V::from_integers(vx, vy);
            prop_assume!(!u.wedge(&v).is_zero());
            prop_assert!(linearity_coefficient(&u, &v).is_err());
        }
    }
}
