use crate::error::{GeometryError, Result};

use super::{Field, Vec2};

/// Orientation-preserving similarity of the plane, `z ↦ a·z + b`.
///
/// `a` is a nonzero complex number stored as a vector; a translation has
/// `a = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity<F> {
    a: Vec2<F>,
    b: Vec2<F>,
}

impl<F: Field> Similarity<F> {
    /// Creates a similarity from its linear part `a` and translation `b`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `a` is zero.
    pub fn new(a: Vec2<F>, b: Vec2<F>) -> Result<Self> {
        if a.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self { a, b })
    }

    /// The translation by `b`.
    #[must_use]
    pub fn translation(b: Vec2<F>) -> Self {
        Self {
            a: Vec2::new(F::one(), F::zero()),
            b,
        }
    }

    /// The similarity sending the segment `p0 → p1` onto `q0 → q1`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if either segment is degenerate.
    pub fn mapping_segment(p0: &Vec2<F>, p1: &Vec2<F>, q0: &Vec2<F>, q1: &Vec2<F>) -> Result<Self> {
        let target = q1.clone() - q0.clone();
        if target.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        let a = target.complex_div(&(p1.clone() - p0.clone()))?;
        let b = q0.clone() - a.complex_mul(p0);
        Ok(Self { a, b })
    }

    /// The linear part `a`.
    #[must_use]
    pub fn linear_part(&self) -> &Vec2<F> {
        &self.a
    }

    /// Returns `true` if the linear part is the identity.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.a.x == F::one() && self.a.y.is_zero()
    }

    /// Image of a point.
    #[must_use]
    pub fn apply(&self, point: &Vec2<F>) -> Vec2<F> {
        self.a.complex_mul(point) + self.b.clone()
    }

    /// Image of a vector under the derivative (the linear part only).
    #[must_use]
    pub fn apply_derivative(&self, vector: &Vec2<F>) -> Vec2<F> {
        self.a.complex_mul(vector)
    }

    /// The inverse similarity.
    ///
    /// # Errors
    ///
    /// Cannot fail for a similarity built through [`Similarity::new`]; the
    /// linear part is checked to be nonzero there.
    pub fn inverse(&self) -> Result<Self> {
        let inv = Vec2::new(F::one(), F::zero()).complex_div(&self.a)?;
        let b = -inv.complex_mul(&self.b);
        Ok(Self { a: inv, b })
    }
}
