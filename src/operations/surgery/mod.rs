//! Cut-and-paste operations on polygons of a surface.
//!
//! Each operation builds a new surface and records how tangent vectors move
//! between the old surface (the domain) and the new one (the codomain).

mod join;
mod split;

pub use join::JoinPolygons;
pub use split::SplitPolygon;

use crate::error::Result;
use crate::math::Field;
use crate::topology::{SimilaritySurface, TangentVector};

/// A map between two surfaces that carries tangent vectors both ways.
pub trait SurfaceMapping<F: Field> {
    /// The surface the mapping starts from.
    fn domain(&self) -> &SimilaritySurface<F>;

    /// The surface the mapping produces.
    fn codomain(&self) -> &SimilaritySurface<F>;

    /// Image in the codomain of a tangent vector of the domain.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TangentVector::new`] on the codomain.
    fn push_vector_forward(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>>;

    /// Preimage in the domain of a tangent vector of the codomain.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TangentVector::new`] on the domain.
    fn pull_vector_back(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>>;
}
