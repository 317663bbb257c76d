use std::collections::BTreeSet;

use crate::error::{Result, SurfaceError};
use crate::math::Field;
use crate::topology::{PolygonId, Surface};

/// Total angle around each vertex class of a finite surface, in turns.
///
/// Corners are grouped by walking around each vertex: from corner `e` of
/// polygon `p`, the next corner is the start of the edge glued to edge
/// `e - 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConeAngles;

impl ConeAngles {
    /// Creates a new `ConeAngles` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query, returning one angle per vertex class.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::UnsupportedOperation`] on an infinite surface,
    /// and [`SurfaceError::EdgeNotGlued`] if a vertex touches an unglued
    /// edge.
    pub fn execute<F, S>(&self, surface: &S) -> Result<Vec<f64>>
    where
        F: Field,
        S: Surface<F> + ?Sized,
    {
        if !surface.is_finite() {
            return Err(SurfaceError::UnsupportedOperation("the set of edges is infinite").into());
        }
        let mut corners: BTreeSet<_> = surface.edges()?.into_iter().collect();
        let mut angles = Vec::new();
        while let Some((label, edge)) = corners.pop_first() {
            let mut angle = surface.polygon(label)?.angle(edge);
            let mut current = incoming(surface, label, edge)?;
            while current != (label, edge) {
                corners.remove(&current);
                angle += surface.polygon(current.0)?.angle(current.1);
                current = incoming(surface, current.0, current.1)?;
            }
            angles.push(angle);
        }
        tracing::debug!(vertices = angles.len(), "computed cone angles");
        Ok(angles)
    }
}

/// The corner sharing vertex `vertex` of `label` across the edge ending there.
fn incoming<F: Field, S: Surface<F> + ?Sized>(
    surface: &S,
    label: PolygonId,
    vertex: usize,
) -> Result<(PolygonId, usize)> {
    let previous = surface.polygon(label)?.previous_index(vertex);
    surface.opposite_edge(label, previous)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FlatflowError;
    use crate::geometry::Polygon;
    use crate::math::Rational;
    use crate::topology::fixtures::*;
    use crate::topology::SimilaritySurface;
    use approx::assert_relative_eq;

    #[test]
    fn square_torus_has_one_flat_point() {
        let (s, _) = square_torus();
        let angles = ConeAngles::new().execute(&s).unwrap();
        assert_eq!(angles.len(), 1);
        assert_relative_eq!(angles[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn two_triangles_share_one_vertex() {
        let (s, _, _) = two_triangle_torus();
        let angles = ConeAngles::new().execute(&s).unwrap();
        assert_eq!(angles.len(), 1);
        assert_relative_eq!(angles[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn similarity_example_total_angle() {
        let (s, p0, p1) = similarity_example();
        let angles = ConeAngles::new().execute(&s).unwrap();
        let total: f64 = angles.iter().sum();
        // Two triangles contribute half a turn each.
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        let corners: f64 = [p0, p1]
            .iter()
            .flat_map(|&p| (0..3).map(move |v| (p, v)))
            .map(|(p, v)| s.polygon(p).unwrap().angle(v))
            .sum();
        assert_relative_eq!(total, corners, epsilon = 1e-12);
    }

    #[test]
    fn unglued_edges_fail() {
        let mut s = SimilaritySurface::new();
        s.add_polygon(Polygon::from_edges(&[vi(1, 0), vi(0, 1), vi(-1, -1)]).unwrap());
        assert!(matches!(
            ConeAngles::new().execute(&s),
            Err(FlatflowError::Surface(SurfaceError::EdgeNotGlued { .. }))
        ));
    }

    /// A surface that claims to be infinite.
    struct Unbounded(SimilaritySurface<Rational>);

    impl Surface<Rational> for Unbounded {
        fn polygon(&self, label: PolygonId) -> Result<&Polygon<Rational>> {
            self.0.polygon(label)
        }

        fn opposite_edge(&self, label: PolygonId, edge: usize) -> Result<(PolygonId, usize)> {
            self.0.opposite_edge(label, edge)
        }

        fn is_finite(&self) -> bool {
            false
        }

        fn labels(&self) -> Result<Vec<PolygonId>> {
            Err(SurfaceError::UnsupportedOperation("the set of labels is infinite").into())
        }
    }

    #[test]
    fn infinite_surfaces_unsupported() {
        let (s, _) = square_torus();
        assert!(matches!(
            ConeAngles::new().execute(&Unbounded(s)),
            Err(FlatflowError::Surface(SurfaceError::UnsupportedOperation(_)))
        ));
    }
}
