use tracing::debug;

use crate::error::{FlatflowError, Result, SurfaceError, SurgeryError};
use crate::geometry::Polygon;
use crate::math::Field;
use crate::topology::{PolygonId, SimilaritySurface, Surface, TangentVector};

use super::SurfaceMapping;

/// Cuts a polygon in two along a diagonal.
///
/// Both halves keep the coordinates of the original polygon. The half
/// through the vertices after `v2` keeps the label; the other half gets a
/// new one. Edge 0 of each half is the diagonal, glued to the other.
#[derive(Debug, Clone)]
pub struct SplitPolygon<'d, F> {
    domain: &'d SimilaritySurface<F>,
    codomain: SimilaritySurface<F>,
    label: PolygonId,
    new_label: PolygonId,
    v1: usize,
    v2: usize,
}

impl<'d, F: Field> SplitPolygon<'d, F> {
    /// Splits polygon `label` along the diagonal from vertex `v1` to vertex
    /// `v2`.
    ///
    /// # Errors
    ///
    /// Returns [`SurgeryError::InvalidDiagonal`] when a vertex is out of
    /// bounds or the two vertices are equal or adjacent.
    pub fn new(surface: &'d SimilaritySurface<F>, label: PolygonId, v1: usize, v2: usize) -> Result<Self> {
        let polygon = surface.polygon(label)?;
        let n = polygon.num_edges();
        let (v1, v2) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
        if v2 >= n || v2 - v1 <= 1 || v2 - v1 >= n - 1 {
            return Err(SurgeryError::InvalidDiagonal { v1, v2 }.into());
        }

        // Kept half: v1, v2, v2 + 1, ..., v1 - 1. New half: v2, v1, v1 + 1, ..., v2 - 1.
        let kept = Polygon::new(
            std::iter::once(v1)
                .chain(v2..v1 + n)
                .map(|i| polygon.vertex(i).clone())
                .collect(),
        )?;
        let added = Polygon::new(
            std::iter::once(v2)
                .chain(v1..v2)
                .map(|i| polygon.vertex(i).clone())
                .collect(),
        )?;
        let relabel = |old: usize| -> (bool, usize) {
            if old < v1 {
                (false, old + n - v2 + 1)
            } else if old < v2 {
                (true, old - v1 + 1)
            } else {
                (false, old - v2 + 1)
            }
        };

        let mut codomain = surface.clone();
        codomain.replace_polygon(label, kept)?;
        let new_label = codomain.add_polygon(added);
        let to_new = |old: usize| match relabel(old) {
            (true, edge) => (new_label, edge),
            (false, edge) => (label, edge),
        };
        codomain.glue((label, 0), (new_label, 0))?;
        for old in 0..n {
            let partner = match surface.opposite_edge(label, old) {
                Ok((other, other_edge)) if other == label => to_new(other_edge),
                Ok(partner) => partner,
                Err(FlatflowError::Surface(SurfaceError::EdgeNotGlued { .. })) => continue,
                Err(e) => return Err(e),
            };
            codomain.glue(to_new(old), partner)?;
        }

        debug!(?label, ?new_label, v1, v2, "split polygon");

        Ok(Self {
            domain: surface,
            codomain,
            label,
            new_label,
            v1,
            v2,
        })
    }

    /// Label of the half that did not exist before.
    #[must_use]
    pub fn new_label(&self) -> PolygonId {
        self.new_label
    }
}

impl<F: Field> SurfaceMapping<F> for SplitPolygon<'_, F> {
    fn domain(&self) -> &SimilaritySurface<F> {
        self.domain
    }

    fn codomain(&self) -> &SimilaritySurface<F> {
        &self.codomain
    }

    fn push_vector_forward(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>> {
        let label = tangent_vector.polygon_label();
        let point = tangent_vector.point().clone();
        let vector = tangent_vector.vector().clone();
        if label != self.label {
            return self.codomain.tangent_vector(label, point, vector);
        }
        let polygon = self.domain.polygon(self.label)?;
        let start = polygon.vertex(self.v1);
        let diagonal = polygon.vertex(self.v2).clone() - start.clone();
        let side = diagonal.wedge(&(point.clone() - start.clone()));
        let kept = side.is_positive() || (side.is_zero() && diagonal.wedge(&vector).is_positive());
        let target = if kept { self.label } else { self.new_label };
        self.codomain.tangent_vector(target, point, vector)
    }

    fn pull_vector_back(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>> {
        let label = tangent_vector.polygon_label();
        let label = if label == self.new_label { self.label } else { label };
        self.domain.tangent_vector(
            label,
            tangent_vector.point().clone(),
            tangent_vector.vector().clone(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::fixtures::*;
    use crate::trajectory::{StraightLineTrajectory, Trajectory};
    use proptest::prelude::*;

    #[test]
    fn splits_the_square_along_its_diagonal() {
        let (s, p) = square_torus();
        let split = SplitPolygon::new(&s, p, 2, 0).unwrap();
        let c = split.codomain();
        let q_ = split.new_label();
        assert_eq!(c.num_polygons(), 2);
        assert_eq!(c.polygon(p).unwrap().vertices(), &[vi(0, 0), vi(1, 1), vi(0, 1)]);
        assert_eq!(c.polygon(q_).unwrap().vertices(), &[vi(1, 1), vi(0, 0), vi(1, 0)]);
        assert_eq!(c.opposite_edge(p, 0).unwrap(), (q_, 0));
        assert_eq!(c.opposite_edge(q_, 1).unwrap(), (p, 1));
        assert_eq!(c.opposite_edge(q_, 2).unwrap(), (p, 2));
        assert!(c.is_translation_surface().unwrap());
    }

    #[test]
    fn rejects_non_diagonals() {
        let (s, p) = square_torus();
        for (v1, v2) in [(0, 1), (3, 0), (1, 1), (0, 4)] {
            assert!(matches!(
                SplitPolygon::new(&s, p, v1, v2),
                Err(FlatflowError::Surgery(SurgeryError::InvalidDiagonal { .. }))
            ));
        }
    }

    #[test]
    fn trajectories_cross_the_diagonal() {
        let (s, p) = square_torus();
        let split = SplitPolygon::new(&s, p, 0, 2).unwrap();
        let tv = s.tangent_vector(p, v(q(1, 2), q(1, 4)), vi(1, 2)).unwrap();
        let pushed = split.push_vector_forward(&tv).unwrap();
        assert_eq!(pushed.polygon_label(), split.new_label());

        let mut l = StraightLineTrajectory::new(&pushed).unwrap();
        l.flow(1).unwrap();
        let coding = l.coding().unwrap();
        assert!(coding.contains(&(split.new_label(), 0)));
        assert_eq!(l.segment(1).unwrap().polygon_label(), p);
    }

    #[test]
    fn on_the_diagonal_the_vector_decides() {
        let (s, p) = square_torus();
        let split = SplitPolygon::new(&s, p, 0, 2).unwrap();
        let up = s.tangent_vector(p, v(q(1, 3), q(1, 3)), vi(-1, 1)).unwrap();
        assert_eq!(split.push_vector_forward(&up).unwrap().polygon_label(), p);
        let down = s.tangent_vector(p, v(q(1, 3), q(1, 3)), vi(1, -1)).unwrap();
        assert_eq!(split.push_vector_forward(&down).unwrap().polygon_label(), split.new_label());
    }

    proptest! {
        #[test]
        fn pull_back_inverts_push_forward(
            x in 1i64..50, y in 1i64..50,
            dx in -5i64..6, dy in -5i64..6,
        ) {
            prop_assume!(dx != 0 || dy != 0);
            let (s, p) = square_torus();
            let split = SplitPolygon::new(&s, p, 1, 3).unwrap();
            let tv = s.tangent_vector(p, v(q(x, 50), q(y, 50)), vi(dx, dy)).unwrap();
            let pushed = split.push_vector_forward(&tv).unwrap();
            prop_assert_eq!(split.pull_vector_back(&pushed).unwrap(), tv);
        }
    }
}
