use std::fmt;

use crate::error::{Result, TrajectoryError};
use crate::math::Field;
use crate::topology::{PolygonId, TangentVector};

/// A maximal straight segment inside one polygon.
///
/// `start` sits on the boundary and points along the segment; `end` sits on
/// the boundary and points back towards `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentInPolygon<'s, F> {
    start: TangentVector<'s, F>,
    end: TangentVector<'s, F>,
}

impl<'s, F: Field> SegmentInPolygon<'s, F> {
    /// The maximal segment through `tangent_vector`'s base point in its
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::VectorPointsOutward`] if the
    /// vector leaves its polygon immediately.
    pub fn new(tangent_vector: &TangentVector<'s, F>) -> Result<Self> {
        let end = tangent_vector.forward_to_polygon_boundary()?;
        let start = end.forward_to_polygon_boundary()?;
        Ok(Self { start, end })
    }

    /// Builds a segment from two boundary vectors of the same polygon.
    #[must_use]
    pub fn from_endpoints(start: TangentVector<'s, F>, end: TangentVector<'s, F>) -> Self {
        debug_assert_eq!(start.polygon_label(), end.polygon_label());
        Self { start, end }
    }

    /// Start of the segment, pointing forward.
    #[must_use]
    pub fn start(&self) -> &TangentVector<'s, F> {
        &self.start
    }

    /// End of the segment, pointing backward.
    #[must_use]
    pub fn end(&self) -> &TangentVector<'s, F> {
        &self.end
    }

    #[must_use]
    pub fn start_is_singular(&self) -> bool {
        self.start.is_based_at_singularity()
    }

    #[must_use]
    pub fn end_is_singular(&self) -> bool {
        self.end.is_based_at_singularity()
    }

    #[must_use]
    pub fn polygon_label(&self) -> PolygonId {
        self.start.polygon_label()
    }

    /// The same segment traversed the other way.
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }

    /// The segment obtained by continuing straight through the end point.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::SingularEndpoint`] if the end is a vertex.
    pub fn next(&self) -> Result<Self> {
        if self.end_is_singular() {
            return Err(TrajectoryError::SingularEndpoint.into());
        }
        Self::new(&self.end.invert()?)
    }

    /// The segment obtained by continuing straight back through the start
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::SingularEndpoint`] if the start is a vertex.
    pub fn previous(&self) -> Result<Self> {
        if self.start_is_singular() {
            return Err(TrajectoryError::SingularEndpoint.into());
        }
        Ok(Self::new(&self.start.invert()?)?.invert())
    }

    /// Whether the segment runs along an edge of its polygon, from vertex to
    /// vertex in the edge's direction.
    #[must_use]
    pub fn is_edge(&self) -> bool {
        if !self.end_is_singular() {
            return false;
        }
        let Some(vertex) = self.start.position().vertex() else {
            return false;
        };
        self.start
            .polygon()
            .is_ok_and(|polygon| polygon.is_along_edge(vertex, self.start.vector()))
    }

    /// Index of the edge this segment runs along.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::NotAnEdge`] unless [`Self::is_edge`] holds.
    pub fn edge(&self) -> Result<usize> {
        match self.start.position().vertex() {
            Some(vertex) if self.is_edge() => Ok(vertex),
            _ => Err(TrajectoryError::NotAnEdge.into()),
        }
    }
}

impl<F: Field> fmt::Display for SegmentInPolygon<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment in polygon {:?} starting at {} and ending at {}",
            self.polygon_label(),
            self.start.point(),
            self.end.point()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FlatflowError;
    use crate::topology::fixtures::*;
    use proptest::prelude::*;

    #[test]
    fn segment_from_vertex() {
        let (s, p0, _) = similarity_example();
        let seg = SegmentInPolygon::new(&s.tangent_vector(p0, vi(0, 0), vi(3, -1)).unwrap()).unwrap();
        assert_eq!(seg.start().point(), &vi(0, 0));
        assert_eq!(seg.end().point(), &v(q(2, 1), q(-2, 3)));
        assert!(seg.start_is_singular());
        assert!(!seg.end_is_singular());
        assert_eq!(
            seg.to_string(),
            format!("Segment in polygon {p0:?} starting at (0, 0) and ending at (2, -2/3)")
        );
    }

    #[test]
    fn next_crosses_a_similarity() {
        let (s, p0, p1) = similarity_example();
        let seg = SegmentInPolygon::new(&s.tangent_vector(p0, vi(0, 0), vi(3, -1)).unwrap()).unwrap();
        let next = seg.next().unwrap();
        assert_eq!(next.polygon_label(), p1);
        assert_eq!(next.start().point(), &v(q(2, 3), q(2, 1)));
        assert_eq!(next.start().vector(), &vi(4, -3));
        assert_eq!(next.end().point(), &v(q(14, 9), q(4, 3)));
        assert_eq!(next.previous().unwrap(), seg);
    }

    #[test]
    fn singular_endpoints_stop_continuation() {
        let (s, p0, _) = similarity_example();
        let seg = SegmentInPolygon::new(&s.tangent_vector(p0, vi(0, 0), vi(3, -1)).unwrap()).unwrap();
        assert!(matches!(
            seg.previous(),
            Err(FlatflowError::Trajectory(TrajectoryError::SingularEndpoint))
        ));
        assert!(matches!(
            seg.invert().next(),
            Err(FlatflowError::Trajectory(TrajectoryError::SingularEndpoint))
        ));
    }

    #[test]
    fn interior_start_extends_both_ways() {
        let (s, p) = square_torus();
        let seg = SegmentInPolygon::new(&s.tangent_vector(p, v(q(1, 2), q(1, 4)), vi(1, 1)).unwrap()).unwrap();
        assert_eq!(seg.start().point(), &v(q(1, 4), q(0, 1)));
        assert_eq!(seg.end().point(), &v(q(1, 1), q(3, 4)));
        assert_eq!(seg.start().vector(), &vi(1, 1));
        assert_eq!(seg.end().vector(), &vi(-1, -1));
    }

    #[test]
    fn edges() {
        let (s, p) = square_torus();
        let along = SegmentInPolygon::new(&s.tangent_vector(p, vi(1, 0), vi(0, 2)).unwrap()).unwrap();
        assert!(along.is_edge());
        assert_eq!(along.edge().unwrap(), 1);
        assert!(!along.invert().is_edge());

        let diagonal = SegmentInPolygon::new(&s.tangent_vector(p, vi(0, 0), vi(1, 1)).unwrap()).unwrap();
        assert!(diagonal.start_is_singular() && diagonal.end_is_singular());
        assert!(!diagonal.is_edge());
        assert!(matches!(
            diagonal.edge(),
            Err(FlatflowError::Trajectory(TrajectoryError::NotAnEdge))
        ));
    }

    proptest! {
        #[test]
        fn invert_is_an_involution(
            a in 1i64..97, b in 1i64..89,
            dx in -9i64..10, dy in -9i64..10,
        ) {
            prop_assume!(dx != 0 || dy != 0);
            let (s, p) = square_torus();
            let tv = s.tangent_vector(p, v(q(a, 97), q(b, 89)), vi(dx, dy)).unwrap();
            let seg = SegmentInPolygon::new(&tv).unwrap();
            prop_assert_eq!(seg.invert().invert(), seg.clone());
            if let Ok(next) = seg.next() {
                prop_assert_eq!(next.previous().unwrap(), seg.clone());
            }
            if let Ok(previous) = seg.previous() {
                prop_assert_eq!(previous.next().unwrap(), seg);
            }
        }
    }
}
