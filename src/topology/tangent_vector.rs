use std::fmt;

use crate::error::{GeometryError, Result};
use crate::geometry::{PointPosition, Polygon};
use crate::math::{is_same_direction, Field, Vec2};

use super::{PolygonId, Surface};

/// A point with a direction, pinned to one polygon of a surface.
///
/// Vectors based on an edge always point into their polygon (or along the
/// edge, in its direction): a vector that would leave through the edge is
/// carried over to the glued polygon on construction. Vectors based at a
/// vertex must point into the polygon's angular sector.
#[derive(Clone)]
pub struct TangentVector<'s, F> {
    surface: &'s dyn Surface<F>,
    label: PolygonId,
    point: Vec2<F>,
    vector: Vec2<F>,
    position: PointPosition,
}

impl<'s, F: Field> TangentVector<'s, F> {
    /// Creates a tangent vector at `point` in polygon `label`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero vector,
    /// [`GeometryError::PointOutsidePolygon`] if the point is not in the
    /// polygon, [`GeometryError::VectorPointsOutward`] for a vertex-based
    /// vector outside the polygon's sector, and the surface's lookup errors
    /// when the vector has to cross an edge.
    pub fn new(
        surface: &'s dyn Surface<F>,
        label: PolygonId,
        point: Vec2<F>,
        vector: Vec2<F>,
    ) -> Result<Self> {
        if vector.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        let polygon = surface.polygon(label)?;
        let position = polygon.position(&point)?;
        match position {
            PointPosition::EdgeInterior(e) => {
                let edge = polygon.edge(e);
                let side = edge.wedge(&vector);
                if side.is_negative() || (side.is_zero() && edge.dot(&vector).is_negative()) {
                    return Self::across_edge(surface, label, e, &point, &vector);
                }
            }
            PointPosition::Vertex(v) => {
                if !polygon.is_inward_at_vertex(v, &vector) {
                    return Err(GeometryError::VectorPointsOutward.into());
                }
            }
            PointPosition::Interior => {}
        }
        Ok(Self {
            surface,
            label,
            point,
            vector,
            position,
        })
    }

    fn across_edge(
        surface: &'s dyn Surface<F>,
        label: PolygonId,
        edge: usize,
        point: &Vec2<F>,
        vector: &Vec2<F>,
    ) -> Result<Self> {
        let (other_label, other_edge) = surface.opposite_edge(label, edge)?;
        let t = surface.edge_transformation(label, edge)?;
        let point = t.apply(point);
        let vector = t.apply_derivative(vector);
        let position = surface.polygon(other_label)?.position(&point)?;
        debug_assert_eq!(position, PointPosition::EdgeInterior(other_edge));
        Ok(Self {
            surface,
            label: other_label,
            point,
            vector,
            position,
        })
    }

    /// The surface this vector lives on.
    #[must_use]
    pub fn surface(&self) -> &'s dyn Surface<F> {
        self.surface
    }

    /// Label of the polygon containing the base point.
    #[must_use]
    pub fn polygon_label(&self) -> PolygonId {
        self.label
    }

    /// The polygon containing the base point.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SurfaceError::PolygonNotFound`] if the surface
    /// no longer knows the label.
    pub fn polygon(&self) -> Result<&'s Polygon<F>> {
        self.surface.polygon(self.label)
    }

    /// Base point, in the polygon's coordinates.
    #[must_use]
    pub fn point(&self) -> &Vec2<F> {
        &self.point
    }

    /// Direction.
    #[must_use]
    pub fn vector(&self) -> &Vec2<F> {
        &self.vector
    }

    /// Position of the base point in its polygon.
    #[must_use]
    pub fn position(&self) -> PointPosition {
        self.position
    }

    /// Whether the base point is a vertex.
    #[must_use]
    pub fn is_based_at_singularity(&self) -> bool {
        self.position.is_vertex()
    }

    /// The vector obtained by flowing until the polygon boundary, pointing
    /// back the way it came.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::VectorPointsOutward`] if the vector leaves its
    /// polygon immediately.
    pub fn forward_to_polygon_boundary(&self) -> Result<Self> {
        let (point, position) = self.polygon()?.flow_to_exit(&self.point, &self.vector)?;
        Ok(Self {
            surface: self.surface,
            label: self.label,
            point,
            vector: -self.vector.clone(),
            position,
        })
    }

    /// The same point with the opposite direction.
    ///
    /// An edge-based vector that now points out of its polygon moves across
    /// the gluing.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::VectorPointsOutward`] when a vertex-based
    /// vector reverses out of the vertex's sector, and the surface's lookup
    /// errors when crossing an edge.
    pub fn invert(&self) -> Result<Self> {
        Self::new(
            self.surface,
            self.label,
            self.point.clone(),
            -self.vector.clone(),
        )
    }

    /// Whether `other` has the same base point and a positively proportional
    /// direction.
    #[must_use]
    pub fn differs_by_scaling(&self, other: &Self) -> bool {
        self.label == other.label
            && self.point == other.point
            && is_same_direction(&self.vector, &other.vector)
    }
}

impl<F: PartialEq> PartialEq for TangentVector<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.point == other.point && self.vector == other.vector
    }
}

impl<F: fmt::Debug> fmt::Debug for TangentVector<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TangentVector")
            .field("label", &self.label)
            .field("point", &self.point)
            .field("vector", &self.vector)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<F: fmt::Display> fmt::Display for TangentVector<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tangent vector in polygon {:?} based at {} with vector {}",
            self.label, self.point, self.vector
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FlatflowError;
    use crate::topology::fixtures::*;

    #[test]
    fn interior_vector() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, v(q(1, 2), q(1, 3)), vi(1, 1)).unwrap();
        assert_eq!(t.position(), PointPosition::Interior);
        assert!(!t.is_based_at_singularity());
    }

    #[test]
    fn outward_edge_vector_crosses_gluing() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, v(q(1, 1), q(1, 2)), vi(1, 1)).unwrap();
        assert_eq!(t.point(), &v(q(0, 1), q(1, 2)));
        assert_eq!(t.position(), PointPosition::EdgeInterior(3));
        assert_eq!(t.vector(), &vi(1, 1));
    }

    #[test]
    fn crossing_a_similarity_rescales_vector() {
        let (s, p0, p1) = similarity_example();
        let t = s.tangent_vector(p0, v(q(2, 1), q(-2, 3)), vi(3, -1)).unwrap();
        assert_eq!(t.polygon_label(), p1);
        assert_eq!(t.point(), &v(q(2, 3), q(2, 1)));
        assert_eq!(t.vector(), &vi(4, -3));
    }

    #[test]
    fn backwards_along_edge_crosses_gluing() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, v(q(1, 2), q(0, 1)), vi(-1, 0)).unwrap();
        assert_eq!(t.point(), &v(q(1, 2), q(1, 1)));
        assert_eq!(t.position(), PointPosition::EdgeInterior(2));
    }

    #[test]
    fn vertex_sector() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, vi(0, 0), vi(3, 5)).unwrap();
        assert!(t.is_based_at_singularity());
        let err = s.tangent_vector(p, vi(0, 0), vi(-1, 1));
        assert!(matches!(
            err,
            Err(FlatflowError::Geometry(GeometryError::VectorPointsOutward))
        ));
        assert!(t.invert().is_err());
    }

    #[test]
    fn rejects_zero_and_outside() {
        let (s, p) = square_torus();
        assert!(matches!(
            s.tangent_vector(p, v(q(1, 2), q(1, 2)), vi(0, 0)),
            Err(FlatflowError::Geometry(GeometryError::ZeroVector))
        ));
        assert!(matches!(
            s.tangent_vector(p, vi(2, 2), vi(1, 0)),
            Err(FlatflowError::Geometry(GeometryError::PointOutsidePolygon))
        ));
    }

    #[test]
    fn forward_to_boundary_reverses() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, v(q(1, 2), q(0, 1)), vi(1, 1)).unwrap();
        let end = t.forward_to_polygon_boundary().unwrap();
        assert_eq!(end.point(), &v(q(1, 1), q(1, 2)));
        assert_eq!(end.vector(), &vi(-1, -1));
        assert_eq!(end.position(), PointPosition::EdgeInterior(1));
        let start = end.forward_to_polygon_boundary().unwrap();
        assert_eq!(start, t);
    }

    #[test]
    fn invert_twice_is_identity_inside() {
        let (s, p) = square_torus();
        let t = s.tangent_vector(p, v(q(1, 3), q(1, 7)), vi(2, 1)).unwrap();
        assert_eq!(t.invert().unwrap().invert().unwrap(), t);
    }

    #[test]
    fn scaling_relation() {
        let (s, p) = square_torus();
        let a = s.tangent_vector(p, v(q(1, 3), q(1, 7)), vi(2, 1)).unwrap();
        let b = s.tangent_vector(p, v(q(1, 3), q(1, 7)), vi(6, 3)).unwrap();
        let c = s.tangent_vector(p, v(q(1, 3), q(1, 7)), vi(-2, -1)).unwrap();
        assert!(a.differs_by_scaling(&b));
        assert_ne!(a, b);
        assert!(!a.differs_by_scaling(&c));
    }
}
