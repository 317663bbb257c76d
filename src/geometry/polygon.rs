use std::f64::consts::TAU;
use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::{is_same_direction, Field, Vec2};

use super::FlowMap;

/// Location of a point relative to a polygon it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointPosition {
    /// Strictly inside.
    Interior,
    /// On the given edge, away from its endpoints.
    EdgeInterior(usize),
    /// At the given vertex.
    Vertex(usize),
}

impl PointPosition {
    /// Returns `true` for [`PointPosition::Vertex`].
    #[must_use]
    pub fn is_vertex(&self) -> bool {
        matches!(self, Self::Vertex(_))
    }

    /// The edge index for [`PointPosition::EdgeInterior`].
    #[must_use]
    pub fn edge(&self) -> Option<usize> {
        match self {
            Self::EdgeInterior(e) => Some(*e),
            _ => None,
        }
    }

    /// The vertex index for [`PointPosition::Vertex`].
    #[must_use]
    pub fn vertex(&self) -> Option<usize> {
        match self {
            Self::Vertex(v) => Some(*v),
            _ => None,
        }
    }
}

/// A strictly convex polygon with counter-clockwise vertices.
///
/// Edge `i` runs from `vertex(i)` to `vertex(i + 1)`; indices wrap around.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<F> {
    vertices: Vec<Vec2<F>>,
}

impl<F: Field> Polygon<F> {
    /// Creates a polygon from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for fewer than three vertices and
    /// [`GeometryError::NotConvex`] unless every turn is strictly to the left.
    pub fn new(vertices: Vec<Vec2<F>>) -> Result<Self> {
        let n = vertices.len();
        if n < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon needs at least 3 vertices, got {n}"
            ))
            .into());
        }
        let polygon = Self { vertices };
        for i in 0..n {
            if !polygon.edge(i).wedge(&polygon.edge(i + 1)).is_positive() {
                return Err(GeometryError::NotConvex(format!(
                    "turn at vertex {} is not counter-clockwise",
                    (i + 1) % n
                ))
                .into());
            }
        }
        Ok(polygon)
    }

    /// Creates a polygon from edge vectors, starting at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the edges do not close up, and
    /// the errors of [`Polygon::new`].
    pub fn from_edges(edges: &[Vec2<F>]) -> Result<Self> {
        let mut vertices = Vec::with_capacity(edges.len());
        let mut current = Vec2::zero();
        for e in edges {
            vertices.push(current.clone());
            current = current + e.clone();
        }
        if !current.is_zero() {
            return Err(GeometryError::Degenerate("edges do not close up".into()).into());
        }
        Self::new(vertices)
    }

    /// Number of edges (and vertices).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.vertices.len()
    }

    /// All vertices in counter-clockwise order.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2<F>] {
        &self.vertices
    }

    /// Vertex `i`, modulo the number of vertices.
    #[must_use]
    pub fn vertex(&self, i: usize) -> &Vec2<F> {
        &self.vertices[i % self.vertices.len()]
    }

    /// Edge vector `vertex(i + 1) - vertex(i)`.
    #[must_use]
    pub fn edge(&self, i: usize) -> Vec2<F> {
        self.vertex(i + 1).clone() - self.vertex(i).clone()
    }

    /// Index of the edge before `i`.
    #[must_use]
    pub fn previous_index(&self, i: usize) -> usize {
        let n = self.num_edges();
        (i % n + n - 1) % n
    }

    /// Classifies `point` relative to the polygon.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PointOutsidePolygon`] if the point is outside.
    pub fn position(&self, point: &Vec2<F>) -> Result<PointPosition> {
        let mut on_edge = None;
        for i in 0..self.num_edges() {
            if point == self.vertex(i) {
                return Ok(PointPosition::Vertex(i));
            }
            let side = self.edge(i).wedge(&(point.clone() - self.vertex(i).clone()));
            if side.is_negative() {
                return Err(GeometryError::PointOutsidePolygon.into());
            }
            if side.is_zero() {
                on_edge = Some(i);
            }
        }
        Ok(on_edge.map_or(PointPosition::Interior, PointPosition::EdgeInterior))
    }

    /// Returns `true` if `direction` at vertex `v` points into the polygon
    /// (the boundary directions included).
    #[must_use]
    pub fn is_inward_at_vertex(&self, v: usize, direction: &Vec2<F>) -> bool {
        let outgoing = self.edge(v);
        let incoming_back = -self.edge(self.previous_index(v));
        !outgoing.wedge(direction).is_negative() && !direction.wedge(&incoming_back).is_negative()
    }

    /// Flows `point` along `direction` until it reaches the boundary.
    ///
    /// Returns the exit point and its position.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero direction and
    /// [`GeometryError::VectorPointsOutward`] if the point leaves the polygon
    /// immediately.
    pub fn flow_to_exit(
        &self,
        point: &Vec2<F>,
        direction: &Vec2<F>,
    ) -> Result<(Vec2<F>, PointPosition)> {
        if direction.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        let mut best: Option<F> = None;
        for i in 0..self.num_edges() {
            let e = self.edge(i);
            let speed = e.wedge(direction);
            if !speed.is_negative() {
                continue;
            }
            let t = e.wedge(&(self.vertex(i).clone() - point.clone())) / speed;
            // On or beyond the line of an edge the ray leaves through.
            if !t.is_positive() {
                return Err(GeometryError::VectorPointsOutward.into());
            }
            best = match best {
                Some(b) if b <= t => Some(b),
                _ => Some(t),
            };
        }
        let t = best.ok_or(GeometryError::VectorPointsOutward)?;
        let exit = point.clone() + direction.scale(&t);
        let position = self.position(&exit)?;
        Ok((exit, position))
    }

    /// Interior angle at vertex `v`, in turns (fractions of `2π`).
    #[must_use]
    pub fn angle(&self, v: usize) -> f64 {
        let outgoing = self.edge(v).to_approx();
        let incoming_back = (-self.edge(self.previous_index(v))).to_approx();
        let cross = outgoing.x * incoming_back.y - outgoing.y * incoming_back.x;
        cross.atan2(outgoing.dot(&incoming_back)) / TAU
    }

    /// Returns `true` if the segment from vertex `v` along `direction` runs
    /// along edge `v`.
    #[must_use]
    pub fn is_along_edge(&self, v: usize, direction: &Vec2<F>) -> bool {
        is_same_direction(direction, &self.edge(v))
    }

    /// The interval exchange induced by flowing in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero direction.
    pub fn flow_map(&self, direction: &Vec2<F>) -> Result<FlowMap<F>> {
        FlowMap::new(self, direction)
    }
}

impl<F: fmt::Display> fmt::Display for Polygon<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon: ")?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
