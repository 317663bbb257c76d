use crate::error::{FlatflowError, Result, SurfaceError};
use crate::geometry::Polygon;
use crate::math::{Field, Similarity};

use super::PolygonId;

/// Read-only view of a surface made of polygons glued along edges.
///
/// This is the narrow interface the flow engine consumes; it never mutates a
/// surface while flowing.
pub trait Surface<F: Field> {
    /// The polygon with the given label.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PolygonNotFound`] for an unknown label.
    fn polygon(&self, label: PolygonId) -> Result<&Polygon<F>>;

    /// The edge glued to edge `edge` of polygon `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is unknown, the edge index is out of
    /// range, or the edge is not glued.
    fn opposite_edge(&self, label: PolygonId, edge: usize) -> Result<(PolygonId, usize)>;

    /// Whether the surface has finitely many polygons.
    fn is_finite(&self) -> bool;

    /// All polygon labels.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::UnsupportedOperation`] on an infinite surface.
    fn labels(&self) -> Result<Vec<PolygonId>>;

    /// All `(label, edge)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::UnsupportedOperation`] on an infinite surface.
    fn edges(&self) -> Result<Vec<(PolygonId, usize)>> {
        if !self.is_finite() {
            return Err(SurfaceError::UnsupportedOperation("the set of edges is infinite").into());
        }
        let mut edges = Vec::new();
        for label in self.labels()? {
            let n = self.polygon(label)?.num_edges();
            edges.extend((0..n).map(|e| (label, e)));
        }
        Ok(edges)
    }

    /// The similarity carrying polygon `label` onto the polygon glued at
    /// `edge`, so that the two copies of the edge coincide with opposite
    /// orientations.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Surface::opposite_edge`].
    fn edge_transformation(&self, label: PolygonId, edge: usize) -> Result<Similarity<F>> {
        let (other_label, other_edge) = self.opposite_edge(label, edge)?;
        let p = self.polygon(label)?;
        let q = self.polygon(other_label)?;
        Similarity::mapping_segment(
            p.vertex(edge),
            p.vertex(edge + 1),
            q.vertex(other_edge + 1),
            q.vertex(other_edge),
        )
    }

    /// Whether every gluing is a translation.
    ///
    /// Unglued edges are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::UnsupportedOperation`] on an infinite surface.
    fn is_translation_surface(&self) -> Result<bool> {
        for (label, edge) in self.edges()? {
            match self.edge_transformation(label, edge) {
                Ok(t) if !t.is_translation() => return Ok(false),
                Ok(_) | Err(FlatflowError::Surface(SurfaceError::EdgeNotGlued { .. })) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }
}
