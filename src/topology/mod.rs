mod surface;
mod tangent_vector;

pub use surface::Surface;
pub use tangent_vector::TangentVector;

use slotmap::SlotMap;

use crate::error::{Result, SurfaceError};
use crate::geometry::Polygon;
use crate::math::{Field, Vec2};

slotmap::new_key_type! {
    /// Label of a polygon in a surface.
    pub struct PolygonId;
}

/// A polygon together with the gluing of each of its edges.
#[derive(Debug, Clone)]
struct PolygonData<F> {
    polygon: Polygon<F>,
    gluings: Vec<Option<(PolygonId, usize)>>,
}

/// Finite surface built from convex polygons glued edge to edge by
/// orientation-preserving similarities.
///
/// Polygons are owned by the store and referenced by [`PolygonId`]. Gluings
/// are kept symmetric: gluing `(p, e)` to `(q, f)` also glues `(q, f)` to
/// `(p, e)` and releases any previous partner of either edge.
#[derive(Debug, Clone)]
pub struct SimilaritySurface<F> {
    polygons: SlotMap<PolygonId, PolygonData<F>>,
}

impl<F: Field> Default for SimilaritySurface<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> SimilaritySurface<F> {
    /// Creates a new, empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            polygons: SlotMap::with_key(),
        }
    }

    /// Number of polygons.
    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    /// Inserts a polygon with all edges unglued and returns its label.
    pub fn add_polygon(&mut self, polygon: Polygon<F>) -> PolygonId {
        let gluings = vec![None; polygon.num_edges()];
        self.polygons.insert(PolygonData { polygon, gluings })
    }

    /// Replaces the polygon at `label`, releasing all of its gluings.
    ///
    /// Returns the previous polygon.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PolygonNotFound`] for an unknown label.
    pub fn replace_polygon(&mut self, label: PolygonId, polygon: Polygon<F>) -> Result<Polygon<F>> {
        self.release_all(label)?;
        let data = self.data_mut(label)?;
        data.gluings = vec![None; polygon.num_edges()];
        Ok(std::mem::replace(&mut data.polygon, polygon))
    }

    /// Removes the polygon at `label`, releasing all of its gluings.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PolygonNotFound`] for an unknown label.
    pub fn remove_polygon(&mut self, label: PolygonId) -> Result<Polygon<F>> {
        self.release_all(label)?;
        self.polygons
            .remove(label)
            .map(|data| data.polygon)
            .ok_or_else(|| SurfaceError::PolygonNotFound(format!("{label:?}")).into())
    }

    /// Glues edge `a` to edge `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if either label or edge is invalid, or if an edge is
    /// glued to itself.
    pub fn glue(&mut self, a: (PolygonId, usize), b: (PolygonId, usize)) -> Result<()> {
        self.check_edge(a.0, a.1)?;
        self.check_edge(b.0, b.1)?;
        if a == b {
            return Err(SurfaceError::InvalidGluing(format!(
                "edge {} of polygon {:?} glued to itself",
                a.1, a.0
            ))
            .into());
        }
        self.unglue(a.0, a.1)?;
        self.unglue(b.0, b.1)?;
        self.data_mut(a.0)?.gluings[a.1] = Some(b);
        self.data_mut(b.0)?.gluings[b.1] = Some(a);
        Ok(())
    }

    /// Releases the gluing of edge `edge` of `label`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the label or edge is invalid.
    pub fn unglue(&mut self, label: PolygonId, edge: usize) -> Result<()> {
        self.check_edge(label, edge)?;
        if let Some((other, other_edge)) = self.data_mut(label)?.gluings[edge].take() {
            self.data_mut(other)?.gluings[other_edge] = None;
        }
        Ok(())
    }

    /// A tangent vector based at `point` in polygon `label`.
    ///
    /// # Errors
    ///
    /// See [`TangentVector::new`].
    pub fn tangent_vector(
        &self,
        label: PolygonId,
        point: Vec2<F>,
        vector: Vec2<F>,
    ) -> Result<TangentVector<'_, F>> {
        TangentVector::new(self, label, point, vector)
    }

    fn data(&self, label: PolygonId) -> Result<&PolygonData<F>> {
        self.polygons
            .get(label)
            .ok_or_else(|| SurfaceError::PolygonNotFound(format!("{label:?}")).into())
    }

    fn data_mut(&mut self, label: PolygonId) -> Result<&mut PolygonData<F>> {
        self.polygons
            .get_mut(label)
            .ok_or_else(|| SurfaceError::PolygonNotFound(format!("{label:?}")).into())
    }

    fn check_edge(&self, label: PolygonId, edge: usize) -> Result<()> {
        let num_edges = self.data(label)?.polygon.num_edges();
        if edge >= num_edges {
            return Err(SurfaceError::EdgeOutOfRange { edge, num_edges }.into());
        }
        Ok(())
    }

    fn release_all(&mut self, label: PolygonId) -> Result<()> {
        let n = self.data(label)?.gluings.len();
        for edge in 0..n {
            self.unglue(label, edge)?;
        }
        Ok(())
    }
}

impl<F: Field> Surface<F> for SimilaritySurface<F> {
    fn polygon(&self, label: PolygonId) -> Result<&Polygon<F>> {
        Ok(&self.data(label)?.polygon)
    }

    fn opposite_edge(&self, label: PolygonId, edge: usize) -> Result<(PolygonId, usize)> {
        self.check_edge(label, edge)?;
        self.data(label)?.gluings[edge].ok_or_else(|| {
            SurfaceError::EdgeNotGlued {
                label: format!("{label:?}"),
                edge,
            }
            .into()
        })
    }

    fn is_finite(&self) -> bool {
        true
    }

    fn labels(&self) -> Result<Vec<PolygonId>> {
        Ok(self.polygons.keys().collect())
    }
}
