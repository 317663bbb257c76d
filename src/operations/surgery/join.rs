use std::collections::HashMap;

use tracing::debug;

use crate::error::{FlatflowError, Result, SurfaceError};
use crate::geometry::Polygon;
use crate::math::{Field, Similarity};
use crate::topology::{PolygonId, SimilaritySurface, Surface, TangentVector};

use super::SurfaceMapping;

/// Merges a polygon with its neighbour across one edge.
///
/// The neighbour is moved into the kept polygon's coordinates by the edge
/// gluing and removed from the surface; the kept polygon keeps its label and
/// coordinates.
#[derive(Debug, Clone)]
pub struct JoinPolygons<'d, F> {
    domain: &'d SimilaritySurface<F>,
    codomain: SimilaritySurface<F>,
    kept: PolygonId,
    removed: PolygonId,
    edge: usize,
    /// Carries the removed polygon onto its place next to the kept one.
    transformation: Similarity<F>,
}

impl<'d, F: Field> JoinPolygons<'d, F> {
    /// Joins polygon `label` to the polygon glued at `edge`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidGluing`] when `edge` is glued to another
    /// edge of the same polygon, [`crate::error::GeometryError::NotConvex`]
    /// when the union is not strictly convex, and the surface's lookup errors.
    pub fn new(surface: &'d SimilaritySurface<F>, label: PolygonId, edge: usize) -> Result<Self> {
        let kept = surface.polygon(label)?;
        let (removed, removed_edge) = surface.opposite_edge(label, edge)?;
        if removed == label {
            return Err(SurfaceError::InvalidGluing(format!(
                "edge {edge} of polygon {label:?} is glued to the same polygon"
            ))
            .into());
        }
        let other = surface.polygon(removed)?;
        let transformation = surface.edge_transformation(removed, removed_edge)?;

        let n = kept.num_edges();
        let m = other.num_edges();
        let mut vertices = Vec::with_capacity(n + m - 2);
        let mut sources = Vec::with_capacity(n + m - 2);
        vertices.extend((0..=edge).map(|i| kept.vertex(i).clone()));
        sources.extend((0..edge).map(|i| (label, i)));
        for k in 1..m {
            if k > 1 {
                vertices.push(transformation.apply(other.vertex(removed_edge + k)));
            }
            sources.push((removed, (removed_edge + k) % m));
        }
        vertices.extend((edge + 1..n).map(|i| kept.vertex(i).clone()));
        sources.extend((edge + 1..n).map(|i| (label, i)));
        let joined = Polygon::new(vertices)?;

        let targets: HashMap<(PolygonId, usize), usize> = sources
            .iter()
            .enumerate()
            .map(|(new_edge, &old)| (old, new_edge))
            .collect();

        let mut codomain = surface.clone();
        codomain.replace_polygon(label, joined)?;
        codomain.remove_polygon(removed)?;
        for (new_edge, &(old_label, old_edge)) in sources.iter().enumerate() {
            let partner = match surface.opposite_edge(old_label, old_edge) {
                Ok(partner) => partner,
                Err(FlatflowError::Surface(SurfaceError::EdgeNotGlued { .. })) => continue,
                Err(e) => return Err(e),
            };
            let partner = match targets.get(&partner) {
                Some(&joined_edge) => (label, joined_edge),
                None => partner,
            };
            codomain.glue((label, new_edge), partner)?;
        }

        debug!(
            kept = ?label,
            removed = ?removed,
            edges = sources.len(),
            "joined polygons"
        );

        Ok(Self {
            domain: surface,
            codomain,
            kept: label,
            removed,
            edge,
            transformation,
        })
    }

    /// Label of the merged polygon.
    #[must_use]
    pub fn joined_label(&self) -> PolygonId {
        self.kept
    }

    /// Label that no longer exists in the codomain.
    #[must_use]
    pub fn removed_label(&self) -> PolygonId {
        self.removed
    }
}

impl<F: Field> SurfaceMapping<F> for JoinPolygons<'_, F> {
    fn domain(&self) -> &SimilaritySurface<F> {
        self.domain
    }

    fn codomain(&self) -> &SimilaritySurface<F> {
        &self.codomain
    }

    fn push_vector_forward(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>> {
        if tangent_vector.polygon_label() == self.removed {
            self.codomain.tangent_vector(
                self.kept,
                self.transformation.apply(tangent_vector.point()),
                self.transformation.apply_derivative(tangent_vector.vector()),
            )
        } else {
            self.codomain.tangent_vector(
                tangent_vector.polygon_label(),
                tangent_vector.point().clone(),
                tangent_vector.vector().clone(),
            )
        }
    }

    fn pull_vector_back(&self, tangent_vector: &TangentVector<'_, F>) -> Result<TangentVector<'_, F>> {
        let label = tangent_vector.polygon_label();
        let point = tangent_vector.point();
        let vector = tangent_vector.vector();
        if label == self.kept {
            let kept = self.domain.polygon(self.kept)?;
            let edge = kept.edge(self.edge);
            let side = (point.clone() - kept.vertex(self.edge).clone()).wedge(&edge);
            // Right of the former edge lies the removed polygon; on the edge
            // itself the vector decides.
            if side.is_positive() || (side.is_zero() && vector.wedge(&edge).is_positive()) {
                let inverse = self.transformation.inverse()?;
                return self.domain.tangent_vector(
                    self.removed,
                    inverse.apply(point),
                    inverse.apply_derivative(vector),
                );
            }
        }
        self.domain
            .tangent_vector(label, point.clone(), vector.clone())
    }
}
