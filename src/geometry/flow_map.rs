use crate::error::{GeometryError, Result};
use crate::math::{Field, Vec2};

use super::Polygon;

/// Interval exchange induced by the straight-line flow in a fixed direction
/// across one polygon.
///
/// Points are measured with the transversal coordinate
/// `τ(p) = wedge(p, direction)`, which is constant along flow lines. Edges
/// the flow enters through are *bottom* edges and cover
/// `[τ(vertex(e)), τ(vertex(e)) + length)`; edges it leaves through are *top*
/// edges and cover `[τ(vertex(e + 1)), τ(vertex(e + 1)) + length)`. Offsets on
/// a bottom edge are measured from its start vertex, offsets on a top edge
/// from its end vertex, so an offset of zero is always a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMap<F> {
    heights: Vec<F>,
    widths: Vec<F>,
    bottom: Vec<usize>,
    top: Vec<usize>,
}

impl<F: Field> FlowMap<F> {
    /// Builds the flow map of `polygon` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero direction.
    pub fn new(polygon: &Polygon<F>, direction: &Vec2<F>) -> Result<Self> {
        if direction.is_zero() {
            return Err(GeometryError::ZeroVector.into());
        }
        let n = polygon.num_edges();
        let heights: Vec<F> = polygon
            .vertices()
            .iter()
            .map(|v| v.wedge(direction))
            .collect();
        let widths: Vec<F> = (0..n).map(|i| polygon.edge(i).wedge(direction)).collect();

        // Both chains are contiguous in a convex polygon; walk each from its
        // first edge so that bottom edges come out with increasing τ.
        let chain = |keep: &dyn Fn(&F) -> bool| -> Vec<usize> {
            let first = (0..n).find(|&i| keep(&widths[i]) && !keep(&widths[(i + n - 1) % n]));
            first.map_or_else(Vec::new, |first| {
                (0..n)
                    .map(|k| (first + k) % n)
                    .take_while(|&i| keep(&widths[i]))
                    .collect()
            })
        };
        let bottom = chain(&|w: &F| w.is_positive());
        let mut top = chain(&|w: &F| w.is_negative());
        top.reverse();

        tracing::trace!(
            bottom = ?bottom,
            top = ?top,
            "built flow map"
        );

        Ok(Self {
            heights,
            widths,
            bottom,
            top,
        })
    }

    /// Bottom edges, by increasing transversal coordinate.
    #[must_use]
    pub fn bottom_edges(&self) -> &[usize] {
        &self.bottom
    }

    /// Top edges, by increasing transversal coordinate.
    #[must_use]
    pub fn top_edges(&self) -> &[usize] {
        &self.top
    }

    /// Length of the bottom interval of edge `e`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OffsetOutOfRange`] if `e` is not a bottom edge.
    pub fn length_bot(&self, e: usize) -> Result<F> {
        match self.widths.get(e) {
            Some(w) if w.is_positive() => Ok(w.clone()),
            _ => Err(GeometryError::OffsetOutOfRange { edge: e }.into()),
        }
    }

    /// Length of the top interval of edge `e`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OffsetOutOfRange`] if `e` is not a top edge.
    pub fn length_top(&self, e: usize) -> Result<F> {
        match self.widths.get(e) {
            Some(w) if w.is_negative() => Ok(-w.clone()),
            _ => Err(GeometryError::OffsetOutOfRange { edge: e }.into()),
        }
    }

    /// Follows the flow from offset `x` on bottom edge `e` to the top edge it
    /// exits through.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OffsetOutOfRange`] if `(e, x)` is not a point
    /// of the bottom interval.
    pub fn forward_image(&self, e: usize, x: &F) -> Result<(usize, F)> {
        let length = self.length_bot(e)?;
        if x.is_negative() || *x >= length {
            return Err(GeometryError::OffsetOutOfRange { edge: e }.into());
        }
        let tau = self.heights[e].clone() + x.clone();
        for &t in &self.top {
            let offset = tau.clone() - self.top_base(t);
            if !offset.is_negative() && offset < -self.widths[t].clone() {
                return Ok((t, offset));
            }
        }
        Err(GeometryError::OffsetOutOfRange { edge: e }.into())
    }

    /// Inverse of [`FlowMap::forward_image`]: from offset `x` on top edge `e`
    /// back to the bottom edge the flow entered through.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OffsetOutOfRange`] if `(e, x)` is not a point
    /// of the top interval.
    pub fn backward_image(&self, e: usize, x: &F) -> Result<(usize, F)> {
        let length = self.length_top(e)?;
        if x.is_negative() || *x >= length {
            return Err(GeometryError::OffsetOutOfRange { edge: e }.into());
        }
        let tau = self.top_base(e) + x.clone();
        for &b in &self.bottom {
            let offset = tau.clone() - self.heights[b].clone();
            if !offset.is_negative() && offset < self.widths[b] {
                return Ok((b, offset));
            }
        }
        Err(GeometryError::OffsetOutOfRange { edge: e }.into())
    }

    /// Transversal coordinate of the end vertex of top edge `t`.
    fn top_base(&self, t: usize) -> F {
        self.heights[(t + 1) % self.heights.len()].clone()
    }
}
