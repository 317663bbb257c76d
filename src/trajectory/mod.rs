//! Straight-line trajectories.
//!
//! Two implementations share the [`Trajectory`] interface:
//! [`StraightLineTrajectory`] stores one [`SegmentInPolygon`] per polygon
//! crossed and works on any similarity surface, while
//! [`StraightLineTrajectoryTranslation`] only stores where it crosses each
//! edge and advances through per-polygon interval exchanges, which requires
//! a translation surface.

mod segment;
mod straight_line;
mod translation;


use std::collections::HashMap;
use std::fmt;

pub use segment::SegmentInPolygon;
pub use straight_line::StraightLineTrajectory;
pub use translation::{Crossing, StraightLineTrajectoryTranslation};

use crate::error::Result;
use crate::math::Field;
use crate::topology::PolygonId;

/// A straight-line trajectory that can be extended at both ends.
pub trait Trajectory<'s, F: Field> {
    /// Number of segments.
    fn combinatorial_length(&self) -> usize;

    /// Segment `index`, counted from the current first segment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrajectoryError::SegmentOutOfRange`] for an
    /// index past the end.
    fn segment(&self, index: usize) -> Result<SegmentInPolygon<'s, F>>;

    /// All segments in order.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trajectory::segment`].
    fn segments(&self) -> Result<Vec<SegmentInPolygon<'s, F>>> {
        (0..self.combinatorial_length())
            .map(|i| self.segment(i))
            .collect()
    }

    /// The last segment.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trajectory::segment`].
    fn last_segment(&self) -> Result<SegmentInPolygon<'s, F>> {
        self.segment(self.combinatorial_length().saturating_sub(1))
    }

    /// Appends up to `steps` segments when positive, prepends up to `-steps`
    /// when negative.
    ///
    /// Stops early, without error, on reaching a singularity or closing up.
    ///
    /// # Errors
    ///
    /// Returns surface lookup errors, such as crossing an unglued edge.
    fn flow(&mut self, steps: i64) -> Result<()>;

    /// Whether continuing forward returns to the first segment's start.
    fn is_closed(&self) -> bool;

    /// Whether the trajectory ends at a singularity.
    fn is_forward_separatrix(&self) -> bool;

    /// Whether the trajectory starts at a singularity.
    fn is_backward_separatrix(&self) -> bool;

    /// Whether both ends are singularities.
    fn is_saddle_connection(&self) -> bool {
        self.is_forward_separatrix() && self.is_backward_separatrix()
    }

    /// The `(label, edge)` pairs crossed, in order.
    ///
    /// The first start and the last end are included when they lie inside an
    /// edge; the last end is left out when it closes onto the first start.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trajectory::segments`].
    fn coding(&self) -> Result<Vec<(PolygonId, usize)>> {
        let segments = self.segments()?;
        let mut crossings = Vec::new();
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Ok(crossings);
        };

        if let Some(edge) = first.start().position().edge() {
            crossings.push((first.polygon_label(), edge));
        }
        for segment in &segments[..segments.len() - 1] {
            if let Some(edge) = segment.end().position().edge() {
                crossings.push((segment.polygon_label(), edge));
            }
        }
        if let Some(edge) = last.end().position().edge() {
            if last.end().invert()? != *first.start() {
                crossings.push((last.polygon_label(), edge));
            }
        }
        Ok(crossings)
    }

    /// [`Trajectory::coding`] translated through `alphabet`; pairs missing
    /// from it are skipped.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Trajectory::segments`].
    fn coding_with<A: Clone>(&self, alphabet: &HashMap<(PolygonId, usize), A>) -> Result<Vec<A>>
    where
        Self: Sized,
    {
        Ok(self
            .coding()?
            .iter()
            .filter_map(|crossing| alphabet.get(crossing).cloned())
            .collect())
    }
}

fn write_summary<F: Field>(
    f: &mut fmt::Formatter<'_>,
    length: usize,
    first: &SegmentInPolygon<'_, F>,
    last: &SegmentInPolygon<'_, F>,
) -> fmt::Result {
    write!(
        f,
        "Straight line trajectory made of {length} segments from {} in polygon {:?} to {} in polygon {:?}",
        first.start().point(),
        first.polygon_label(),
        last.end().point(),
        last.polygon_label()
    )
}
