use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::error::{Result, TrajectoryError};
use crate::math::Field;
use crate::topology::TangentVector;

use super::{write_summary, SegmentInPolygon, Trajectory};

/// Straight-line trajectory on a similarity surface, stored segment by
/// segment.
///
/// The vectors continuing the trajectory past either end are cached; a
/// missing one means that end is a singularity.
#[derive(Debug, Clone)]
pub struct StraightLineTrajectory<'s, F> {
    segments: VecDeque<SegmentInPolygon<'s, F>>,
    forward: Option<TangentVector<'s, F>>,
    backward: Option<TangentVector<'s, F>>,
}

impl<'s, F: Field> StraightLineTrajectory<'s, F> {
    /// The one-segment trajectory through `tangent_vector`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SegmentInPolygon::new`], and surface lookup
    /// errors when an end lies on an unglued edge.
    pub fn new(tangent_vector: &TangentVector<'s, F>) -> Result<Self> {
        let segment = SegmentInPolygon::new(tangent_vector)?;
        let forward = continuation(segment.end())?;
        let backward = continuation(segment.start())?;
        Ok(Self {
            segments: VecDeque::from([segment]),
            forward,
            backward,
        })
    }

    /// Start of the first segment, pointing forward.
    #[must_use]
    pub fn initial_tangent_vector(&self) -> &TangentVector<'s, F> {
        self.first().start()
    }

    /// End of the last segment, pointing backward.
    #[must_use]
    pub fn terminal_tangent_vector(&self) -> &TangentVector<'s, F> {
        self.last().end()
    }

    fn first(&self) -> &SegmentInPolygon<'s, F> {
        &self.segments[0]
    }

    fn last(&self) -> &SegmentInPolygon<'s, F> {
        &self.segments[self.segments.len() - 1]
    }
}

/// The vector continuing a trajectory past `endpoint`, if it is not a vertex.
fn continuation<'s, F: Field>(
    endpoint: &TangentVector<'s, F>,
) -> Result<Option<TangentVector<'s, F>>> {
    if endpoint.is_based_at_singularity() {
        Ok(None)
    } else {
        endpoint.invert().map(Some)
    }
}

impl<'s, F: Field> Trajectory<'s, F> for StraightLineTrajectory<'s, F> {
    fn combinatorial_length(&self) -> usize {
        self.segments.len()
    }

    fn segment(&self, index: usize) -> Result<SegmentInPolygon<'s, F>> {
        self.segments.get(index).cloned().ok_or_else(|| {
            TrajectoryError::SegmentOutOfRange {
                index,
                length: self.segments.len(),
            }
            .into()
        })
    }

    fn segments(&self) -> Result<Vec<SegmentInPolygon<'s, F>>> {
        Ok(self.segments.iter().cloned().collect())
    }

    fn flow(&mut self, steps: i64) -> Result<()> {
        let mut remaining = steps;
        while remaining > 0 {
            if self.is_closed() {
                debug!(length = self.segments.len(), "trajectory closed up");
                break;
            }
            let Some(forward) = &self.forward else {
                debug!(length = self.segments.len(), "forward flow reached a singularity");
                break;
            };
            let segment = SegmentInPolygon::new(forward)?;
            trace!(%segment, "appending segment");
            self.forward = continuation(segment.end())?;
            self.segments.push_back(segment);
            remaining -= 1;
        }
        while remaining < 0 {
            if self.is_closed() {
                debug!(length = self.segments.len(), "trajectory closed up");
                break;
            }
            let Some(backward) = &self.backward else {
                debug!(length = self.segments.len(), "backward flow reached a singularity");
                break;
            };
            let segment = SegmentInPolygon::new(backward)?.invert();
            trace!(%segment, "prepending segment");
            self.backward = continuation(segment.start())?;
            self.segments.push_front(segment);
            remaining += 1;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.forward
            .as_ref()
            .is_some_and(|forward| forward.differs_by_scaling(self.initial_tangent_vector()))
    }

    fn is_forward_separatrix(&self) -> bool {
        self.forward.is_none()
    }

    fn is_backward_separatrix(&self) -> bool {
        self.backward.is_none()
    }
}

impl<F: Field> fmt::Display for StraightLineTrajectory<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self.segments.len(), self.first(), self.last())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::fixtures::*;

    #[test]
    fn flows_across_similarity_gluings() {
        let (s, p0, p1) = similarity_example();
        let tv = s.tangent_vector(p0, v(q(1, 1), q(-1, 2)), vi(3, -1)).unwrap();
        let mut l = StraightLineTrajectory::new(&tv).unwrap();
        assert_eq!(
            l.to_string(),
            format!(
                "Straight line trajectory made of 1 segments from (1/4, -1/4) in polygon {p0:?} to (2, -5/6) in polygon {p0:?}"
            )
        );

        l.flow(1).unwrap();
        assert_eq!(
            l.to_string(),
            format!(
                "Straight line trajectory made of 2 segments from (1/4, -1/4) in polygon {p0:?} to (61/36, 11/12) in polygon {p1:?}"
            )
        );
        assert_eq!(l.segment(1).unwrap().start().point(), &v(q(7, 12), q(7, 4)));

        l.flow(-1).unwrap();
        assert_eq!(
            l.to_string(),
            format!(
                "Straight line trajectory made of 3 segments from (15/16, 45/16) in polygon {p1:?} to (61/36, 11/12) in polygon {p1:?}"
            )
        );
        let first = l.initial_tangent_vector();
        assert_eq!(first.polygon_label(), p1);
        assert_eq!(l.terminal_tangent_vector().point(), &v(q(61, 36), q(11, 12)));
    }

    #[test]
    fn segments_chain_together() {
        let (s, p0, _) = similarity_example();
        let tv = s.tangent_vector(p0, v(q(1, 1), q(-1, 2)), vi(3, -1)).unwrap();
        let mut l = StraightLineTrajectory::new(&tv).unwrap();
        l.flow(3).unwrap();
        l.flow(-3).unwrap();
        let segments = l.segments().unwrap();
        for pair in segments.windows(2) {
            assert_eq!(pair[0].next().unwrap(), pair[1]);
        }
        assert!(l.segment(segments.len()).is_err());
    }

    #[test]
    fn torus_diagonal_closes() {
        let (s, p) = square_torus();
        let tv = s.tangent_vector(p, v(q(1, 2), q(0, 1)), vi(1, 1)).unwrap();
        let mut l = StraightLineTrajectory::new(&tv).unwrap();
        assert!(!l.is_closed());
        l.flow(10).unwrap();
        assert!(l.is_closed());
        assert_eq!(l.combinatorial_length(), 2);
        assert_eq!(l.coding().unwrap(), vec![(p, 0), (p, 1)]);
        l.flow(-10).unwrap();
        assert_eq!(l.combinatorial_length(), 2);
    }

    #[test]
    fn torus_separatrices() {
        let (s, p) = square_torus();
        let tv = s.tangent_vector(p, v(q(1, 2), q(1, 2)), vi(1, 1)).unwrap();
        let l = StraightLineTrajectory::new(&tv).unwrap();
        assert!(l.is_saddle_connection());

        let tv = s.tangent_vector(p, v(q(1, 3), q(2, 3)), vi(1, 2)).unwrap();
        let mut l = StraightLineTrajectory::new(&tv).unwrap();
        assert!(l.is_backward_separatrix());
        assert!(!l.is_saddle_connection());
        l.flow(1).unwrap();
        assert!(l.is_saddle_connection());
        assert_eq!(l.combinatorial_length(), 2);
    }
}
