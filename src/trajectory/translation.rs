use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{Result, SurfaceError, TrajectoryError};
use crate::geometry::{FlowMap, PointPosition};
use crate::math::{linearity_coefficient, Field, Vec2};
use crate::topology::{PolygonId, Surface, TangentVector};

use super::{write_summary, SegmentInPolygon, Trajectory};

/// Where a trajectory enters a polygon.
///
/// `offset` is measured from the start vertex of `edge`, in units of the
/// transversal coordinate of the flow direction; zero means the vertex
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crossing<F> {
    pub label: PolygonId,
    pub edge: usize,
    pub offset: F,
}

/// Straight-line trajectory on a translation surface, stored as the
/// sequence of edge crossings.
///
/// Each step applies the interval exchange of the polygon being crossed.
/// These are built on first use and cached per polygon label.
pub struct StraightLineTrajectoryTranslation<'s, F> {
    surface: &'s dyn Surface<F>,
    direction: Vec2<F>,
    crossings: VecDeque<Crossing<F>>,
    /// Image of the last crossing; where the trajectory would enter next.
    forward: Crossing<F>,
    flow_maps: RefCell<HashMap<PolygonId, Rc<FlowMap<F>>>>,
}

impl<'s, F: Field> StraightLineTrajectoryTranslation<'s, F> {
    /// The one-segment trajectory through `tangent_vector`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NotTranslationSurface`] on a finite surface
    /// with a gluing that is not a translation, and
    /// [`TrajectoryError::UnrepresentableStart`] when the trajectory runs
    /// along an edge. [`super::StraightLineTrajectory`] handles those.
    pub fn new(tangent_vector: &TangentVector<'s, F>) -> Result<Self> {
        let surface = tangent_vector.surface();
        if surface.is_finite() && !surface.is_translation_surface()? {
            return Err(SurfaceError::NotTranslationSurface.into());
        }
        let direction = tangent_vector.vector().clone();
        let start = SegmentInPolygon::new(tangent_vector)?.start().clone();
        let edge = match start.position() {
            PointPosition::EdgeInterior(i) | PointPosition::Vertex(i) => i,
            PointPosition::Interior => return Err(TrajectoryError::UnrepresentableStart.into()),
        };
        let label = start.polygon_label();
        let polygon = start.polygon()?;
        if !polygon.edge(edge).wedge(&direction).is_positive() {
            return Err(TrajectoryError::UnrepresentableStart.into());
        }

        let mut trajectory = Self {
            surface,
            direction,
            crossings: VecDeque::new(),
            forward: Crossing {
                label,
                edge,
                offset: F::zero(),
            },
            flow_maps: RefCell::new(HashMap::new()),
        };
        let fraction = linearity_coefficient(
            &polygon.edge(edge),
            &(start.point().clone() - polygon.vertex(edge).clone()),
        )?;
        let offset = fraction * trajectory.flow_map(label)?.length_bot(edge)?;
        let first = Crossing {
            label,
            edge,
            offset,
        };
        trajectory.forward = trajectory.next_crossing(&first)?;
        trajectory.crossings.push_back(first);
        Ok(trajectory)
    }

    /// The flow direction.
    #[must_use]
    pub fn direction(&self) -> &Vec2<F> {
        &self.direction
    }

    /// The crossings, in order.
    pub fn crossings(&self) -> impl Iterator<Item = &Crossing<F>> {
        self.crossings.iter()
    }

    fn first(&self) -> &Crossing<F> {
        &self.crossings[0]
    }

    fn last(&self) -> &Crossing<F> {
        &self.crossings[self.crossings.len() - 1]
    }

    fn flow_map(&self, label: PolygonId) -> Result<Rc<FlowMap<F>>> {
        if let Some(map) = self.flow_maps.borrow().get(&label) {
            return Ok(Rc::clone(map));
        }
        let map = Rc::new(self.surface.polygon(label)?.flow_map(&self.direction)?);
        debug!(?label, "built flow map");
        self.flow_maps.borrow_mut().insert(label, Rc::clone(&map));
        Ok(map)
    }

    /// Crosses the polygon entered at `crossing` and steps into its
    /// neighbour.
    fn next_crossing(&self, crossing: &Crossing<F>) -> Result<Crossing<F>> {
        let (edge, offset) = self
            .flow_map(crossing.label)?
            .forward_image(crossing.edge, &crossing.offset)?;
        let (label, edge) = self.surface.opposite_edge(crossing.label, edge)?;
        Ok(Crossing {
            label,
            edge,
            offset,
        })
    }

    /// Inverse of [`Self::next_crossing`].
    fn previous_crossing(&self, crossing: &Crossing<F>) -> Result<Crossing<F>> {
        let (label, edge) = self.surface.opposite_edge(crossing.label, crossing.edge)?;
        let (edge, offset) = self
            .flow_map(label)?
            .backward_image(edge, &crossing.offset)?;
        Ok(Crossing {
            label,
            edge,
            offset,
        })
    }
}

impl<'s, F: Field> Trajectory<'s, F> for StraightLineTrajectoryTranslation<'s, F> {
    fn combinatorial_length(&self) -> usize {
        self.crossings.len()
    }

    fn segment(&self, index: usize) -> Result<SegmentInPolygon<'s, F>> {
        let crossing = self
            .crossings
            .get(index)
            .ok_or(TrajectoryError::SegmentOutOfRange {
                index,
                length: self.crossings.len(),
            })?;
        let flow_map = self.flow_map(crossing.label)?;
        let polygon = self.surface.polygon(crossing.label)?;
        let (exit, exit_offset) = flow_map.forward_image(crossing.edge, &crossing.offset)?;

        let entry_fraction = crossing.offset.clone() / flow_map.length_bot(crossing.edge)?;
        let entry_point =
            polygon.vertex(crossing.edge).clone() + polygon.edge(crossing.edge).scale(&entry_fraction);
        let exit_length = flow_map.length_top(exit)?;
        let exit_fraction = (exit_length.clone() - exit_offset) / exit_length;
        let exit_point = polygon.vertex(exit).clone() + polygon.edge(exit).scale(&exit_fraction);

        let start = TangentVector::new(
            self.surface,
            crossing.label,
            entry_point,
            self.direction.clone(),
        )?;
        let end = TangentVector::new(
            self.surface,
            crossing.label,
            exit_point,
            -self.direction.clone(),
        )?;
        Ok(SegmentInPolygon::from_endpoints(start, end))
    }

    fn flow(&mut self, steps: i64) -> Result<()> {
        if steps > 0 {
            for _ in 0..steps {
                let crossing = self.forward.clone();
                if crossing == *self.first() {
                    debug!(length = self.crossings.len(), "trajectory closed up");
                    break;
                }
                if crossing.offset.is_zero() {
                    debug!(length = self.crossings.len(), "forward flow reached a singularity");
                    break;
                }
                trace!(label = ?crossing.label, edge = crossing.edge, "appending crossing");
                self.forward = self.next_crossing(&crossing)?;
                self.crossings.push_back(crossing);
            }
        } else if steps < 0 {
            for _ in 0..steps.unsigned_abs() {
                let current = self.first();
                if current.offset.is_zero() {
                    debug!(length = self.crossings.len(), "backward flow reached a singularity");
                    break;
                }
                let crossing = self.previous_crossing(current)?;
                if crossing == *self.last() {
                    debug!(length = self.crossings.len(), "trajectory closed up");
                    break;
                }
                trace!(label = ?crossing.label, edge = crossing.edge, "prepending crossing");
                self.crossings.push_front(crossing);
            }
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        !self.is_forward_separatrix() && self.forward == *self.first()
    }

    fn is_forward_separatrix(&self) -> bool {
        self.forward.offset.is_zero()
    }

    fn is_backward_separatrix(&self) -> bool {
        self.first().offset.is_zero()
    }
}

impl<F: Field> fmt::Debug for StraightLineTrajectoryTranslation<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StraightLineTrajectoryTranslation")
            .field("direction", &self.direction)
            .field("crossings", &self.crossings)
            .field("forward", &self.forward)
            .finish_non_exhaustive()
    }
}

impl<F: Field> fmt::Display for StraightLineTrajectoryTranslation<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.segment(0).map_err(|_| fmt::Error)?;
        let last = self.last_segment().map_err(|_| fmt::Error)?;
        write_summary(f, self.crossings.len(), &first, &last)
    }
}
