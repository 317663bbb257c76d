mod flow_map;
mod polygon;

pub use flow_map::FlowMap;
pub use polygon::{PointPosition, Polygon};
