pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod topology;
pub mod trajectory;

pub use error::{FlatflowError, Result};
