mod field;
mod similarity;
mod vector;

pub use field::Field;
pub use similarity::Similarity;
pub use vector::{is_same_direction, linearity_coefficient, Vec2};

/// The exact field used throughout the tests and examples.
pub type Rational = malachite::rational::Rational;

/// Floating point 2D vector, used for angle approximations only.
pub type ApproxVector2 = nalgebra::Vector2<f64>;
