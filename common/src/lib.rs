pub mod bb;
pub mod shapes;

pub use bb::Bb;
pub use shapes::ShapeGeometry;
