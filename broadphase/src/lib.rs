pub mod error;
pub mod grid;
pub mod index;
pub mod sweep;

pub use error::{BroadphaseError, BroadphaseResult};
pub use grid::GridIndex;
pub use index::SpatialIndex;
pub use sweep::SweepIndex;
