pub mod arbiter;
pub mod arena;
pub mod body;
pub mod constraint;
pub mod handler;
pub mod pool;
pub mod shape;
pub mod space;

mod narrowphase;
mod sleep;
mod step;

pub use arbiter::{Arbiter, ArbiterId, ArbiterState, ContactPoint};
pub use body::{Body, BodyId, BodyType};
pub use constraint::{Constraint, ConstraintId};
pub use handler::{CollisionHandler, CollisionType, WILDCARD_COLLISION_TYPE};
pub use shape::{Shape, ShapeId};
pub use space::{Space, SpaceOptions};
