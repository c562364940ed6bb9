use crate::arena::SlotId;
use crate::body::BodyId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub(crate) u32);

impl SlotId for ConstraintId {
    fn from_raw(raw: u32) -> Self {
        ConstraintId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

/// A joint between two bodies. The space tracks constraints for
/// activation and sleeping-component traversal; the numeric solve happens
/// in the external solver.
#[derive(Debug)]
pub struct Constraint {
    pub(crate) a: BodyId,
    pub(crate) b: BodyId,
    pub(crate) max_force: f32,
}

impl Constraint {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        assert!(a != b, "a constraint must join two distinct bodies");
        Self {
            a,
            b,
            max_force: f32::INFINITY,
        }
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn a(&self) -> BodyId {
        self.a
    }

    pub fn b(&self) -> BodyId {
        self.b
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }
}
