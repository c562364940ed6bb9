use std::rc::Rc;

use crate::arbiter::ArbiterId;
use crate::space::Space;

/// User-assigned category for collision handler dispatch.
pub type CollisionType = u64;

/// Matches any collision type when used as one side of a handler pair.
pub const WILDCARD_COLLISION_TYPE: CollisionType = CollisionType::MAX;

pub type BeginFn = Rc<dyn Fn(&mut Space, ArbiterId) -> bool>;
pub type PreSolveFn = Rc<dyn Fn(&mut Space, ArbiterId) -> bool>;
pub type PostSolveFn = Rc<dyn Fn(&mut Space, ArbiterId)>;
pub type SeparateFn = Rc<dyn Fn(&mut Space, ArbiterId)>;

/// Callbacks run at the four phases of a colliding pair's lifetime.
/// Unset phases behave as pass-through (begin and pre-solve accept).
#[derive(Clone)]
pub struct CollisionHandler {
    pub(crate) type_a: CollisionType,
    pub(crate) type_b: CollisionType,
    pub begin: Option<BeginFn>,
    pub pre_solve: Option<PreSolveFn>,
    pub post_solve: Option<PostSolveFn>,
    pub separate: Option<SeparateFn>,
}

impl CollisionHandler {
    pub(crate) fn pass_through(type_a: CollisionType, type_b: CollisionType) -> Self {
        Self {
            type_a,
            type_b,
            begin: None,
            pre_solve: None,
            post_solve: None,
            separate: None,
        }
    }

    pub fn type_a(&self) -> CollisionType {
        self.type_a
    }

    pub fn type_b(&self) -> CollisionType {
        self.type_b
    }
}

/// How pairs with no specific handler are dispatched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DefaultHandlerMode {
    /// No wildcard handlers exist; unmatched pairs collide with no
    /// callbacks at all.
    DoNothing,
    /// At least one wildcard handler was registered; unmatched pairs run
    /// the wildcard phases for both sides.
    Wildcards,
}

/// Handlers are looked up with the pair in a canonical order so that
/// `(a, b)` and `(b, a)` address the same record.
pub(crate) fn handler_key(a: CollisionType, b: CollisionType) -> (CollisionType, CollisionType) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handler_key_is_order_independent() {
        assert_eq!(handler_key(3, 7), handler_key(7, 3));
        assert_eq!(handler_key(5, 5), (5, 5));
    }
}
