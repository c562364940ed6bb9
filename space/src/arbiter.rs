use nalgebra::Vector2;
use smallvec::SmallVec;

use crate::arena::SlotId;
use crate::body::BodyId;
use crate::pool::Resettable;
use crate::shape::ShapeId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArbiterId(pub(crate) u32);

impl SlotId for ArbiterId {
    fn from_raw(raw: u32) -> Self {
        ArbiterId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArbiterState {
    /// The pair touched this step and was not touching last step.
    FirstCollision,
    /// The pair has been touching for more than one step.
    Normal,
    /// A begin callback rejected the pair; it stays rejected until the
    /// shapes separate.
    Ignore,
    /// The shapes stopped touching but the arbiter is kept warm in case
    /// contact resumes within the persistence window.
    Cached,
    /// Torn down by shape removal; only the separate dispatch sees this.
    Invalidated,
}

/// One contact point within an arbiter. `jn_acc`/`jt_acc` carry the
/// accumulated impulses across steps for warm starting.
#[derive(Debug, Copy, Clone)]
pub struct ContactPoint {
    pub point: Vector2<f32>,
    pub normal: Vector2<f32>,
    pub dist: f32,
    pub(crate) jn_acc: f32,
    pub(crate) jt_acc: f32,
    pub(crate) bounce: f32,
}

impl ContactPoint {
    pub(crate) fn new(point: Vector2<f32>, normal: Vector2<f32>, dist: f32) -> Self {
        Self {
            point,
            normal,
            dist,
            jn_acc: 0.0,
            jt_acc: 0.0,
            bounce: 0.0,
        }
    }
}

/// Tracks one touching (or recently touching) pair of shapes. Arbiters
/// are created by the step loop, cached across steps keyed by the shape
/// pair, and recycled through the space's pool once stale.
#[derive(Debug)]
pub struct Arbiter {
    pub(crate) a: ShapeId,
    pub(crate) b: ShapeId,
    pub(crate) body_a: BodyId,
    pub(crate) body_b: BodyId,
    pub(crate) contacts: SmallVec<[ContactPoint; 2]>,
    pub(crate) state: ArbiterState,
    /// Step stamp of the last touching update.
    pub(crate) stamp: u64,
    pub(crate) restitution: f32,
    pub(crate) friction: f32,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self {
            a: ShapeId(u32::MAX),
            b: ShapeId(u32::MAX),
            body_a: BodyId(u32::MAX),
            body_b: BodyId(u32::MAX),
            contacts: SmallVec::new(),
            state: ArbiterState::FirstCollision,
            stamp: 0,
            restitution: 0.0,
            friction: 0.0,
        }
    }
}

impl Resettable for Arbiter {
    fn reset(&mut self) {
        self.a = ShapeId(u32::MAX);
        self.b = ShapeId(u32::MAX);
        self.body_a = BodyId(u32::MAX);
        self.body_b = BodyId(u32::MAX);
        self.contacts.clear();
        self.state = ArbiterState::FirstCollision;
        self.stamp = 0;
        self.restitution = 0.0;
        self.friction = 0.0;
    }
}

impl Arbiter {
    pub fn shapes(&self) -> (ShapeId, ShapeId) {
        (self.a, self.b)
    }

    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.body_a, self.body_b)
    }

    pub fn is_first_contact(&self) -> bool {
        self.state == ArbiterState::FirstCollision
    }

    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    /// Total normal impulse applied last solve, summed over contacts.
    pub fn total_impulse(&self) -> Vector2<f32> {
        let mut sum = Vector2::zeros();
        for contact in &self.contacts {
            sum += contact.normal * contact.jn_acc;
        }
        sum
    }

    /// Replace the contact set with freshly collided points, carrying
    /// accumulated impulses over from old contacts that landed near the
    /// same spot. A cached arbiter coming back into contact counts as a
    /// fresh collision.
    pub(crate) fn update_contacts(
        &mut self,
        mut contacts: SmallVec<[ContactPoint; 2]>,
        match_dist: f32,
    ) {
        for new in contacts.iter_mut() {
            for old in &self.contacts {
                if (new.point - old.point).norm_squared() < match_dist * match_dist {
                    new.jn_acc = old.jn_acc;
                    new.jt_acc = old.jt_acc;
                    break;
                }
            }
        }
        self.contacts = contacts;
        if self.state == ArbiterState::Cached {
            self.state = ArbiterState::FirstCollision;
        }
    }

    /// Reverse the orientation so `a`/`body_a` line up with how the
    /// collision handler was registered.
    pub(crate) fn swap_sides(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
        std::mem::swap(&mut self.body_a, &mut self.body_b);
        for contact in self.contacts.iter_mut() {
            contact.normal = -contact.normal;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_update_contacts_carries_impulses() {
        let mut arb = Arbiter::default();
        let mut old = ContactPoint::new(Vector2::new(1.0, 1.0), Vector2::new(0.0, 1.0), -0.1);
        old.jn_acc = 5.0;
        old.jt_acc = 2.0;
        arb.contacts.push(old);
        arb.state = ArbiterState::Normal;

        let fresh = ContactPoint::new(Vector2::new(1.02, 0.99), Vector2::new(0.0, 1.0), -0.05);
        arb.update_contacts(SmallVec::from_vec(vec![fresh]), 0.1);
        assert_eq!(arb.contacts[0].jn_acc, 5.0);
        assert_eq!(arb.contacts[0].jt_acc, 2.0);
        assert_eq!(arb.state(), ArbiterState::Normal);
    }

    #[test]
    fn test_cached_arbiter_becomes_first_collision() {
        let mut arb = Arbiter::default();
        arb.state = ArbiterState::Cached;
        let fresh = ContactPoint::new(Vector2::zeros(), Vector2::new(1.0, 0.0), -0.01);
        arb.update_contacts(SmallVec::from_vec(vec![fresh]), 0.1);
        assert!(arb.is_first_contact());
    }

    #[test]
    fn test_swap_sides_flips_normals() {
        let mut arb = Arbiter::default();
        arb.a = ShapeId(1);
        arb.b = ShapeId(2);
        arb.contacts
            .push(ContactPoint::new(Vector2::zeros(), Vector2::new(0.0, 1.0), 0.0));
        arb.swap_sides();
        assert_eq!(arb.a, ShapeId(2));
        assert_eq!(arb.contacts[0].normal, Vector2::new(0.0, -1.0));
    }
}
