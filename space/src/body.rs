use nalgebra::{Isometry2, Vector2};

use crate::arena::SlotId;
use crate::constraint::ConstraintId;
use crate::shape::ShapeId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BodyId(pub(crate) u32);

impl SlotId for BodyId {
    fn from_raw(raw: u32) -> Self {
        BodyId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyType {
    /// Moved by the integrator and the solver.
    Dynamic,
    /// Never moves and never sleeps; anchors shapes and constraints.
    Static,
}

/// A rigid body. Collision geometry hangs off it as shapes; the body
/// itself is never entered into a spatial index.
#[derive(Debug)]
pub struct Body {
    pub(crate) body_type: BodyType,
    pub(crate) position: Vector2<f32>,
    pub(crate) angle: f32,
    pub(crate) velocity: Vector2<f32>,
    pub(crate) angular_velocity: f32,
    pub(crate) force: Vector2<f32>,
    pub(crate) mass: f32,
    /// Shapes owned by this body, in insertion order.
    pub(crate) shapes: Vec<ShapeId>,
    /// Constraints with this body as an endpoint. Unordered.
    pub(crate) constraints: Vec<ConstraintId>,
    /// Slot in `Space::sleeping_components` while dormant.
    pub(crate) component: Option<usize>,
    pub(crate) idle_time: f32,
}

impl Body {
    pub fn new_dynamic(mass: f32, position: Vector2<f32>) -> Self {
        assert!(
            mass.is_finite() && mass > 0.0,
            "dynamic bodies must have a positive finite mass"
        );
        Self::new(BodyType::Dynamic, mass, position)
    }

    pub fn new_static(position: Vector2<f32>) -> Self {
        Self::new(BodyType::Static, f32::INFINITY, position)
    }

    fn new(body_type: BodyType, mass: f32, position: Vector2<f32>) -> Self {
        Self {
            body_type,
            position,
            angle: 0.0,
            velocity: Vector2::zeros(),
            angular_velocity: 0.0,
            force: Vector2::zeros(),
            mass,
            shapes: Vec::new(),
            constraints: Vec::new(),
            component: None,
            idle_time: 0.0,
        }
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn is_sleeping(&self) -> bool {
        self.component.is_some()
    }

    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    /// Directly place the body. Shapes keep their old index bounds until
    /// the owner reindexes them (`reindex_shapes_for_body`) or the next
    /// step does.
    pub fn set_position(&mut self, position: Vector2<f32>) {
        self.position = position;
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f32>) {
        self.velocity = velocity;
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass, e.g. before converting a static body to dynamic.
    pub fn set_mass(&mut self, mass: f32) {
        assert!(
            mass.is_finite() && mass > 0.0,
            "mass must be positive and finite"
        );
        self.mass = mass;
    }

    pub fn apply_force(&mut self, force: Vector2<f32>) {
        self.force += force;
    }

    pub fn apply_impulse(&mut self, impulse: Vector2<f32>) {
        self.velocity += impulse * self.inv_mass();
    }

    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }

    pub fn transform(&self) -> Isometry2<f32> {
        Isometry2::new(self.position, self.angle)
    }

    pub(crate) fn inv_mass(&self) -> f32 {
        if self.is_static() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    pub(crate) fn update_velocity(&mut self, gravity: Vector2<f32>, damping: f32, dt: f32) {
        debug_assert!(self.body_type == BodyType::Dynamic);
        self.velocity = self.velocity * damping + (gravity + self.force * self.inv_mass()) * dt;
        self.force = Vector2::zeros();
    }

    pub(crate) fn update_position(&mut self, dt: f32) {
        debug_assert!(self.body_type == BodyType::Dynamic);
        self.position += self.velocity * dt;
        self.angle += self.angular_velocity * dt;
    }
}
