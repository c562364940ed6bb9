use common::bb::Bb;
use common::shapes::ShapeGeometry;
use nalgebra::Isometry2;

use crate::arena::SlotId;
use crate::body::BodyId;
use crate::handler::CollisionType;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub(crate) u32);

impl SlotId for ShapeId {
    fn from_raw(raw: u32) -> Self {
        ShapeId(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

/// Collision geometry attached to a body.
#[derive(Debug)]
pub struct Shape {
    pub(crate) body: BodyId,
    pub(crate) geometry: ShapeGeometry,
    pub(crate) collision_type: CollisionType,
    pub(crate) elasticity: f32,
    pub(crate) friction: f32,
    /// World-space bounds cached from the last reindex.
    pub(crate) bb: Bb,
    /// Space-unique key in the spatial index; `None` while unindexed.
    pub(crate) index_id: Option<u32>,
}

impl Shape {
    pub fn new(body: BodyId, geometry: ShapeGeometry) -> Self {
        Self {
            body,
            geometry,
            collision_type: 0,
            elasticity: 0.0,
            friction: 0.0,
            bb: Bb::new(0.0, 0.0, 0.0, 0.0),
            index_id: None,
        }
    }

    pub fn with_collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn collision_type(&self) -> CollisionType {
        self.collision_type
    }

    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn bb(&self) -> Bb {
        self.bb
    }

    pub(crate) fn cache_bb(&mut self, transform: &Isometry2<f32>) {
        self.bb = self.geometry.bb(transform);
    }
}
