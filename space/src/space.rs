use broadphase::grid::GridIndex;
use broadphase::index::SpatialIndex;
use broadphase::sweep::SweepIndex;
use broadphase::BroadphaseResult;
use fxhash::FxHashMap;
use nalgebra::Vector2;

use crate::arbiter::{Arbiter, ArbiterId, ArbiterState};
use crate::arena::Arena;
use crate::body::{Body, BodyId, BodyType};
use crate::constraint::{Constraint, ConstraintId};
use crate::handler::{
    handler_key, CollisionHandler, CollisionType, DefaultHandlerMode, WILDCARD_COLLISION_TYPE,
};
use crate::pool::ObjectPool;
use crate::shape::{Shape, ShapeId};
use crate::sleep::SleepingComponent;

/// Retired arbiters kept for reuse before falling back to the allocator.
const POOLED_ARBITER_CAP: usize = 256;

/// Tunables applied at construction. Every field can also be adjusted on
/// the space afterwards.
#[derive(Debug, Copy, Clone)]
pub struct SpaceOptions {
    pub gravity: Vector2<f32>,
    /// Fraction of velocity a body keeps over one second.
    pub damping: f32,
    /// Solver iterations per step.
    pub iterations: u32,
    /// Overlap allowed before the solver pushes shapes apart.
    pub collision_slop: f32,
    /// Fraction of penetration left unresolved after one second.
    pub collision_bias: f32,
    /// Steps a non-touching arbiter stays cached for warm starting.
    pub collision_persistence: u64,
    /// Seconds of idleness before a group may fall asleep. Infinite
    /// disables sleeping.
    pub sleep_time_threshold: f32,
    /// Speed below which a body counts as idle. Zero derives the
    /// threshold from gravity each step.
    pub idle_speed_threshold: f32,
}

impl Default for SpaceOptions {
    fn default() -> Self {
        Self {
            gravity: Vector2::zeros(),
            damping: 1.0,
            iterations: 10,
            collision_slop: 0.1,
            collision_bias: 0.9f32.powi(60),
            collision_persistence: 3,
            sleep_time_threshold: f32::INFINITY,
            idle_speed_threshold: 0.0,
        }
    }
}

pub(crate) struct PostStepCallback {
    pub(crate) key: u64,
    pub(crate) callback: Box<dyn FnOnce(&mut Space)>,
}

/// Container for a 2d rigid body simulation: bodies, their shapes, the
/// constraints joining them, and the arbiters tracking touching pairs.
///
/// The space is locked while it iterates or steps; mutating operations
/// called from inside a callback panic, and should be deferred with
/// [`Space::add_post_step_callback`] instead.
pub struct Space {
    pub gravity: Vector2<f32>,
    pub damping: f32,
    pub iterations: u32,
    pub collision_slop: f32,
    pub collision_bias: f32,
    pub collision_persistence: u64,
    pub sleep_time_threshold: f32,
    pub idle_speed_threshold: f32,

    pub(crate) locked: u32,
    pub(crate) stamp: u64,

    pub(crate) bodies: Arena<BodyId, Body>,
    pub(crate) shapes: Arena<ShapeId, Shape>,
    pub(crate) constraints_arena: Arena<ConstraintId, Constraint>,
    pub(crate) arbiters_arena: Arena<ArbiterId, Arbiter>,

    /// Awake dynamic bodies.
    pub(crate) dynamic_bodies: Vec<BodyId>,
    /// Static bodies; slot 0 is the designated static body.
    pub(crate) other_bodies: Vec<BodyId>,
    pub(crate) sleeping_components: Vec<SleepingComponent>,
    /// Bodies woken while the space was locked, activated at unlock.
    pub(crate) roused_bodies: Vec<BodyId>,
    pub(crate) constraints: Vec<ConstraintId>,
    /// Arbiters that passed their callbacks this step.
    pub(crate) arbiters: Vec<ArbiterId>,

    pub(crate) dynamic_index: Box<dyn SpatialIndex>,
    pub(crate) static_index: Box<dyn SpatialIndex>,
    pub(crate) shape_id_counter: u32,
    pub(crate) index_to_shape: FxHashMap<u32, ShapeId>,

    /// Arbiters for pairs that touched recently, keyed by the shape pair
    /// in ascending id order.
    pub(crate) cached_arbiters: FxHashMap<(ShapeId, ShapeId), ArbiterId>,
    pub(crate) pooled_arbiters: ObjectPool<Arbiter>,

    pub(crate) collision_handlers: FxHashMap<(CollisionType, CollisionType), CollisionHandler>,
    pub(crate) default_handler: Option<CollisionHandler>,
    pub(crate) default_handler_mode: DefaultHandlerMode,

    pub(crate) post_step_callbacks: Vec<PostStepCallback>,
    pub(crate) skip_post_step: bool,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    pub fn new() -> Self {
        Self::with_options(SpaceOptions::default())
    }

    pub fn with_options(options: SpaceOptions) -> Self {
        let mut bodies = Arena::new();
        let static_body = bodies.insert(Body::new_static(Vector2::zeros()));
        Self {
            gravity: options.gravity,
            damping: options.damping,
            iterations: options.iterations,
            collision_slop: options.collision_slop,
            collision_bias: options.collision_bias,
            collision_persistence: options.collision_persistence,
            sleep_time_threshold: options.sleep_time_threshold,
            idle_speed_threshold: options.idle_speed_threshold,
            locked: 0,
            stamp: 0,
            bodies,
            shapes: Arena::new(),
            constraints_arena: Arena::new(),
            arbiters_arena: Arena::new(),
            dynamic_bodies: Vec::new(),
            other_bodies: vec![static_body],
            sleeping_components: Vec::new(),
            roused_bodies: Vec::new(),
            constraints: Vec::new(),
            arbiters: Vec::new(),
            dynamic_index: Box::new(SweepIndex::new()),
            static_index: Box::new(SweepIndex::new()),
            shape_id_counter: 0,
            index_to_shape: FxHashMap::default(),
            cached_arbiters: FxHashMap::default(),
            pooled_arbiters: ObjectPool::new(POOLED_ARBITER_CAP),
            collision_handlers: FxHashMap::default(),
            default_handler: None,
            default_handler_mode: DefaultHandlerMode::DoNothing,
            post_step_callbacks: Vec::new(),
            skip_post_step: false,
        }
    }

    /// The body that anchors level geometry not attached to any body of
    /// its own. It belongs to the space and cannot be removed.
    pub fn static_body(&self) -> BodyId {
        self.other_bodies[0]
    }

    pub fn is_locked(&self) -> bool {
        self.locked > 0
    }

    pub(crate) fn lock(&mut self) {
        self.locked += 1;
    }

    /// Balance a `lock`. Hitting zero drains bodies roused during the
    /// locked section and, when `run_post_step` is set, flushes the
    /// post-step callback queue.
    pub(crate) fn unlock(&mut self, run_post_step: bool) {
        assert!(self.locked > 0, "space lock underflow");
        self.locked -= 1;
        if self.locked == 0 {
            let roused = std::mem::take(&mut self.roused_bodies);
            for body in roused {
                self.activate_body_now(body);
            }
            if run_post_step && !self.skip_post_step {
                self.skip_post_step = true;
                let callbacks = std::mem::take(&mut self.post_step_callbacks);
                for entry in callbacks {
                    (entry.callback)(self);
                }
                self.skip_post_step = false;
            }
        }
    }

    pub(crate) fn assert_unlocked(&self) {
        assert!(
            self.locked == 0,
            "this operation cannot be done while the space is locked; defer it with a post-step callback"
        );
    }

    // Object management.

    pub fn add_body(&mut self, body: Body) -> BodyId {
        self.assert_unlocked();
        let is_static = body.is_static();
        let id = self.bodies.insert(body);
        if is_static {
            self.other_bodies.push(id);
        } else {
            self.dynamic_bodies.push(id);
        }
        id
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.assert_unlocked();
        let body_id = shape.body;
        assert!(
            self.bodies.contains(body_id),
            "a shape's body must be added to the space first"
        );
        if !self.bodies[body_id].is_static() {
            self.activate_body(body_id);
        }
        let transform = self.bodies[body_id].transform();
        let is_static = self.bodies[body_id].is_static();

        let mut shape = shape;
        let index_id = self.shape_id_counter;
        self.shape_id_counter += 1;
        shape.index_id = Some(index_id);
        shape.cache_bb(&transform);
        let bb = shape.bb;

        let id = self.shapes.insert(shape);
        self.bodies[body_id].shapes.push(id);
        self.index_to_shape.insert(index_id, id);
        if is_static {
            self.static_index.insert(index_id, bb);
        } else {
            self.dynamic_index.insert(index_id, bb);
        }
        id
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> ConstraintId {
        self.assert_unlocked();
        assert!(
            self.bodies.contains(constraint.a) && self.bodies.contains(constraint.b),
            "a constraint's bodies must be added to the space first"
        );
        let (a, b) = (constraint.a, constraint.b);
        self.activate_body(a);
        self.activate_body(b);
        let id = self.constraints_arena.insert(constraint);
        self.bodies[a].constraints.push(id);
        self.bodies[b].constraints.push(id);
        self.constraints.push(id);
        id
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Shape {
        assert!(
            self.shapes.contains(id),
            "removed a shape that was not added to the space (removed twice maybe?)"
        );
        self.assert_unlocked();
        let body_id = self.shapes[id].body;
        if self.bodies[body_id].is_static() {
            self.activate_static(id);
        } else {
            self.activate_body(body_id);
        }
        self.bodies[body_id].shapes.retain(|&s| s != id);
        self.filter_arbiters(body_id, Some(id));

        if let Some(index_id) = self.shapes[id].index_id {
            if !self.dynamic_index.remove(index_id) {
                self.static_index.remove(index_id);
            }
            self.index_to_shape.remove(&index_id);
        }
        let mut shape = self.shapes.remove(id);
        shape.index_id = None;
        shape
    }

    pub fn remove_body(&mut self, id: BodyId) -> Body {
        assert!(
            id != self.static_body(),
            "the designated static body cannot be removed"
        );
        assert!(
            self.bodies.contains(id),
            "removed a body that was not added to the space (removed twice maybe?)"
        );
        self.assert_unlocked();
        assert!(
            self.bodies[id].shapes.is_empty() && self.bodies[id].constraints.is_empty(),
            "remove a body's shapes and constraints before removing the body"
        );
        self.activate_body(id);
        self.dynamic_bodies.retain(|&b| b != id);
        self.other_bodies.retain(|&b| b != id);
        self.bodies.remove(id)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Constraint {
        assert!(
            self.constraints_arena.contains(id),
            "removed a constraint that was not added to the space (removed twice maybe?)"
        );
        self.assert_unlocked();
        let (a, b) = (self.constraints_arena[id].a, self.constraints_arena[id].b);
        self.activate_body(a);
        self.activate_body(b);
        self.bodies[a].constraints.retain(|&c| c != id);
        self.bodies[b].constraints.retain(|&c| c != id);
        self.constraints.retain(|&c| c != id);
        self.constraints_arena.remove(id)
    }

    /// Convert a body between dynamic and static. Anything sleeping on
    /// the body is woken, its cached arbiters are dropped wholesale with
    /// no separate callbacks, and its shapes migrate to the other
    /// spatial index. Converting to dynamic requires the body to already
    /// carry a positive finite mass.
    pub fn set_body_type(&mut self, id: BodyId, body_type: BodyType) {
        self.assert_unlocked();
        assert!(
            id != self.static_body(),
            "the designated static body cannot change type"
        );
        if self.bodies[id].body_type == body_type {
            return;
        }
        if body_type == BodyType::Dynamic {
            let mass = self.bodies[id].mass();
            assert!(
                mass.is_finite() && mass > 0.0,
                "a dynamic body must have a positive finite mass"
            );
        }
        if self.bodies[id].is_static() {
            let shapes = self.bodies[id].shapes.clone();
            for shape in shapes {
                self.activate_static(shape);
            }
        } else {
            self.activate_body_now(id);
        }
        self.filter_arbiters(id, None);

        if body_type == BodyType::Dynamic {
            self.other_bodies.retain(|&b| b != id);
            self.dynamic_bodies.push(id);
        } else {
            self.dynamic_bodies.retain(|&b| b != id);
            self.other_bodies.push(id);
            let body = &mut self.bodies[id];
            body.velocity = Vector2::zeros();
            body.angular_velocity = 0.0;
            body.idle_time = 0.0;
        }
        self.bodies[id].body_type = body_type;

        let shapes = self.bodies[id].shapes.clone();
        for shape in shapes {
            if let Some(index_id) = self.shapes[shape].index_id {
                let bb = self.shapes[shape].bb;
                if body_type == BodyType::Static {
                    if self.dynamic_index.remove(index_id) {
                        self.static_index.insert(index_id, bb);
                    }
                } else if self.static_index.remove(index_id) {
                    self.dynamic_index.insert(index_id, bb);
                }
            }
        }
    }

    pub fn contains_body(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.shapes.contains(id)
    }

    pub fn contains_constraint(&self, id: ConstraintId) -> bool {
        self.constraints_arena.contains(id)
    }

    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id]
    }

    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id]
    }

    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        &mut self.shapes[id]
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        &self.constraints_arena[id]
    }

    pub fn arbiter(&self, id: ArbiterId) -> &Arbiter {
        &self.arbiters_arena[id]
    }

    /// Reject an arbiter for the rest of its contact; the same effect as
    /// returning false from a begin callback.
    pub fn ignore_arbiter(&mut self, id: ArbiterId) {
        self.arbiters_arena[id].state = ArbiterState::Ignore;
    }

    /// Arbiters that passed their callbacks in the last step.
    pub fn active_arbiters(&self) -> &[ArbiterId] {
        &self.arbiters
    }

    pub fn cached_arbiter_count(&self) -> usize {
        self.cached_arbiters.len()
    }

    // Post-step callbacks.

    /// Defer work until the space unlocks. Only the first callback
    /// registered against a key is kept, so idempotent cleanup can be
    /// scheduled from every callback that needs it. Runs immediately when
    /// the space is not locked. Returns whether the callback was
    /// scheduled (or run).
    pub fn add_post_step_callback(
        &mut self,
        key: u64,
        callback: impl FnOnce(&mut Space) + 'static,
    ) -> bool {
        if self.locked == 0 {
            callback(self);
            return true;
        }
        if self.post_step_callbacks.iter().any(|entry| entry.key == key) {
            return false;
        }
        self.post_step_callbacks.push(PostStepCallback {
            key,
            callback: Box::new(callback),
        });
        true
    }

    // Iteration.

    /// Visit every body: awake dynamic bodies first, then the members of
    /// each sleeping group. The space is locked for the duration; the
    /// callback may schedule post-step work but not mutate directly.
    pub fn each_body(&mut self, mut f: impl FnMut(&mut Space, BodyId)) {
        self.lock();
        let mut ids = self.dynamic_bodies.clone();
        for component in &self.sleeping_components {
            ids.extend_from_slice(&component.bodies);
        }
        for id in ids {
            if self.bodies.contains(id) {
                f(self, id);
            }
        }
        self.unlock(true);
    }

    /// Visit every shape, dynamic before static.
    pub fn each_shape(&mut self, mut f: impl FnMut(&mut Space, ShapeId)) {
        self.lock();
        let mut ids = Vec::with_capacity(self.shapes.len());
        {
            let map = &self.index_to_shape;
            self.dynamic_index.each(&mut |index_id| {
                if let Some(&shape) = map.get(&index_id) {
                    ids.push(shape);
                }
            });
            self.static_index.each(&mut |index_id| {
                if let Some(&shape) = map.get(&index_id) {
                    ids.push(shape);
                }
            });
        }
        for id in ids {
            if self.shapes.contains(id) {
                f(self, id);
            }
        }
        self.unlock(true);
    }

    pub fn each_constraint(&mut self, mut f: impl FnMut(&mut Space, ConstraintId)) {
        self.lock();
        let ids = self.constraints.clone();
        for id in ids {
            if self.constraints_arena.contains(id) {
                f(self, id);
            }
        }
        self.unlock(true);
    }

    // Spatial index maintenance.

    /// Recompute the bounds of every static shape and rebuild the static
    /// index. Call after moving static geometry.
    pub fn reindex_static(&mut self) {
        self.assert_unlocked();
        let mut index_ids = Vec::with_capacity(self.static_index.len());
        self.static_index.each(&mut |index_id| index_ids.push(index_id));
        for index_id in index_ids {
            if let Some(&shape_id) = self.index_to_shape.get(&index_id) {
                let transform = self.bodies[self.shapes[shape_id].body].transform();
                self.shapes[shape_id].cache_bb(&transform);
                let bb = self.shapes[shape_id].bb;
                self.static_index.reindex(index_id, bb);
            }
        }
        self.static_index.reindex_all();
    }

    /// Recompute one shape's bounds and update whichever index tracks it.
    pub fn reindex_shape(&mut self, id: ShapeId) {
        self.assert_unlocked();
        let transform = self.bodies[self.shapes[id].body].transform();
        self.shapes[id].cache_bb(&transform);
        let bb = self.shapes[id].bb;
        if let Some(index_id) = self.shapes[id].index_id {
            if !self.dynamic_index.reindex(index_id, bb) {
                self.static_index.reindex(index_id, bb);
            }
        }
    }

    pub fn reindex_shapes_for_body(&mut self, body: BodyId) {
        let shapes = self.bodies[body].shapes.clone();
        for shape in shapes {
            self.reindex_shape(shape);
        }
    }

    /// Swap both spatial indexes for uniform grids sized for the given
    /// cell dimension and expected object count, carrying over all
    /// tracked shapes.
    pub fn use_spatial_hash(&mut self, cell_dim: f32, count: usize) -> BroadphaseResult<()> {
        self.assert_unlocked();
        let mut static_grid = GridIndex::new(cell_dim, count)?;
        let mut dynamic_grid = GridIndex::new(cell_dim, count)?;

        let copy = |from: &dyn SpatialIndex, to: &mut GridIndex| {
            let mut ids = Vec::with_capacity(from.len());
            from.each(&mut |id| ids.push(id));
            for id in ids {
                if let Some(bb) = from.bb(id) {
                    to.insert(id, bb);
                }
            }
        };
        copy(self.static_index.as_ref(), &mut static_grid);
        copy(self.dynamic_index.as_ref(), &mut dynamic_grid);

        self.static_index = Box::new(static_grid);
        self.dynamic_index = Box::new(dynamic_grid);
        Ok(())
    }

    // Collision handlers.

    /// The handler record for an unordered pair of collision types,
    /// created as a pass-through on first use. `(a, b)` and `(b, a)`
    /// address the same record.
    pub fn add_collision_handler(
        &mut self,
        type_a: CollisionType,
        type_b: CollisionType,
    ) -> &mut CollisionHandler {
        let key = handler_key(type_a, type_b);
        self.collision_handlers
            .entry(key)
            .or_insert_with(|| CollisionHandler::pass_through(type_a, type_b))
    }

    /// A handler matching pairs where either shape has the given type.
    /// Registering any wildcard handler switches unmatched pairs from
    /// no-op dispatch to running the wildcard phases of both sides.
    pub fn add_wildcard_handler(&mut self, collision_type: CollisionType) -> &mut CollisionHandler {
        self.default_handler_mode = DefaultHandlerMode::Wildcards;
        let key = handler_key(collision_type, WILDCARD_COLLISION_TYPE);
        self.collision_handlers
            .entry(key)
            .or_insert_with(|| {
                CollisionHandler::pass_through(collision_type, WILDCARD_COLLISION_TYPE)
            })
    }

    /// The handler run for pairs with no specific handler. Phases it
    /// sets replace wildcard dispatch for those pairs; phases it leaves
    /// unset still run the wildcard callbacks of both sides. Registering
    /// it engages wildcard dispatch just like `add_wildcard_handler`.
    pub fn add_default_handler(&mut self) -> &mut CollisionHandler {
        self.default_handler_mode = DefaultHandlerMode::Wildcards;
        self.default_handler.get_or_insert_with(|| {
            CollisionHandler::pass_through(WILDCARD_COLLISION_TYPE, WILDCARD_COLLISION_TYPE)
        })
    }

    // Handler dispatch. Callbacks take `&mut Space`, so the callback is
    // cloned out of the handler table before the call.

    pub(crate) fn dispatch_begin(&mut self, id: ArbiterId) -> bool {
        let (type_a, type_b) = self.arbiter_types(id);
        if let Some(handler) = self.collision_handlers.get(&handler_key(type_a, type_b)) {
            let begin = handler.begin.clone();
            return match begin {
                Some(f) => f(self, id),
                None => true,
            };
        }
        // A default handler replaces only the phases it sets; unset
        // phases fall through to wildcard dispatch.
        if let Some(f) = self.default_handler.as_ref().and_then(|h| h.begin.clone()) {
            return f(self, id);
        }
        if self.default_handler_mode == DefaultHandlerMode::Wildcards {
            let a_ok = self.wildcard_begin(id, type_a);
            let b_ok = self.wildcard_begin(id, type_b);
            return a_ok && b_ok;
        }
        true
    }

    pub(crate) fn dispatch_pre_solve(&mut self, id: ArbiterId) -> bool {
        let (type_a, type_b) = self.arbiter_types(id);
        if let Some(handler) = self.collision_handlers.get(&handler_key(type_a, type_b)) {
            let pre_solve = handler.pre_solve.clone();
            return match pre_solve {
                Some(f) => f(self, id),
                None => true,
            };
        }
        if let Some(f) = self
            .default_handler
            .as_ref()
            .and_then(|h| h.pre_solve.clone())
        {
            return f(self, id);
        }
        if self.default_handler_mode == DefaultHandlerMode::Wildcards {
            let a_ok = self.wildcard_pre_solve(id, type_a);
            let b_ok = self.wildcard_pre_solve(id, type_b);
            return a_ok && b_ok;
        }
        true
    }

    pub(crate) fn dispatch_post_solve(&mut self, id: ArbiterId) {
        let (type_a, type_b) = self.arbiter_types(id);
        if let Some(handler) = self.collision_handlers.get(&handler_key(type_a, type_b)) {
            if let Some(f) = handler.post_solve.clone() {
                f(self, id);
            }
            return;
        }
        if let Some(f) = self
            .default_handler
            .as_ref()
            .and_then(|h| h.post_solve.clone())
        {
            f(self, id);
            return;
        }
        if self.default_handler_mode == DefaultHandlerMode::Wildcards {
            self.wildcard_post_solve(id, type_a);
            self.wildcard_post_solve(id, type_b);
        }
    }

    pub(crate) fn dispatch_separate(&mut self, id: ArbiterId) {
        let (type_a, type_b) = self.arbiter_types(id);
        if let Some(handler) = self.collision_handlers.get(&handler_key(type_a, type_b)) {
            if let Some(f) = handler.separate.clone() {
                f(self, id);
            }
            return;
        }
        if let Some(f) = self
            .default_handler
            .as_ref()
            .and_then(|h| h.separate.clone())
        {
            f(self, id);
            return;
        }
        if self.default_handler_mode == DefaultHandlerMode::Wildcards {
            self.wildcard_separate(id, type_a);
            self.wildcard_separate(id, type_b);
        }
    }

    fn arbiter_types(&self, id: ArbiterId) -> (CollisionType, CollisionType) {
        let arbiter = &self.arbiters_arena[id];
        (
            self.shapes[arbiter.a].collision_type,
            self.shapes[arbiter.b].collision_type,
        )
    }

    fn wildcard_begin(&mut self, id: ArbiterId, collision_type: CollisionType) -> bool {
        let f = self
            .collision_handlers
            .get(&handler_key(collision_type, WILDCARD_COLLISION_TYPE))
            .and_then(|handler| handler.begin.clone());
        match f {
            Some(f) => f(self, id),
            None => true,
        }
    }

    fn wildcard_pre_solve(&mut self, id: ArbiterId, collision_type: CollisionType) -> bool {
        let f = self
            .collision_handlers
            .get(&handler_key(collision_type, WILDCARD_COLLISION_TYPE))
            .and_then(|handler| handler.pre_solve.clone());
        match f {
            Some(f) => f(self, id),
            None => true,
        }
    }

    fn wildcard_post_solve(&mut self, id: ArbiterId, collision_type: CollisionType) {
        let f = self
            .collision_handlers
            .get(&handler_key(collision_type, WILDCARD_COLLISION_TYPE))
            .and_then(|handler| handler.post_solve.clone());
        if let Some(f) = f {
            f(self, id);
        }
    }

    fn wildcard_separate(&mut self, id: ArbiterId, collision_type: CollisionType) {
        let f = self
            .collision_handlers
            .get(&handler_key(collision_type, WILDCARD_COLLISION_TYPE))
            .and_then(|handler| handler.separate.clone());
        if let Some(f) = f {
            f(self, id);
        }
    }

    /// Tear down cached arbiters involving `body`. With a filter shape,
    /// only that shape's arbiters go, and pairs still in contact get
    /// their separate callback; without one (body type change) everything
    /// goes quietly.
    pub(crate) fn filter_arbiters(&mut self, body: BodyId, filter: Option<ShapeId>) {
        self.lock();
        let mut matches = Vec::new();
        for (&key, &arbiter_id) in &self.cached_arbiters {
            let arbiter = &self.arbiters_arena[arbiter_id];
            if arbiter.body_a != body && arbiter.body_b != body {
                continue;
            }
            if let Some(shape) = filter {
                if arbiter.a != shape && arbiter.b != shape {
                    continue;
                }
            }
            matches.push((key, arbiter_id));
        }
        for (key, arbiter_id) in matches {
            if filter.is_some() && self.arbiters_arena[arbiter_id].state != ArbiterState::Cached {
                self.arbiters_arena[arbiter_id].state = ArbiterState::Invalidated;
                self.dispatch_separate(arbiter_id);
            }
            self.cached_arbiters.remove(&key);
            self.arbiters.retain(|&a| a != arbiter_id);
            let arbiter = self.arbiters_arena.remove(arbiter_id);
            self.pooled_arbiters.put(arbiter);
        }
        self.unlock(true);
    }
}
