use nalgebra::Vector2;

use crate::arbiter::ArbiterState;
use crate::body::{Body, BodyId};
use crate::handler::handler_key;
use crate::narrowphase;
use crate::shape::ShapeId;
use crate::space::Space;

impl Space {
    /// Advance the simulation by `dt` seconds: integrate bodies, refresh
    /// the dynamic index, run narrow phase and collision callbacks, prune
    /// stale arbiters, update sleeping, and solve contact impulses.
    /// Non-positive `dt` is a no-op.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.stamp += 1;
        self.lock();

        // Last step's arbiters are no longer first contacts.
        let previous = std::mem::take(&mut self.arbiters);
        for arbiter_id in previous {
            let arbiter = &mut self.arbiters_arena[arbiter_id];
            if arbiter.state == ArbiterState::FirstCollision {
                arbiter.state = ArbiterState::Normal;
            }
        }

        let gravity = self.gravity;
        let damping = self.damping.powf(dt);
        let awake = self.dynamic_bodies.clone();
        for &id in &awake {
            let body = &mut self.bodies[id];
            body.update_velocity(gravity, damping, dt);
            body.update_position(dt);
        }

        for &id in &awake {
            let transform = self.bodies[id].transform();
            let displacement = self.bodies[id].velocity * dt;
            let shapes = self.bodies[id].shapes.clone();
            for shape_id in shapes {
                let shape = &mut self.shapes[shape_id];
                shape.bb = shape.geometry.bb(&transform).swept(displacement);
                if let Some(index_id) = shape.index_id {
                    let bb = shape.bb;
                    self.dynamic_index.reindex(index_id, bb);
                }
            }
        }

        let mut pairs: Vec<(ShapeId, ShapeId)> = Vec::new();
        {
            let map = &self.index_to_shape;
            self.dynamic_index.each_pair(&mut |i, j| {
                if let (Some(&a), Some(&b)) = (map.get(&i), map.get(&j)) {
                    pairs.push((a, b));
                }
            });
            let mut dynamic_entries = Vec::with_capacity(self.dynamic_index.len());
            self.dynamic_index
                .each(&mut |index_id| dynamic_entries.push(index_id));
            for index_id in dynamic_entries {
                let (shape, bb) = match (map.get(&index_id), self.dynamic_index.bb(index_id)) {
                    (Some(&shape), Some(bb)) => (shape, bb),
                    _ => continue,
                };
                self.static_index.query(bb, &mut |other_index| {
                    if let Some(&other) = map.get(&other_index) {
                        pairs.push((shape, other));
                    }
                });
            }
        }
        for (a, b) in pairs {
            self.collide_shapes(a, b);
        }

        self.prune_cached_arbiters();
        self.process_components(dt);
        self.solve(dt);

        let active = self.arbiters.clone();
        for arbiter_id in active {
            self.dispatch_post_solve(arbiter_id);
        }

        self.unlock(true);
    }

    /// Narrow phase for one broad-phase pair: update or create the
    /// arbiter, orient it to its handler, and run begin/pre-solve.
    fn collide_shapes(&mut self, shape_a: ShapeId, shape_b: ShapeId) {
        if shape_a == shape_b {
            return;
        }
        let body_a = self.shapes[shape_a].body;
        let body_b = self.shapes[shape_b].body;
        if body_a == body_b {
            return;
        }
        // At least one side must be awake and dynamic for the pair to
        // matter this step.
        if !self.can_collide(body_a) && !self.can_collide(body_b) {
            return;
        }
        if !self.shapes[shape_a].bb.intersects(&self.shapes[shape_b].bb) {
            return;
        }

        let contacts = narrowphase::contact_points(
            &self.shapes[shape_a].geometry,
            &self.bodies[body_a].transform(),
            &self.shapes[shape_b].geometry,
            &self.bodies[body_b].transform(),
            self.collision_slop,
        );
        if contacts.is_empty() {
            return;
        }

        let key = if shape_a <= shape_b {
            (shape_a, shape_b)
        } else {
            (shape_b, shape_a)
        };
        let arbiter_id = match self.cached_arbiters.get(&key) {
            Some(&id) => id,
            None => {
                let mut arbiter = self.pooled_arbiters.get();
                arbiter.a = key.0;
                arbiter.b = key.1;
                arbiter.body_a = self.shapes[key.0].body;
                arbiter.body_b = self.shapes[key.1].body;
                let id = self.arbiters_arena.insert(arbiter);
                self.cached_arbiters.insert(key, id);
                id
            }
        };
        // Both indexes can report the same pair; only process it once.
        if self.arbiters_arena[arbiter_id].stamp == self.stamp {
            return;
        }

        let match_dist = self.collision_slop.max(1e-3);
        let restitution = self.shapes[shape_a].elasticity * self.shapes[shape_b].elasticity;
        let friction = self.shapes[shape_a].friction * self.shapes[shape_b].friction;
        {
            let arbiter = &mut self.arbiters_arena[arbiter_id];
            let mut contacts = contacts;
            // Contact normals point from `shape_a` towards `shape_b`;
            // flip them to match the arbiter's current orientation.
            if arbiter.a != shape_a {
                for contact in contacts.iter_mut() {
                    contact.normal = -contact.normal;
                }
            }
            arbiter.update_contacts(contacts, match_dist);
            arbiter.restitution = restitution;
            arbiter.friction = friction;
        }

        // Orient the arbiter so its first shape matches the handler's
        // first type.
        let type_a = self.shapes[self.arbiters_arena[arbiter_id].a].collision_type;
        let type_b = self.shapes[self.arbiters_arena[arbiter_id].b].collision_type;
        if let Some(handler) = self.collision_handlers.get(&handler_key(type_a, type_b)) {
            if handler.type_a != handler.type_b && handler.type_a != type_a {
                self.arbiters_arena[arbiter_id].swap_sides();
            }
        }

        if self.arbiters_arena[arbiter_id].state == ArbiterState::FirstCollision
            && !self.dispatch_begin(arbiter_id)
        {
            self.arbiters_arena[arbiter_id].state = ArbiterState::Ignore;
        }
        let accepted = self.arbiters_arena[arbiter_id].state != ArbiterState::Ignore
            && self.dispatch_pre_solve(arbiter_id);
        if accepted {
            self.arbiters.push(arbiter_id);
        } else {
            let arbiter = &mut self.arbiters_arena[arbiter_id];
            arbiter.contacts.clear();
            if arbiter.state != ArbiterState::Ignore {
                arbiter.state = ArbiterState::Normal;
            }
        }
        self.arbiters_arena[arbiter_id].stamp = self.stamp;
    }

    /// Walk the arbiter cache: pairs that stopped touching this step get
    /// their separate callback and go dormant, and pairs dormant past the
    /// persistence window are recycled. Pairs between two inert bodies
    /// are left untouched so sleeping groups keep their warm contacts.
    fn prune_cached_arbiters(&mut self) {
        let entries: Vec<_> = self
            .cached_arbiters
            .iter()
            .map(|(&key, &id)| (key, id))
            .collect();
        for (key, arbiter_id) in entries {
            let arbiter = &self.arbiters_arena[arbiter_id];
            let inert_a = self.is_inert(arbiter.body_a);
            let inert_b = self.is_inert(arbiter.body_b);
            if inert_a && inert_b {
                continue;
            }
            let ticks = self.stamp - arbiter.stamp;
            if ticks >= 1 && arbiter.state != ArbiterState::Cached {
                self.arbiters_arena[arbiter_id].state = ArbiterState::Cached;
                self.dispatch_separate(arbiter_id);
            }
            if ticks >= self.collision_persistence {
                self.cached_arbiters.remove(&key);
                let arbiter = self.arbiters_arena.remove(arbiter_id);
                self.pooled_arbiters.put(arbiter);
            }
        }
    }

    /// Sequential impulse solver over the active arbiters, warm started
    /// from the impulses accumulated on the previous step.
    fn solve(&mut self, dt: f32) {
        let bias_coef = 1.0 - self.collision_bias.powf(dt);
        let slop = self.collision_slop;
        let active = self.arbiters.clone();

        for &arbiter_id in &active {
            let restitution = self.arbiters_arena[arbiter_id].restitution;
            let (body_a, body_b) = self.arbiters_arena[arbiter_id].bodies();
            let mut contacts = std::mem::take(&mut self.arbiters_arena[arbiter_id].contacts);
            {
                let (a, b) = self.bodies.get2_mut(body_a, body_b);
                let inv_a = solver_inv_mass(a);
                let inv_b = solver_inv_mass(b);
                for contact in contacts.iter_mut() {
                    let normal = contact.normal;
                    let tangent = Vector2::new(-normal.y, normal.x);
                    let relative = b.velocity - a.velocity;
                    let vn = relative.dot(&normal);
                    contact.bounce = if vn < 0.0 { restitution * vn } else { 0.0 };
                    // Warm start from last step's accumulated impulses.
                    let impulse = normal * contact.jn_acc + tangent * contact.jt_acc;
                    a.velocity -= impulse * inv_a;
                    b.velocity += impulse * inv_b;
                }
            }
            self.arbiters_arena[arbiter_id].contacts = contacts;
        }

        for _ in 0..self.iterations {
            for &arbiter_id in &active {
                let friction = self.arbiters_arena[arbiter_id].friction;
                let (body_a, body_b) = self.arbiters_arena[arbiter_id].bodies();
                let mut contacts = std::mem::take(&mut self.arbiters_arena[arbiter_id].contacts);
                {
                    let (a, b) = self.bodies.get2_mut(body_a, body_b);
                    let inv_a = solver_inv_mass(a);
                    let inv_b = solver_inv_mass(b);
                    let mass_sum = inv_a + inv_b;
                    if mass_sum > 0.0 {
                        for contact in contacts.iter_mut() {
                            let normal = contact.normal;
                            let tangent = Vector2::new(-normal.y, normal.x);

                            let vn = (b.velocity - a.velocity).dot(&normal);
                            let penetration = (-(contact.dist + slop)).max(0.0);
                            let bias = bias_coef * penetration / dt;
                            let jn = (-(vn + contact.bounce) + bias) / mass_sum;
                            let jn_old = contact.jn_acc;
                            contact.jn_acc = (jn_old + jn).max(0.0);
                            let impulse = normal * (contact.jn_acc - jn_old);
                            a.velocity -= impulse * inv_a;
                            b.velocity += impulse * inv_b;

                            let vt = (b.velocity - a.velocity).dot(&tangent);
                            let jt = -vt / mass_sum;
                            let jt_max = friction * contact.jn_acc;
                            let jt_old = contact.jt_acc;
                            contact.jt_acc = (jt_old + jt).clamp(-jt_max, jt_max);
                            let impulse = tangent * (contact.jt_acc - jt_old);
                            a.velocity -= impulse * inv_a;
                            b.velocity += impulse * inv_b;
                        }
                    }
                }
                self.arbiters_arena[arbiter_id].contacts = contacts;
            }
        }
    }

    fn can_collide(&self, body: BodyId) -> bool {
        let body = &self.bodies[body];
        !body.is_static() && !body.is_sleeping()
    }

    fn is_inert(&self, body: BodyId) -> bool {
        let body = &self.bodies[body];
        body.is_static() || body.is_sleeping()
    }
}

/// Sleeping bodies act as infinite mass so a touching awake body pushes
/// off them without disturbing the group.
fn solver_inv_mass(body: &Body) -> f32 {
    if body.is_static() || body.is_sleeping() {
        0.0
    } else {
        body.inv_mass()
    }
}
