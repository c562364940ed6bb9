use fxhash::FxHashMap;

use crate::body::BodyId;
use crate::shape::ShapeId;
use crate::space::Space;

/// A group of dynamic bodies put to sleep together. Bodies that touch
/// (directly or through constraints) sleep and wake as one unit.
pub(crate) struct SleepingComponent {
    pub(crate) bodies: Vec<BodyId>,
}

impl Space {
    /// Wake a sleeping body and reset its idle timer. Safe to call from
    /// callbacks; while the space is locked the wake-up is deferred to
    /// the unlock. Static bodies are ignored.
    pub fn activate_body(&mut self, id: BodyId) {
        if self.bodies[id].is_static() {
            return;
        }
        if !self.bodies[id].is_sleeping() {
            self.bodies[id].idle_time = 0.0;
            return;
        }
        if self.locked > 0 {
            if !self.roused_bodies.contains(&id) {
                self.roused_bodies.push(id);
            }
        } else {
            self.activate_body_now(id);
        }
    }

    /// Wake the whole sleeping group containing `id`: members rejoin the
    /// awake list, their shapes move back to the dynamic index, and their
    /// cached arbiters are re-stamped so pruning does not reap them
    /// before the next contact update.
    pub(crate) fn activate_body_now(&mut self, id: BodyId) {
        if !self.bodies.contains(id) {
            return;
        }
        let component_index = match self.bodies[id].component {
            Some(index) => index,
            None => {
                self.bodies[id].idle_time = 0.0;
                return;
            }
        };
        let component = self.sleeping_components.swap_remove(component_index);
        if component_index < self.sleeping_components.len() {
            let swapped = self.sleeping_components[component_index].bodies.clone();
            for member in swapped {
                self.bodies[member].component = Some(component_index);
            }
        }
        for &member in &component.bodies {
            self.bodies[member].component = None;
            self.bodies[member].idle_time = 0.0;
            self.dynamic_bodies.push(member);
            let shapes = self.bodies[member].shapes.clone();
            for shape in shapes {
                if let Some(index_id) = self.shapes[shape].index_id {
                    let bb = self.shapes[shape].bb;
                    if self.static_index.remove(index_id) {
                        self.dynamic_index.insert(index_id, bb);
                    }
                }
            }
        }
        let stamp = self.stamp;
        for &arbiter_id in self.cached_arbiters.values() {
            let arbiter = &mut self.arbiters_arena[arbiter_id];
            if component.bodies.contains(&arbiter.body_a)
                || component.bodies.contains(&arbiter.body_b)
            {
                arbiter.stamp = stamp;
            }
        }
    }

    /// Wake every dynamic body arbitered against a static shape. Used
    /// when static geometry is removed or moved out from under sleepers.
    pub(crate) fn activate_static(&mut self, shape: ShapeId) {
        let mut touching = Vec::new();
        for &arbiter_id in self.cached_arbiters.values() {
            let arbiter = &self.arbiters_arena[arbiter_id];
            if arbiter.a == shape {
                touching.push(arbiter.body_b);
            } else if arbiter.b == shape {
                touching.push(arbiter.body_a);
            }
        }
        for body in touching {
            self.activate_body(body);
        }
    }

    /// Force a single body to sleep immediately, in its own group.
    pub fn sleep_body(&mut self, id: BodyId) {
        self.assert_unlocked();
        assert!(
            !self.bodies[id].is_static(),
            "static bodies cannot sleep"
        );
        if self.bodies[id].is_sleeping() {
            return;
        }
        self.sleep_group(vec![id]);
    }

    pub(crate) fn sleep_group(&mut self, members: Vec<BodyId>) {
        let component_index = self.sleeping_components.len();
        for &member in &members {
            let body = &mut self.bodies[member];
            body.component = Some(component_index);
            body.velocity = nalgebra::Vector2::zeros();
            body.angular_velocity = 0.0;
            let shapes = self.bodies[member].shapes.clone();
            for shape in shapes {
                if let Some(index_id) = self.shapes[shape].index_id {
                    let bb = self.shapes[shape].bb;
                    if self.dynamic_index.remove(index_id) {
                        self.static_index.insert(index_id, bb);
                    }
                }
            }
        }
        self.dynamic_bodies.retain(|b| !members.contains(b));
        self.sleeping_components.push(SleepingComponent { bodies: members });
    }

    /// Advance idle timers and put groups of mutually-touching idle
    /// bodies to sleep. Does nothing unless a finite sleep threshold is
    /// configured.
    pub(crate) fn process_components(&mut self, dt: f32) {
        if !self.sleep_time_threshold.is_finite() {
            return;
        }
        let idle_speed = self.idle_speed_threshold;
        let speed_threshold_sq = if idle_speed > 0.0 {
            idle_speed * idle_speed
        } else {
            self.gravity.norm_squared() * dt * dt
        };

        let awake = self.dynamic_bodies.clone();
        for &id in &awake {
            let body = &mut self.bodies[id];
            let speed_sq =
                body.velocity.norm_squared() + body.angular_velocity * body.angular_velocity;
            if speed_sq > speed_threshold_sq {
                body.idle_time = 0.0;
            } else {
                body.idle_time += dt;
            }
        }

        // Bodies joined by a contact or a constraint sleep as one unit.
        let mut adjacency: FxHashMap<BodyId, Vec<BodyId>> = FxHashMap::default();
        for &arbiter_id in &self.arbiters {
            let arbiter = &self.arbiters_arena[arbiter_id];
            let (a, b) = (arbiter.body_a, arbiter.body_b);
            if self.is_awake_dynamic(a) && self.is_awake_dynamic(b) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
        for &constraint_id in &self.constraints {
            let constraint = &self.constraints_arena[constraint_id];
            let (a, b) = (constraint.a, constraint.b);
            if self.is_awake_dynamic(a) && self.is_awake_dynamic(b) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }

        let mut visited: Vec<BodyId> = Vec::new();
        for &root in &awake {
            if !self.is_awake_dynamic(root) || visited.contains(&root) {
                continue;
            }
            let mut group = vec![root];
            let mut stack = vec![root];
            while let Some(current) = stack.pop() {
                if let Some(neighbors) = adjacency.get(&current) {
                    for &neighbor in neighbors {
                        if !group.contains(&neighbor) {
                            group.push(neighbor);
                            stack.push(neighbor);
                        }
                    }
                }
            }
            visited.extend_from_slice(&group);
            let all_idle = group
                .iter()
                .all(|&member| self.bodies[member].idle_time >= self.sleep_time_threshold);
            if all_idle {
                self.sleep_group(group);
            }
        }
    }

    fn is_awake_dynamic(&self, id: BodyId) -> bool {
        let body = &self.bodies[id];
        !body.is_static() && !body.is_sleeping()
    }
}
