use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use super::aabb::{
    aabb_expanded, aabb_from_center_half_extents, aabb_from_triangle, aabb_intersects,
    aabb_transformed,
};
use super::body::{BodyId, CollisionShape, RigidBody};
use super::error::{body_not_found, invalid_step, PhysicsResult};
use super::{
    ANGULAR_DAMPING, CONTACT_ITERATIONS, LINEAR_DAMPING, PAIR_CORRECTION_PERCENT,
    PAIR_CORRECTION_SLOP,
};

/// Rigid-body simulation world.
///
/// Stepping is one blocking call per frame with the caller's (already scaled)
/// timestep; there is no sub-stepping or interpolation.
pub struct PhysicsWorld {
    bodies: FxHashMap<BodyId, RigidBody>,
    next_body_id: u32,
    gravity: Vec3,
    ground_height: Option<f32>,
    step_count: u64,
}

/// A single resolved contact, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body: BodyId,
    /// Second dynamic body; `None` for ground and terrain contacts
    pub other: Option<BodyId>,
    /// Points away from whatever `body` was pushed out of
    pub normal: Vec3,
    pub depth: f32,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: FxHashMap::default(),
            next_body_id: 1,
            gravity,
            ground_height: None,
            step_count: 0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Optional infinite ground plane at `y = height`
    pub fn set_ground_plane(&mut self, height: Option<f32>) {
        self.ground_height = height;
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        log::debug!(
            "[PhysicsWorld] Added {} {:?} at {:?}",
            body.shape.name(),
            id,
            body.position
        );
        self.bodies.insert(id, body);
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        let removed = self.bodies.remove(&id);
        if removed.is_some() {
            log::debug!("[PhysicsWorld] Removed {:?}", id);
        }
        removed
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn try_body(&self, id: BodyId) -> PhysicsResult<&RigidBody> {
        self.bodies.get(&id).ok_or_else(|| body_not_found(id))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Body ids in creation order
    pub fn body_ids(&self) -> Vec<BodyId> {
        let mut ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Bodies in creation order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.body_ids()
            .into_iter()
            .filter_map(move |id| self.bodies.get(&id).map(|b| (id, b)))
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// A zero `dt` is a no-op and does not count as a step. A negative or
    /// non-finite `dt` leaves every body untouched and is reported as an error.
    pub fn step(&mut self, dt: f32) -> PhysicsResult<Vec<Contact>> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(invalid_step(format!("dt = {}", dt)));
        }
        if dt == 0.0 {
            return Ok(Vec::new());
        }

        self.integrate(dt);
        let contacts = self.resolve_contacts();
        self.step_count += 1;

        log::trace!(
            "[PhysicsWorld] Step {} dt={:.4} bodies={} contacts={}",
            self.step_count,
            dt,
            self.bodies.len(),
            contacts.len()
        );
        Ok(contacts)
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.is_dynamic()) {
            body.linear_velocity += gravity * dt;
            body.position += body.linear_velocity * dt;
            body.linear_velocity *= LINEAR_DAMPING;

            let spin = body.angular_velocity * dt;
            if spin.length_squared() > 0.0 {
                body.orientation = (Quat::from_scaled_axis(spin) * body.orientation).normalize();
            }
            body.angular_velocity *= ANGULAR_DAMPING;
        }
    }

    fn resolve_contacts(&mut self) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let dynamic_ids: Vec<BodyId> = self
            .body_ids()
            .into_iter()
            .filter(|id| self.bodies.get(id).map_or(false, RigidBody::is_dynamic))
            .collect();
        let surface_ids: Vec<BodyId> = self
            .body_ids()
            .into_iter()
            .filter(|id| {
                self.bodies.get(id).map_or(false, |b| {
                    !b.is_dynamic() && matches!(b.shape, CollisionShape::TriangleMesh { .. })
                })
            })
            .collect();

        for &id in &dynamic_ids {
            if let Some(contact) = self.resolve_ground(id) {
                contacts.push(contact);
            }
            for &surface in &surface_ids {
                if let Some(contact) = self.resolve_surface(id, surface) {
                    contacts.push(contact);
                }
            }
        }

        // Body pairs push each other down into the ground, so the ground is
        // re-applied after every pass
        for iteration in 0..CONTACT_ITERATIONS {
            let mut touching = false;
            for (i, &a) in dynamic_ids.iter().enumerate() {
                for &b in &dynamic_ids[i + 1..] {
                    if let Some(contact) = self.resolve_pair(a, b) {
                        touching = true;
                        if iteration == 0 {
                            contacts.push(contact);
                        }
                    }
                }
            }
            if !touching {
                break;
            }
            for &id in &dynamic_ids {
                self.resolve_ground(id);
            }
        }
        contacts
    }

    /// Contact between two dynamic bodies, resolved with a mass-weighted
    /// impulse and position correction
    fn resolve_pair(&mut self, a: BodyId, b: BodyId) -> Option<Contact> {
        let (normal, depth) = {
            let body_a = self.bodies.get(&a)?;
            let body_b = self.bodies.get(&b)?;
            if !aabb_intersects(&body_a.world_aabb(), &body_b.world_aabb()) {
                return None;
            }
            detect_pair(&ContactProxy::of(body_a), &ContactProxy::of(body_b))?
        };

        let mut body_a = self.bodies.remove(&a)?;
        let result = match self.bodies.get_mut(&b) {
            Some(body_b) => {
                apply_pair_response(&mut body_a, body_b, normal, depth);
                Some(Contact {
                    body: b,
                    other: Some(a),
                    normal,
                    depth,
                })
            }
            None => None,
        };
        self.bodies.insert(a, body_a);
        result
    }

    fn resolve_ground(&mut self, id: BodyId) -> Option<Contact> {
        let height = self.ground_height?;
        let body = self.bodies.get_mut(&id)?;
        let lowest = match body.shape {
            CollisionShape::Sphere { radius } => body.position.y - radius,
            _ => body.world_aabb().min.y,
        };
        let depth = height - lowest;
        if depth <= 0.0 {
            return None;
        }
        body.position.y += depth;
        apply_contact_response(body, Vec3::Y);
        Some(Contact {
            body: id,
            other: None,
            normal: Vec3::Y,
            depth,
        })
    }

    /// Contact of a dynamic body's proxy sphere against a static triangle mesh
    fn resolve_surface(&mut self, id: BodyId, surface: BodyId) -> Option<Contact> {
        let (mesh, surface_position, surface_orientation) = match self.bodies.get(&surface) {
            Some(RigidBody {
                shape: CollisionShape::TriangleMesh { mesh },
                position,
                orientation,
                ..
            }) => (mesh.clone(), *position, *orientation),
            _ => return None,
        };
        let inverse = surface_orientation.inverse();
        let body = self.bodies.get_mut(&id)?;
        let radius = contact_radius(&body.shape);
        let mut deepest: Option<Contact> = None;

        for _ in 0..CONTACT_ITERATIONS {
            let center = inverse * (body.position - surface_position);
            let query = aabb_expanded(&aabb_from_center_half_extents(center, Vec3::ZERO), radius);

            let mut best: Option<(Vec3, f32)> = None;
            for tri in mesh.triangles() {
                if !aabb_intersects(&aabb_from_triangle(&tri), &query) {
                    continue;
                }
                let closest = closest_point_on_triangle(center, tri[0], tri[1], tri[2]);
                let offset = center - closest;
                let distance = offset.length();
                if distance >= radius {
                    continue;
                }
                let normal = if distance > 1e-6 {
                    offset / distance
                } else {
                    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
                };
                let depth = radius - distance;
                if best.map_or(true, |(_, d)| depth > d) {
                    best = Some((normal, depth));
                }
            }

            let Some((local_normal, depth)) = best else {
                break;
            };
            let normal = surface_orientation * local_normal;
            body.position += normal * depth;
            apply_contact_response(body, normal);
            if deepest.map_or(true, |c| depth > c.depth) {
                deepest = Some(Contact {
                    body: id,
                    other: None,
                    normal,
                    depth,
                });
            }
        }
        deepest
    }

    /// Move a kinematic or static body; dynamic bodies are rejected
    pub fn set_body_position(&mut self, id: BodyId, position: Vec3) -> PhysicsResult<()> {
        let body = self.bodies.get_mut(&id).ok_or_else(|| body_not_found(id))?;
        if body.is_dynamic() {
            return Err(invalid_step(format!("{} is dynamic and cannot be placed directly", id)));
        }
        body.position = position;
        Ok(())
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, super::GRAVITY, 0.0))
    }
}

/// Radius of the sphere standing in for a body in mesh contacts
fn contact_radius(shape: &CollisionShape) -> f32 {
    match shape {
        CollisionShape::Sphere { radius } => *radius,
        CollisionShape::Box { half_extents } => half_extents.min_element(),
        other => {
            let aabb = other.local_aabb();
            ((aabb.max - aabb.min) * 0.5).min_element()
        }
    }
}

/// Shape stand-in used for body-body contacts
#[derive(Debug, Clone, Copy)]
enum ContactProxy {
    Sphere { center: Vec3, radius: f32 },
    Box { center: Vec3, orientation: Quat, half_extents: Vec3 },
}

impl ContactProxy {
    fn of(body: &RigidBody) -> Self {
        match body.shape {
            CollisionShape::Box { half_extents } => ContactProxy::Box {
                center: body.position,
                orientation: body.orientation,
                half_extents,
            },
            ref shape => ContactProxy::Sphere {
                center: body.position,
                radius: contact_radius(shape),
            },
        }
    }
}

/// Normal from `a` towards `b` and penetration depth, if the proxies overlap
fn detect_pair(a: &ContactProxy, b: &ContactProxy) -> Option<(Vec3, f32)> {
    match (*a, *b) {
        (
            ContactProxy::Sphere { center: ca, radius: ra },
            ContactProxy::Sphere { center: cb, radius: rb },
        ) => sphere_sphere(ca, ra, cb, rb),
        (
            ContactProxy::Sphere { center, radius },
            ContactProxy::Box { center: box_center, orientation, half_extents },
        ) => sphere_box(center, radius, box_center, orientation, half_extents).map(|(n, d)| (-n, d)),
        (
            ContactProxy::Box { center: box_center, orientation, half_extents },
            ContactProxy::Sphere { center, radius },
        ) => sphere_box(center, radius, box_center, orientation, half_extents),
        (ContactProxy::Box { .. }, ContactProxy::Box { .. }) => box_box(a, b),
    }
}

fn sphere_sphere(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<(Vec3, f32)> {
    let delta = cb - ca;
    let distance_squared = delta.length_squared();
    let min_distance = ra + rb;
    if distance_squared >= min_distance * min_distance {
        return None;
    }
    let distance = distance_squared.sqrt();
    let normal = if distance > 1e-4 { delta / distance } else { Vec3::Y };
    Some((normal, min_distance - distance))
}

/// Normal from the box towards the sphere
fn sphere_box(
    center: Vec3,
    radius: f32,
    box_center: Vec3,
    orientation: Quat,
    half_extents: Vec3,
) -> Option<(Vec3, f32)> {
    let local = orientation.inverse() * (center - box_center);
    let closest = local.clamp(-half_extents, half_extents);
    let offset = local - closest;
    let distance_squared = offset.length_squared();
    if distance_squared >= radius * radius {
        return None;
    }

    let distance = distance_squared.sqrt();
    if distance > 1e-4 {
        return Some((orientation * (offset / distance), radius - distance));
    }

    // Centre inside the box: leave through the nearest face
    let room = half_extents - local.abs();
    let (axis, to_face) = if room.x < room.y && room.x < room.z {
        (Vec3::new(local.x.signum(), 0.0, 0.0), room.x)
    } else if room.y < room.z {
        (Vec3::new(0.0, local.y.signum(), 0.0), room.y)
    } else {
        (Vec3::new(0.0, 0.0, local.z.signum()), room.z)
    };
    Some((orientation * axis, radius + to_face))
}

/// Separating axis of least overlap between the boxes' world bounds
fn box_box(a: &ContactProxy, b: &ContactProxy) -> Option<(Vec3, f32)> {
    let bounds = |proxy: &ContactProxy| match *proxy {
        ContactProxy::Box { center, orientation, half_extents } => {
            let local = aabb_from_center_half_extents(Vec3::ZERO, half_extents);
            Some(aabb_transformed(&local, orientation, center))
        }
        ContactProxy::Sphere { .. } => None,
    };
    let (box_a, box_b) = (bounds(a)?, bounds(b)?);

    let overlap = box_a.max.min(box_b.max) - box_a.min.max(box_b.min);
    if overlap.min_element() <= 0.0 {
        return None;
    }
    let direction = (box_b.min + box_b.max) - (box_a.min + box_a.max);
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    let normal = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        Vec3::new(sign(direction.x), 0.0, 0.0)
    } else if overlap.y <= overlap.z {
        Vec3::new(0.0, sign(direction.y), 0.0)
    } else {
        Vec3::new(0.0, 0.0, sign(direction.z))
    };
    Some((normal, overlap.min_element()))
}

/// Impulse and positional correction for a contact whose normal points from `a` to `b`
fn apply_pair_response(a: &mut RigidBody, b: &mut RigidBody, normal: Vec3, depth: f32) {
    let inverse_a = 1.0 / a.mass;
    let inverse_b = 1.0 / b.mass;
    let inverse_sum = inverse_a + inverse_b;

    let correction = normal * (depth - PAIR_CORRECTION_SLOP).max(0.0) * PAIR_CORRECTION_PERCENT;
    a.position -= correction * (inverse_a / inverse_sum);
    b.position += correction * (inverse_b / inverse_sum);

    let relative = b.linear_velocity - a.linear_velocity;
    let approach = relative.dot(normal);
    if approach > 0.0 {
        return;
    }
    let restitution = a.restitution.min(b.restitution);
    let j = -(1.0 + restitution) * approach / inverse_sum;
    a.linear_velocity -= normal * (j * inverse_a);
    b.linear_velocity += normal * (j * inverse_b);

    // Coulomb friction, capped at stopping the sliding motion
    let relative = b.linear_velocity - a.linear_velocity;
    let tangent = relative - normal * relative.dot(normal);
    let speed = tangent.length();
    if speed < 1e-3 {
        return;
    }
    let friction = (a.friction * b.friction).sqrt();
    let magnitude = (friction * j).min(speed / inverse_sum);
    let impulse = tangent / speed * magnitude;
    a.linear_velocity += impulse * inverse_a;
    b.linear_velocity -= impulse * inverse_b;
}

fn apply_contact_response(body: &mut RigidBody, normal: Vec3) {
    let vn = body.linear_velocity.dot(normal);
    if vn < 0.0 {
        body.linear_velocity -= normal * vn * (1.0 + body.restitution);
    }
    let normal_part = normal * body.linear_velocity.dot(normal);
    let tangent = body.linear_velocity - normal_part;
    body.linear_velocity = normal_part + tangent * (1.0 - body.friction).clamp(0.0, 1.0);
    body.angular_velocity *= 1.0 - body.friction.clamp(0.0, 1.0);
}

/// Closest point to `p` on triangle `abc` (Ericson, Real-Time Collision Detection 5.1.5)
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}
