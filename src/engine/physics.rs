//! Rigid bodies, forces and impulse-based collision response
//!
//! Collision response never touches velocities directly. `RigidBody::resolve_collision`
//! queues impulses and position corrections on both bodies; they take effect when each
//! body's `process_forces` runs at the end of the collision pass.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::object::{AsAny, GameObject};
use crate::geom::Rect;

/// Surface and bulk properties of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl Material {
    pub const ROCK: Material = Material::new(0.6, 0.10, 1.0, 1.0);
    pub const WOOD: Material = Material::new(0.3, 0.2, 1.0, 1.0);
    pub const METAL: Material = Material::new(1.2, 0.05, 1.0, 1.0);
    pub const BOUNCY_BALL: Material = Material::new(0.3, 0.8, 1.0, 1.0);
    pub const SUPER_BALL: Material = Material::new(0.3, 0.95, 0.0, 0.0);
    pub const PILLOW: Material = Material::new(0.1, 0.2, 1.0, 1.0);
    pub const STATIC: Material = Material::new(0.0, 0.0, 0.0, 0.0);
    pub const LIQUID: Material = Material::new(0.5, 0.01, 0.0, 0.0);

    pub const fn new(
        density: f32,
        restitution: f32,
        static_friction: f32,
        dynamic_friction: f32,
    ) -> Self {
        Self {
            density,
            restitution,
            static_friction,
            dynamic_friction,
        }
    }

    /// sqrt(a² + b²)
    pub fn combined_static_friction(&self, other: &Material) -> f32 {
        self.static_friction.hypot(other.static_friction)
    }

    /// sqrt(a² + b²)
    pub fn combined_dynamic_friction(&self, other: &Material) -> f32 {
        self.dynamic_friction.hypot(other.dynamic_friction)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::ROCK
    }
}

/// Something that changes a body's velocity
pub trait Force: AsAny + fmt::Debug {
    /// Velocity change this force causes over `dt`
    fn delta_speed(&self, object: &GameObject, inv_mass: f32, dt: f32) -> Vec2;
}

/// Continuous push, scaled by inverse mass and time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantForce(pub Vec2);

impl Force for ConstantForce {
    fn delta_speed(&self, _object: &GameObject, inv_mass: f32, dt: f32) -> Vec2 {
        self.0 * inv_mass * dt
    }
}

/// Instant change of momentum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impulse(pub Vec2);

impl Force for Impulse {
    fn delta_speed(&self, _object: &GameObject, inv_mass: f32, _dt: f32) -> Vec2 {
        self.0 * inv_mass
    }
}

/// Uniform acceleration, independent of mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity(pub Vec2);

impl Force for Gravity {
    fn delta_speed(&self, _object: &GameObject, inv_mass: f32, dt: f32) -> Vec2 {
        if inv_mass == 0.0 {
            Vec2::ZERO
        } else {
            self.0 * dt
        }
    }
}

/// Quadratic drag towards the speed of a surrounding flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientFriction {
    /// Velocity of the surrounding medium
    pub flow: Vec2,
    pub factor: f32,
}

impl AmbientFriction {
    /// Air density × drag coefficient of a sphere, halved
    pub const AIR: f32 = 0.5 * 1.2 * 0.47;

    pub fn new(flow: Vec2, factor: f32) -> Self {
        Self { flow, factor }
    }
}

impl Default for AmbientFriction {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Self::AIR)
    }
}

impl Force for AmbientFriction {
    fn delta_speed(&self, object: &GameObject, inv_mass: f32, dt: f32) -> Vec2 {
        let relative = self.flow - object.velocity();
        let speed = relative.length();
        if speed == 0.0 {
            return Vec2::ZERO;
        }
        (relative * speed * self.factor * inv_mass * dt).clamp_length_max(speed)
    }
}

/// Gravitational constant, in engine units
pub const G: f32 = 6.674_08e-11;

/// Point-mass attraction towards a fixed position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceGravity {
    pub position: Vec2,
    /// `G` times the attracting mass
    pub factor: f32,
}

impl SpaceGravity {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            factor: G * mass,
        }
    }
}

impl Force for SpaceGravity {
    fn delta_speed(&self, object: &GameObject, inv_mass: f32, dt: f32) -> Vec2 {
        if inv_mass == 0.0 {
            return Vec2::ZERO;
        }
        let offset = self.position - object.position();
        let distance_sq = offset.length_squared();
        match offset.try_normalize() {
            Some(direction) => direction * (self.factor * dt / distance_sq),
            None => Vec2::ZERO,
        }
    }
}

/// Pushes the velocity towards `target` along the target's direction only.
///
/// Never slows the body down: once the projected speed reaches the target, it does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniDirectionalControllerForce {
    /// Desired velocity; zero disables the force
    pub target: Vec2,
    pub reactivity: f32,
}

impl UniDirectionalControllerForce {
    pub fn new(reactivity: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            reactivity,
        }
    }
}

impl Force for UniDirectionalControllerForce {
    fn delta_speed(&self, object: &GameObject, _inv_mass: f32, _dt: f32) -> Vec2 {
        let Some(direction) = self.target.try_normalize() else {
            return Vec2::ZERO;
        };
        let directed = (self.target - object.velocity()).dot(direction);
        if directed <= 0.0 {
            Vec2::ZERO
        } else {
            direction * (directed * self.reactivity)
        }
    }
}

/// Pulls the velocity towards `target` in both axes.
///
/// Excess speed along the target direction is kept; only the sideways error is corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialControllerForce {
    /// Desired velocity; zero disables the force
    pub target: Vec2,
    pub reactivity: f32,
}

impl SpatialControllerForce {
    pub fn new(reactivity: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            reactivity,
        }
    }
}

impl Force for SpatialControllerForce {
    fn delta_speed(&self, object: &GameObject, _inv_mass: f32, _dt: f32) -> Vec2 {
        let Some(direction) = self.target.try_normalize() else {
            return Vec2::ZERO;
        };
        let delta = self.target - object.velocity();
        let directed = delta.dot(direction);
        if directed <= 0.0 {
            (delta - direction * directed) * self.reactivity
        } else {
            delta * self.reactivity
        }
    }
}

/// Brakes the body while enabled, along `direction` or in every direction if it is zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerControllerForce {
    direction: Vec2,
    pub reactivity: f32,
    pub enabled: bool,
}

impl BreakerControllerForce {
    /// Starts disabled. A zero `direction` brakes in every direction.
    pub fn new(direction: Vec2, reactivity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            reactivity,
            enabled: false,
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }
}

impl Force for BreakerControllerForce {
    fn delta_speed(&self, object: &GameObject, _inv_mass: f32, _dt: f32) -> Vec2 {
        if !self.enabled {
            return Vec2::ZERO;
        }
        let velocity = object.velocity();
        if self.direction == Vec2::ZERO {
            velocity * -self.reactivity
        } else {
            self.direction * (-velocity.dot(self.direction) * self.reactivity)
        }
    }
}

/// Forces applied to every rigid body each tick
#[derive(Debug, Default)]
pub struct PhysicWorld {
    forces: Vec<Box<dyn Force>>,
}

impl PhysicWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force(mut self, force: impl Force + 'static) -> Self {
        self.add_force(force);
        self
    }

    pub fn add_force(&mut self, force: impl Force + 'static) {
        self.forces.push(Box::new(force));
    }

    pub fn forces(&self) -> &[Box<dyn Force>] {
        &self.forces
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }
}

/// Physics reaction component
#[derive(Debug)]
pub struct RigidBody {
    pub material: Material,
    inv_mass: f32,
    frame_forces: Vec<Box<dyn Force>>,
    permanent_forces: Vec<Box<dyn Force>>,
    position_corrections: Vec<Vec2>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Material::default())
    }
}

impl RigidBody {
    /// Unit mass body
    pub fn new(material: Material) -> Self {
        Self {
            material,
            inv_mass: 1.0,
            frame_forces: Vec::new(),
            permanent_forces: Vec::new(),
            position_corrections: Vec::new(),
        }
    }

    /// Infinite mass: pushes others, never moves itself
    pub fn immovable(material: Material) -> Self {
        Self {
            inv_mass: 0.0,
            ..Self::new(material)
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Non-positive or infinite masses make the body immovable
    pub fn set_mass(&mut self, mass: f32) {
        self.inv_mass = if mass.is_finite() && mass > 0.0 {
            1.0 / mass
        } else {
            0.0
        };
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass == 0.0 {
            f32::INFINITY
        } else {
            1.0 / self.inv_mass
        }
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn is_immovable(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// One-shot force, consumed by the next `process_forces`
    pub fn add_frame_force(&mut self, force: impl Force + 'static) {
        self.frame_forces.push(Box::new(force));
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.add_frame_force(Impulse(impulse));
    }

    /// Force applied on every `process_forces` until removed
    pub fn add_permanent_force(&mut self, force: impl Force + 'static) {
        self.permanent_forces.push(Box::new(force));
    }

    pub fn clear_permanent_forces(&mut self) {
        self.permanent_forces.clear();
    }

    /// First permanent force of type `T`, e.g. a controller to retarget
    pub fn permanent_force_mut<T: Force>(&mut self) -> Option<&mut T> {
        self.permanent_forces.iter_mut().find_map(|force| {
            let force: &mut dyn Force = force.as_mut();
            force.as_any_mut().downcast_mut::<T>()
        })
    }

    pub fn push_position_correction(&mut self, correction: Vec2) {
        self.position_corrections.push(correction);
    }

    pub fn frame_forces(&self) -> &[Box<dyn Force>] {
        &self.frame_forces
    }

    pub fn position_corrections(&self) -> &[Vec2] {
        &self.position_corrections
    }

    /// Apply this tick's forces and corrections to `object`, then clear the queues.
    ///
    /// The velocity deltas of all forces are summed and applied once. Position corrections
    /// are averaged so simultaneous contacts don't push the body out several times over.
    /// `object` must not hold this body while it runs; see [`GameObject::process_forces`].
    pub fn process_forces(&mut self, world: Option<&PhysicWorld>, object: &mut GameObject, dt: f32) {
        let inv_mass = self.inv_mass;
        let world_forces = world.map_or(&[][..], PhysicWorld::forces);

        let delta: Vec2 = self
            .frame_forces
            .drain(..)
            .map(|force| force.delta_speed(object, inv_mass, dt))
            .chain(
                self.permanent_forces
                    .iter()
                    .chain(world_forces)
                    .map(|force| force.delta_speed(object, inv_mass, dt)),
            )
            .sum();
        if delta.is_finite() {
            if delta != Vec2::ZERO {
                object.accelerate(delta);
            }
        } else {
            log::warn!("Dropping non-finite velocity change on object {}", object.id());
        }

        if !self.position_corrections.is_empty() {
            let count = self.position_corrections.len() as f32;
            let correction = self.position_corrections.drain(..).sum::<Vec2>() / count;
            if correction.is_finite() {
                object.move_by(correction);
            } else {
                log::warn!("Dropping non-finite position correction on object {}", object.id());
            }
        }
    }

    /// Queue the impulse response of two colliding bodies.
    ///
    /// Does nothing unless both objects carry a rigid body and a collider, at least one is
    /// movable, they actually penetrate, and they are strictly approaching along the contact
    /// normal.
    /// Call it once per pair, typically from the handling object's `handle_collision`.
    pub fn resolve_collision(a: &mut GameObject, b: &mut GameObject) {
        let (Some(body_a), Some(body_b)) = (a.rigid_body.as_ref(), b.rigid_body.as_ref()) else {
            return;
        };
        let (Some(collider_a), Some(collider_b)) = (a.collider(), b.collider()) else {
            return;
        };
        let (im_a, im_b) = (body_a.inv_mass, body_b.inv_mass);
        let inv_sum = im_a + im_b;
        if inv_sum <= 0.0 {
            return;
        }
        let Some(contact) = contact_between(collider_a, collider_b) else {
            return;
        };

        let relative = b.velocity() - a.velocity();
        let along_normal = relative.dot(contact.normal);
        // Resting contacts count as separating: nothing is queued
        if along_normal >= 0.0 {
            return;
        }

        let correction = contact.normal * (contact.depth / inv_sum);

        let restitution = body_a.material.restitution.min(body_b.material.restitution);
        let j = -(1.0 + restitution) * along_normal / inv_sum;
        let impulse = contact.normal * j;

        let friction = match (relative - contact.normal * along_normal).try_normalize() {
            Some(tangent) => {
                let jt = -relative.dot(tangent) / inv_sum;
                let static_mu = body_a.material.combined_static_friction(&body_b.material);
                if jt.abs() <= j * static_mu {
                    tangent * jt
                } else {
                    tangent * (-j * body_a.material.combined_dynamic_friction(&body_b.material))
                }
            }
            None => Vec2::ZERO,
        };

        if !(correction.is_finite() && impulse.is_finite() && friction.is_finite()) {
            log::warn!("Skipping degenerate contact between {} and {}", a.id(), b.id());
            return;
        }

        for (object, sign, inv_mass) in [(a, -1.0, im_a), (b, 1.0, im_b)] {
            if inv_mass <= 0.0 {
                continue;
            }
            if let Some(body) = object.rigid_body.as_mut() {
                body.push_position_correction(correction * (sign * inv_mass));
                body.apply_impulse(impulse * sign);
                if friction != Vec2::ZERO {
                    body.apply_impulse(friction * sign);
                }
            }
        }
    }
}

/// Penetration along a unit normal pointing from the first body to the second
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    normal: Vec2,
    depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

fn contact_between(a: &Collider, b: &Collider) -> Option<Contact> {
    match (a.as_box(), a.as_circle(), b.as_box(), b.as_circle()) {
        (Some(box_a), _, Some(box_b), _) => box_box_contact(&box_a.rect(), &box_b.rect()),
        (Some(box_a), _, _, Some((center, radius))) => {
            box_circle_contact(&box_a.rect(), center, radius)
        }
        (_, Some((center, radius)), Some(box_b), _) => {
            box_circle_contact(&box_b.rect(), center, radius).map(Contact::flipped)
        }
        (_, Some((center_a, radius_a)), _, Some((center_b, radius_b))) => {
            circle_circle_contact(center_a, radius_a, center_b, radius_b)
        }
        _ => {
            log::debug!("No collision response for polygon colliders");
            None
        }
    }
}

/// Axis of least penetration
fn box_box_contact(a: &Rect, b: &Rect) -> Option<Contact> {
    let overlap = a.max.min(b.max) - a.min.max(b.min);
    if overlap.x < 0.0 || overlap.y < 0.0 {
        return None;
    }
    let offset = b.center() - a.center();
    let contact = if overlap.x < overlap.y {
        Contact {
            normal: Vec2::new(if offset.x < 0.0 { -1.0 } else { 1.0 }, 0.0),
            depth: overlap.x,
        }
    } else {
        Contact {
            normal: Vec2::new(0.0, if offset.y < 0.0 { -1.0 } else { 1.0 }),
            depth: overlap.y,
        }
    };
    Some(contact)
}

/// Normal points from the box to the circle
fn box_circle_contact(rect: &Rect, center: Vec2, radius: f32) -> Option<Contact> {
    if rect.contains_point(center) {
        // Leave through the nearest face
        let faces = [
            (center.x - rect.min.x, Vec2::NEG_X),
            (rect.max.x - center.x, Vec2::X),
            (center.y - rect.min.y, Vec2::NEG_Y),
            (rect.max.y - center.y, Vec2::Y),
        ];
        let (distance, normal) = faces
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap_or((0.0, Vec2::X));
        return Some(Contact {
            normal,
            depth: distance + radius,
        });
    }
    let offset = center - rect.closest_point(center);
    let distance = offset.length();
    if distance > radius || distance == 0.0 {
        return None;
    }
    Some(Contact {
        normal: offset / distance,
        depth: radius - distance,
    })
}

/// Coincident centres separate along +X
fn circle_circle_contact(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> Option<Contact> {
    let offset = b - a;
    let distance = offset.length();
    let reach = radius_a + radius_b;
    if distance > reach {
        return None;
    }
    let contact = match offset.try_normalize() {
        Some(normal) => Contact {
            normal,
            depth: reach - distance,
        },
        None => Contact {
            normal: Vec2::X,
            depth: reach,
        },
    };
    Some(contact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Shape;

    fn ball(x: f32, vx: f32, material: Material) -> GameObject {
        GameObject::new()
            .with_position(Vec2::new(x, 0.0))
            .with_velocity(Vec2::new(vx, 0.0))
            .with_collider(Collider::circle(10.0))
            .with_rigid_body(RigidBody::new(material))
    }

    fn queued(object: &GameObject) -> (usize, usize) {
        object.rigid_body.as_ref().map_or((0, 0), |body| {
            (body.frame_forces().len(), body.position_corrections().len())
        })
    }

    #[test]
    fn test_restitution_uses_minimum() {
        let bouncy = Material::new(1.0, 0.8, 0.0, 0.0);
        let dull = Material::new(1.0, 0.2, 0.0, 0.0);
        let mut a = ball(0.0, 10.0, bouncy);
        let mut b = ball(15.0, -10.0, dull);

        RigidBody::resolve_collision(&mut a, &mut b);
        a.process_forces(None, 1.0);
        b.process_forces(None, 1.0);

        // along = -20, j = 1.2 * 20 / 2 = 12
        assert!((a.velocity().x - -2.0).abs() < 1e-5);
        assert!((b.velocity().x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_position_correction_split_by_inverse_mass() {
        let mut a = ball(0.0, 1.0, Material::SUPER_BALL);
        let mut b = ball(15.0, 0.0, Material::SUPER_BALL);
        RigidBody::resolve_collision(&mut a, &mut b);
        a.process_forces(None, 1.0);
        b.process_forces(None, 1.0);
        assert!((a.position().x - -2.5).abs() < 1e-5);
        assert!((b.position().x - 17.5).abs() < 1e-5);
    }

    #[test]
    fn test_separating_bodies_untouched() {
        let mut a = ball(0.0, -5.0, Material::ROCK);
        let mut b = ball(15.0, 5.0, Material::ROCK);
        RigidBody::resolve_collision(&mut a, &mut b);
        assert_eq!(queued(&a), (0, 0));
        assert_eq!(queued(&b), (0, 0));
    }

    #[test]
    fn test_resting_contact_untouched() {
        let mut a = ball(0.0, 0.0, Material::ROCK);
        let mut b = ball(15.0, 0.0, Material::ROCK);
        RigidBody::resolve_collision(&mut a, &mut b);
        assert_eq!(queued(&a), (0, 0));
        assert_eq!(queued(&b), (0, 0));

        // Sliding past each other is still resting along the normal
        let mut a = ball(0.0, 0.0, Material::ROCK);
        let mut b = ball(15.0, 0.0, Material::ROCK);
        b.set_velocity_xy(0.0, 5.0);
        RigidBody::resolve_collision(&mut a, &mut b);
        assert_eq!(queued(&b), (0, 0));
    }

    #[test]
    fn test_two_immovable_bodies_skip() {
        let mut a = ball(0.0, 5.0, Material::ROCK);
        let mut b = ball(15.0, -5.0, Material::ROCK);
        a.rigid_body = Some(RigidBody::immovable(Material::STATIC));
        b.rigid_body = Some(RigidBody::immovable(Material::STATIC));
        RigidBody::resolve_collision(&mut a, &mut b);
        assert_eq!(queued(&a), (0, 0));
        assert_eq!(queued(&b), (0, 0));
    }

    #[test]
    fn test_immovable_wall_only_moves_the_ball() {
        let mut wall = GameObject::new()
            .with_position(Vec2::new(0.0, 0.0))
            .with_collider(Collider::aabb(Vec2::new(100.0, 5.0)))
            .with_rigid_body(RigidBody::immovable(Material::STATIC));
        let mut ball = GameObject::new()
            .with_position(Vec2::new(0.0, 12.0))
            .with_velocity(Vec2::new(0.0, -10.0))
            .with_collider(Collider::circle(8.0))
            .with_rigid_body(RigidBody::new(Material::SUPER_BALL));

        RigidBody::resolve_collision(&mut wall, &mut ball);
        assert_eq!(queued(&wall), (0, 0));
        ball.process_forces(None, 1.0);
        // Restitution of the static wall is 0: the ball stops and is pushed out
        assert!(ball.velocity().y.abs() < 1e-5);
        assert!((ball.position().y - 13.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_first_against_box() {
        let mut ball = GameObject::new()
            .with_position(Vec2::new(0.0, 12.0))
            .with_velocity(Vec2::new(0.0, -10.0))
            .with_collider(Collider::circle(8.0))
            .with_rigid_body(RigidBody::new(Material::SUPER_BALL));
        let mut wall = GameObject::new()
            .with_collider(Collider::aabb(Vec2::new(100.0, 5.0)))
            .with_rigid_body(RigidBody::immovable(Material::SUPER_BALL));

        RigidBody::resolve_collision(&mut ball, &mut wall);
        ball.process_forces(None, 1.0);
        assert!((ball.velocity().y - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_box_box_least_penetration() {
        let a = Rect::from_center(Vec2::ZERO, Vec2::splat(5.0));
        let b = Rect::from_center(Vec2::new(8.0, 1.0), Vec2::splat(5.0));
        let contact = box_box_contact(&a, &b);
        assert_eq!(
            contact,
            Some(Contact {
                normal: Vec2::X,
                depth: 2.0
            })
        );
    }

    #[test]
    fn test_circle_inside_box_leaves_by_nearest_face() {
        let rect = Rect::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let contact = box_circle_contact(&rect, Vec2::new(0.0, -8.0), 1.0);
        assert_eq!(
            contact,
            Some(Contact {
                normal: Vec2::NEG_Y,
                depth: 3.0
            })
        );
    }

    #[test]
    fn test_coincident_circles_use_x() {
        let contact = circle_circle_contact(Vec2::ONE, 2.0, Vec2::ONE, 3.0);
        assert_eq!(
            contact,
            Some(Contact {
                normal: Vec2::X,
                depth: 5.0
            })
        );
    }

    #[test]
    fn test_polygons_are_skipped() {
        let mut a = GameObject::new()
            .with_collider(Collider::shaped(Shape::rectangle(Vec2::ZERO, Vec2::splat(5.0))))
            .with_rigid_body(RigidBody::default());
        let mut b = ball(3.0, -1.0, Material::ROCK);
        RigidBody::resolve_collision(&mut a, &mut b);
        assert_eq!(queued(&b), (0, 0));
    }

    #[test]
    fn test_process_forces_averages_corrections() {
        let mut object = GameObject::new().with_rigid_body(RigidBody::new(Material::ROCK));
        if let Some(body) = object.rigid_body.as_mut() {
            body.push_position_correction(Vec2::new(2.0, 0.0));
            body.push_position_correction(Vec2::new(4.0, 2.0));
            body.add_frame_force(ConstantForce(Vec2::new(10.0, 0.0)));
        }
        object.process_forces(None, 0.5);
        assert_eq!(object.position(), Vec2::new(3.0, 1.0));
        assert_eq!(object.velocity(), Vec2::new(5.0, 0.0));
        assert_eq!(queued(&object), (0, 0));
    }

    #[test]
    fn test_world_and_permanent_forces_persist() {
        let world = PhysicWorld::new().with_force(Gravity(Vec2::new(0.0, 10.0)));
        let mut body = RigidBody::new(Material::ROCK).with_mass(2.0);
        body.add_permanent_force(ConstantForce(Vec2::new(4.0, 0.0)));
        let mut object = GameObject::new().with_rigid_body(body);

        object.process_forces(Some(&world), 1.0);
        object.process_forces(Some(&world), 1.0);
        assert_eq!(object.velocity(), Vec2::new(4.0, 20.0));

        let mut wall = GameObject::new().with_rigid_body(RigidBody::immovable(Material::STATIC));
        wall.process_forces(Some(&world), 1.0);
        assert_eq!(wall.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_non_finite_force_dropped() {
        let mut object = GameObject::new()
            .with_velocity(Vec2::new(1.0, 1.0))
            .with_rigid_body(RigidBody::default());
        if let Some(body) = object.rigid_body.as_mut() {
            body.apply_impulse(Vec2::new(f32::NAN, 0.0));
        }
        object.process_forces(None, 1.0);
        assert_eq!(object.velocity(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_ambient_friction_never_reverses() {
        let drag = AmbientFriction::new(Vec2::ZERO, 100.0);
        let object = GameObject::new().with_velocity(Vec2::new(3.0, 0.0));
        let delta = drag.delta_speed(&object, 1.0, 1.0);
        assert_eq!(delta, Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_friction_combination() {
        let combined = Material::ROCK.combined_static_friction(&Material::WOOD);
        assert!((combined - 2.0f32.sqrt()).abs() < 1e-6);
        assert_eq!(Material::SUPER_BALL.combined_dynamic_friction(&Material::LIQUID), 0.0);
    }

    #[test]
    fn test_space_gravity_inverse_square() {
        let well = SpaceGravity {
            position: Vec2::new(10.0, 0.0),
            factor: 200.0,
        };
        let object = GameObject::new();
        assert_eq!(well.delta_speed(&object, 1.0, 0.5), Vec2::new(1.0, 0.0));
        assert_eq!(well.delta_speed(&object, 0.0, 0.5), Vec2::ZERO);

        let centred = GameObject::new().with_position(Vec2::new(10.0, 0.0));
        assert_eq!(well.delta_speed(&centred, 1.0, 0.5), Vec2::ZERO);
        assert_eq!(SpaceGravity::new(Vec2::ZERO, 2.0).factor, 2.0 * G);
    }

    #[test]
    fn test_unidirectional_controller_only_speeds_up() {
        let mut controller = UniDirectionalControllerForce::new(0.5);
        let object = GameObject::new().with_velocity(Vec2::new(1.0, 3.0));
        assert_eq!(controller.delta_speed(&object, 1.0, 1.0), Vec2::ZERO);

        controller.target = Vec2::new(4.0, 0.0);
        assert_eq!(controller.delta_speed(&object, 1.0, 1.0), Vec2::new(1.5, 0.0));

        let fast = GameObject::new().with_velocity(Vec2::new(5.0, 0.0));
        assert_eq!(controller.delta_speed(&fast, 1.0, 1.0), Vec2::ZERO);
    }

    #[test]
    fn test_spatial_controller_keeps_excess_speed() {
        let mut controller = SpatialControllerForce::new(0.5);
        controller.target = Vec2::new(4.0, 0.0);

        let slow = GameObject::new().with_velocity(Vec2::new(1.0, 2.0));
        assert_eq!(controller.delta_speed(&slow, 1.0, 1.0), Vec2::new(1.5, -1.0));

        let fast = GameObject::new().with_velocity(Vec2::new(6.0, 2.0));
        assert_eq!(controller.delta_speed(&fast, 1.0, 1.0), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_breaker_controller() {
        let object = GameObject::new().with_velocity(Vec2::new(2.0, 4.0));

        let mut everywhere = BreakerControllerForce::new(Vec2::ZERO, 0.5);
        assert_eq!(everywhere.delta_speed(&object, 1.0, 1.0), Vec2::ZERO);
        everywhere.enabled = true;
        assert_eq!(everywhere.delta_speed(&object, 1.0, 1.0), Vec2::new(-1.0, -2.0));

        let mut vertical = BreakerControllerForce::new(Vec2::new(0.0, 3.0), 0.5);
        vertical.enabled = true;
        assert_eq!(vertical.direction(), Vec2::Y);
        assert_eq!(vertical.delta_speed(&object, 1.0, 1.0), Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_permanent_controller_can_be_retargeted() {
        let mut body = RigidBody::new(Material::ROCK);
        body.add_permanent_force(UniDirectionalControllerForce::new(1.0));
        let mut object = GameObject::new().with_rigid_body(body);

        if let Some(controller) = object
            .rigid_body
            .as_mut()
            .and_then(RigidBody::permanent_force_mut::<UniDirectionalControllerForce>)
        {
            controller.target = Vec2::new(2.0, 0.0);
        }
        object.process_forces(None, 1.0);
        assert_eq!(object.velocity(), Vec2::new(2.0, 0.0));

        let missing = object
            .rigid_body
            .as_mut()
            .and_then(RigidBody::permanent_force_mut::<BreakerControllerForce>);
        assert!(missing.is_none());
    }
}
