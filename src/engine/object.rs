//! Game objects and their behaviour hooks
//!
//! A live object is an [`Entity`]: the [`GameObject`] data every hook can read, paired with
//! a boxed [`Behavior`] carrying the per-type logic. Keeping them apart lets the manager
//! hand a behaviour mutable access to its own object while other objects stay borrowable.

use std::any::Any;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::context::GameContext;
use super::physics::{PhysicWorld, RigidBody};
use super::renderer::Renderer;
use crate::consts::NO_LAYER;
use crate::geom::Rect;

/// Identity of an object, assigned when it is queued into a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Id of an object that was never queued
    pub const UNASSIGNED: ObjectId = ObjectId(0);

    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-type defaults copied into every new instance
///
/// Declare one `const` per object type and build instances with
/// [`GameObject::with_class`]; the copied fields stay mutable per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectClass {
    /// Negative means not rendered
    pub render_layer: i32,
    /// Negative means never collides
    pub body_layer: i32,
    /// Body layers this type initiates collisions against
    pub collision_layers: &'static [i32],
    /// Negative means never handles a collision
    pub collision_priority: i32,
    pub living: bool,
}

impl ObjectClass {
    pub const DEFAULT: ObjectClass = ObjectClass {
        render_layer: 0,
        body_layer: 0,
        collision_layers: &[0],
        collision_priority: 0,
        living: true,
    };

    /// Rendered scenery that takes no part in collisions
    pub const DECOR: ObjectClass = ObjectClass {
        body_layer: NO_LAYER,
        collision_layers: &[],
        ..ObjectClass::DEFAULT
    };
}

impl Default for ObjectClass {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hit points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub value: f32,
    pub max: Option<f32>,
}

impl Health {
    pub fn new(value: f32) -> Self {
        Self { value, max: None }
    }

    pub fn with_max(value: f32, max: f32) -> Self {
        Self {
            value: value.min(max),
            max: Some(max),
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.value += amount;
        if let Some(max) = self.max {
            self.value = self.value.min(max);
        }
    }

    /// Returns true once health is depleted
    pub fn damage(&mut self, amount: f32) -> bool {
        if amount >= self.value {
            self.value = 0.0;
            true
        } else {
            self.value -= amount;
            false
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }
}

/// Regenerating resource spent by actions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub value: f32,
    pub max: f32,
}

impl Energy {
    pub fn new(max: f32) -> Self {
        Self { value: max, max }
    }

    pub fn recover(&mut self, amount: f32) {
        if self.value < self.max {
            self.value = (self.value + amount).min(self.max);
        }
    }

    /// Spends `amount` if available; leaves the pool untouched otherwise
    pub fn consume(&mut self, amount: f32) -> bool {
        if amount <= self.value {
            self.value -= amount;
            true
        } else {
            false
        }
    }
}

/// Free-form labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn add(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has(&tag) {
            self.0.push(tag);
        }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn is_tagged(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Data shared by every object type
///
/// Motion vectors stay `None` until first written; the getters report `Vec2::ZERO` for
/// them. Transforms applied to the object are forwarded to its collider and renderer.
#[derive(Debug)]
pub struct GameObject {
    id: ObjectId,
    position: Option<Vec2>,
    velocity: Option<Vec2>,
    acceleration: Option<Vec2>,
    rotation_speed: f32,
    orientation: f32,
    collider: Option<Collider>,
    renderer: Option<Box<dyn Renderer>>,

    pub render_layer: i32,
    pub body_layer: i32,
    pub collision_layers: Vec<i32>,
    pub collision_priority: i32,
    /// Only living objects get `on_frame`
    pub living: bool,

    pub rigid_body: Option<RigidBody>,
    pub health: Option<Health>,
    pub energy: Option<Energy>,
    pub tags: Tags,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

impl GameObject {
    pub fn new() -> Self {
        Self::with_class(&ObjectClass::DEFAULT)
    }

    pub fn with_class(class: &ObjectClass) -> Self {
        let mut object = Self {
            id: ObjectId::UNASSIGNED,
            position: None,
            velocity: None,
            acceleration: None,
            rotation_speed: 0.0,
            orientation: 0.0,
            collider: None,
            renderer: None,
            render_layer: 0,
            body_layer: 0,
            collision_layers: Vec::new(),
            collision_priority: 0,
            living: true,
            rigid_body: None,
            health: None,
            energy: None,
            tags: Tags::default(),
        };
        object.apply_class(class);
        object
    }

    /// Reset the classification fields to a type's defaults
    pub fn apply_class(&mut self, class: &ObjectClass) {
        self.render_layer = class.render_layer;
        self.body_layer = class.body_layer;
        self.collision_layers = class.collision_layers.to_vec();
        self.collision_priority = class.collision_priority;
        self.living = class.living;
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    pub fn with_rotation_speed(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.set_collider(Some(collider));
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.set_renderer(Some(Box::new(renderer)));
        self
    }

    pub fn with_rigid_body(mut self, rigid_body: RigidBody) -> Self {
        self.rigid_body = Some(rigid_body);
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_energy(mut self, energy: Energy) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.add(tag);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    // --- Attachments ---

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.collider.as_mut()
    }

    /// Attach a collider, moving it onto the object
    pub fn set_collider(&mut self, collider: Option<Collider>) {
        self.collider = collider;
        if let (Some(collider), Some(position)) = (self.collider.as_mut(), self.position) {
            collider.set_position(position);
        }
    }

    pub fn renderer(&self) -> Option<&(dyn Renderer + 'static)> {
        self.renderer.as_deref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut (dyn Renderer + 'static)> {
        self.renderer.as_deref_mut()
    }

    pub fn set_renderer(&mut self, renderer: Option<Box<dyn Renderer>>) {
        self.renderer = renderer;
        if let (Some(renderer), Some(position)) = (self.renderer.as_mut(), self.position) {
            renderer.set_position(position);
        }
    }

    // --- Motion ---

    pub fn position(&self) -> Vec2 {
        self.position.unwrap_or(Vec2::ZERO)
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn set_position(&mut self, position: Vec2) -> &mut Self {
        self.position = Some(position);
        if let Some(collider) = self.collider.as_mut() {
            collider.set_position(position);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_position(position);
        }
        self
    }

    pub fn set_position_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.set_position(Vec2::new(x, y))
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity.unwrap_or(Vec2::ZERO)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) -> &mut Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn set_velocity_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.set_velocity(Vec2::new(x, y))
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration.unwrap_or(Vec2::ZERO)
    }

    pub fn set_acceleration(&mut self, acceleration: Vec2) -> &mut Self {
        self.acceleration = Some(acceleration);
        self
    }

    pub fn set_acceleration_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.set_acceleration(Vec2::new(x, y))
    }

    /// Radians per second
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn set_rotation_speed(&mut self, rotation_speed: f32) -> &mut Self {
        self.rotation_speed = rotation_speed;
        self
    }

    /// Accumulated rotation in radians
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    pub fn move_by(&mut self, delta: Vec2) -> &mut Self {
        let position = self.position() + delta;
        self.set_position(position)
    }

    pub fn move_xy(&mut self, x: f32, y: f32) -> &mut Self {
        self.move_by(Vec2::new(x, y))
    }

    pub fn accelerate(&mut self, delta: Vec2) -> &mut Self {
        self.velocity = Some(self.velocity() + delta);
        self
    }

    pub fn rotate(&mut self, radians: f32) -> &mut Self {
        self.orientation += radians;
        if let Some(collider) = self.collider.as_mut() {
            collider.rotate(radians);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.rotate(radians);
        }
        self
    }

    pub fn scale(&mut self, factor: f32) -> &mut Self {
        if let Some(collider) = self.collider.as_mut() {
            collider.scale(factor);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.scale(factor);
        }
        self
    }

    pub fn move_on_frame(&mut self, dt: f32) {
        let velocity = self.velocity();
        if velocity != Vec2::ZERO {
            self.move_by(velocity * dt);
        }
    }

    pub fn accelerate_on_frame(&mut self, dt: f32) {
        let acceleration = self.acceleration();
        if acceleration != Vec2::ZERO {
            self.accelerate(acceleration * dt);
        }
    }

    pub fn rotate_on_frame(&mut self, dt: f32) {
        if self.rotation_speed != 0.0 {
            self.rotate(self.rotation_speed * dt);
        }
    }

    /// Default per-frame motion: move, then accelerate, then rotate
    pub fn update_motion(&mut self, dt: f32) {
        self.move_on_frame(dt);
        self.accelerate_on_frame(dt);
        self.rotate_on_frame(dt);
    }

    // --- Bounds ---

    /// Union of the render and collider rects
    pub fn rect(&self) -> Rect {
        self.render_rect().union(&self.collider_rect())
    }

    pub fn render_rect(&self) -> Rect {
        match &self.renderer {
            Some(renderer) => renderer.rect(),
            None => Rect::from_point(self.position()),
        }
    }

    pub fn collider_rect(&self) -> Rect {
        match &self.collider {
            Some(collider) => collider.rect(),
            None => Rect::from_point(self.position()),
        }
    }

    pub fn radius(&self) -> f32 {
        self.render_radius().max(self.collider_radius())
    }

    pub fn render_radius(&self) -> f32 {
        self.renderer.as_ref().map_or(0.0, |r| r.radius())
    }

    pub fn collider_radius(&self) -> f32 {
        self.collider.as_ref().map_or(0.0, Collider::radius)
    }

    /// True when the bounds grown by the margins no longer touch `rect`
    pub fn is_out_of_rect(&self, rect: &Rect, margin_x: f32, margin_y: f32) -> bool {
        !self.rect().expand(margin_x, margin_y).overlaps(rect)
    }

    /// Push the object back inside `rect` shrunk by the margins.
    ///
    /// Returns the correction applied, `Vec2::ZERO` when none was needed.
    pub fn maintain_in_rect(&mut self, rect: &Rect, margin_x: f32, margin_y: f32) -> Vec2 {
        let bounds = rect.expand(-margin_x, -margin_y);
        let own = self.rect();
        let axis = |min: f32, max: f32, own_min: f32, own_max: f32| {
            if own_min < min {
                min - own_min
            } else if own_max > max {
                max - own_max
            } else {
                0.0
            }
        };
        let delta = Vec2::new(
            axis(bounds.min.x, bounds.max.x, own.min.x, own.max.x),
            axis(bounds.min.y, bounds.max.y, own.min.y, own.max.y),
        );
        if delta != Vec2::ZERO {
            self.move_by(delta);
        }
        delta
    }

    // --- Collision ---

    pub fn accepts_layer(&self, layer: i32) -> bool {
        self.collision_layers.contains(&layer)
    }

    pub fn can_collide(&self) -> bool {
        self.body_layer >= 0
    }

    /// Either side may initiate: A accepts B's body layer or B accepts A's
    pub fn layers_match(&self, other: &GameObject) -> bool {
        self.accepts_layer(other.body_layer) || other.accepts_layer(self.body_layer)
    }

    pub fn prepare_collision(&mut self) {
        let position = self.position();
        if let Some(collider) = self.collider.as_mut() {
            collider.prepare_collision(position);
        }
    }

    /// Geometric test only; objects without a collider never collide
    pub fn collides(&self, other: &GameObject) -> bool {
        match (&self.collider, &other.collider) {
            (Some(a), Some(b)) => a.collides(b),
            _ => false,
        }
    }

    // --- Lifecycle ---

    /// Queue this object for removal at the end of the tick
    pub fn kill(&self, ctx: &mut GameContext<'_>) {
        ctx.kill(self.id);
    }

    /// Subtract health, killing the object when it runs out.
    ///
    /// Objects without a health component ignore damage. Returns true if this hit killed.
    pub fn receive_damage(&mut self, ctx: &mut GameContext<'_>, amount: f32) -> bool {
        let Some(health) = self.health.as_mut() else {
            return false;
        };
        let killed = health.damage(amount);
        if killed {
            ctx.kill(self.id);
        }
        killed
    }

    /// Apply the attached rigid body's queued forces and corrections
    pub fn process_forces(&mut self, world: Option<&PhysicWorld>, dt: f32) {
        if let Some(mut body) = self.rigid_body.take() {
            body.process_forces(world, self, dt);
            self.rigid_body = Some(body);
        }
    }
}

/// Upcast helper for behaviour downcasting
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-type hooks invoked by the manager
///
/// Every hook has a default, so a type only overrides what it changes. `object` is always
/// the entity's own data.
pub trait Behavior: AsAny + fmt::Debug {
    /// Runs once per tick for living objects
    fn on_frame(&mut self, object: &mut GameObject, _ctx: &mut GameContext<'_>, dt: f32) {
        object.update_motion(dt);
    }

    /// Veto a collision before the geometric test
    fn can_collide_with(&self, _object: &GameObject, _other: &GameObject) -> bool {
        true
    }

    /// Called on the handling object with every body it hit this tick.
    ///
    /// The default notifies both sides of each pair.
    fn handle_collision(
        &mut self,
        object: &mut GameObject,
        others: &mut [&mut Entity],
        ctx: &mut GameContext<'_>,
    ) {
        for other in others.iter_mut() {
            self.on_collision(object, &mut other.object, ctx);
            other.notify_collision(object, ctx);
        }
    }

    fn on_collision(
        &mut self,
        _object: &mut GameObject,
        _other: &mut GameObject,
        _ctx: &mut GameContext<'_>,
    ) {
    }

    /// Runs for every body after the collision pass, hit or not
    fn end_collision(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>) {
        object.process_forces(ctx.physic_world(), ctx.game_dt());
    }

    /// Runs exactly once, after the object left the live list
    fn on_death(&mut self, _object: &mut GameObject, _ctx: &mut GameContext<'_>) {}
}

/// Behaviour that keeps every default
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Behavior for Plain {}

/// A game object paired with its behaviour
#[derive(Debug)]
pub struct Entity {
    pub object: GameObject,
    pub(crate) behavior: Box<dyn Behavior>,
}

impl Entity {
    pub fn new(object: GameObject, behavior: impl Behavior) -> Self {
        Self {
            object,
            behavior: Box::new(behavior),
        }
    }

    pub fn plain(object: GameObject) -> Self {
        Self::new(object, Plain)
    }

    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    fn behavior_any(&self) -> &dyn Any {
        let behavior: &dyn Behavior = self.behavior.as_ref();
        behavior.as_any()
    }

    fn behavior_any_mut(&mut self) -> &mut dyn Any {
        let behavior: &mut dyn Behavior = self.behavior.as_mut();
        behavior.as_any_mut()
    }

    pub fn is<T: Behavior>(&self) -> bool {
        self.behavior_any().is::<T>()
    }

    pub fn behavior<T: Behavior>(&self) -> Option<&T> {
        self.behavior_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.behavior_any_mut().downcast_mut::<T>()
    }

    /// Deliver `on_collision` to this entity's behaviour
    pub fn notify_collision(&mut self, other: &mut GameObject, ctx: &mut GameContext<'_>) {
        self.behavior.on_collision(&mut self.object, other, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::{EventSink, ObjectQueue};
    use crate::engine::renderer::ShapeRenderer;
    use crate::geom::Shape;

    #[derive(Debug, Default)]
    struct Marker(u32);

    impl Behavior for Marker {}

    #[test]
    fn test_class_defaults() {
        let object = GameObject::new();
        assert_eq!(object.render_layer, 0);
        assert_eq!(object.body_layer, 0);
        assert_eq!(object.collision_layers, vec![0]);
        assert_eq!(object.collision_priority, 0);
        assert!(object.living);
        assert_eq!(object.id(), ObjectId::UNASSIGNED);

        let decor = GameObject::with_class(&ObjectClass::DECOR);
        assert!(!decor.can_collide());
        assert!(decor.collision_layers.is_empty());
    }

    #[test]
    fn test_unset_vectors_read_as_zero() {
        let mut object = GameObject::new();
        assert!(!object.has_position());
        assert_eq!(object.velocity(), Vec2::ZERO);

        let mut zero = object.velocity();
        zero.x = 5.0;
        assert_ne!(zero, object.velocity());
        assert_eq!(object.velocity(), Vec2::ZERO);

        object.accelerate(Vec2::new(1.0, 0.0));
        assert_eq!(object.velocity(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_update_motion_order() {
        let mut object = GameObject::new()
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_acceleration(Vec2::new(0.0, 5.0))
            .with_rotation_speed(2.0);
        object.update_motion(0.5);

        // Position uses the velocity from before this frame's acceleration
        assert_eq!(object.position(), Vec2::new(5.0, 0.0));
        assert_eq!(object.velocity(), Vec2::new(10.0, 2.5));
        assert_eq!(object.orientation(), 1.0);
    }

    #[test]
    fn test_zero_velocity_leaves_position_unset() {
        let mut object = GameObject::new();
        object.update_motion(1.0);
        assert!(!object.has_position());
    }

    #[test]
    fn test_transforms_reach_attachments() {
        let mut object = GameObject::new()
            .with_collider(Collider::circle(2.0))
            .with_renderer(ShapeRenderer::new(Shape::circle(Vec2::ZERO, 3.0), 0xffffffff));
        object.set_position_xy(10.0, 10.0);
        assert_eq!(object.collider_rect().center(), Vec2::new(10.0, 10.0));
        assert_eq!(object.render_rect().center(), Vec2::new(10.0, 10.0));

        object.scale(2.0);
        assert_eq!(object.collider_radius(), 4.0);
        assert_eq!(object.radius(), 6.0);
    }

    #[test]
    fn test_collider_attached_after_position() {
        let object = GameObject::new()
            .with_position(Vec2::new(-4.0, 2.0))
            .with_collider(Collider::aabb(Vec2::splat(1.0)));
        assert_eq!(object.collider_rect().center(), Vec2::new(-4.0, 2.0));
    }

    #[test]
    fn test_out_of_rect_respects_margin() {
        let screen = Rect::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let object = GameObject::new()
            .with_position(Vec2::new(-10.0, 50.0))
            .with_collider(Collider::aabb(Vec2::splat(5.0)));
        assert!(object.is_out_of_rect(&screen, 0.0, 0.0));
        assert!(!object.is_out_of_rect(&screen, 5.0, 0.0));
    }

    #[test]
    fn test_maintain_in_rect() {
        let screen = Rect::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let mut object = GameObject::new()
            .with_position(Vec2::new(98.0, 50.0))
            .with_collider(Collider::aabb(Vec2::splat(5.0)));

        let correction = object.maintain_in_rect(&screen, 0.0, 0.0);
        assert_eq!(correction, Vec2::new(-3.0, 0.0));
        assert_eq!(object.position(), Vec2::new(95.0, 50.0));

        assert_eq!(object.maintain_in_rect(&screen, 0.0, 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_layer_match_is_a_union() {
        let mut a = GameObject::new();
        a.body_layer = 1;
        a.collision_layers = vec![2];
        let mut b = GameObject::new();
        b.body_layer = 2;
        b.collision_layers = vec![];

        assert!(a.layers_match(&b));
        assert!(b.layers_match(&a));

        b.body_layer = 3;
        assert!(!a.layers_match(&b));
    }

    #[test]
    fn test_no_collider_never_collides() {
        let a = GameObject::new().with_collider(Collider::circle(5.0));
        let b = GameObject::new();
        assert!(!a.collides(&b));
        assert!(!b.collides(&a));
    }

    #[test]
    fn test_receive_damage_kills_once_depleted() {
        let mut queue = ObjectQueue::new();
        let mut events = EventSink::default();
        let mut ctx = GameContext::new(&mut queue, &mut events, None, None, 1.0);

        let mut object = GameObject::new().with_health(Health::new(10.0));
        object.assign_id(ObjectId::new(7));
        assert!(!object.receive_damage(&mut ctx, 4.0));
        assert!(object.receive_damage(&mut ctx, 6.0));
        assert!(object.health.is_some_and(|h| h.is_depleted()));
        assert_eq!(queue.pending_removals(), vec![ObjectId::new(7)]);
    }

    #[test]
    fn test_health_energy_tags() {
        let mut health = Health::with_max(5.0, 10.0);
        health.heal(20.0);
        assert_eq!(health.value, 10.0);

        let mut energy = Energy::new(3.0);
        assert!(energy.consume(2.0));
        assert!(!energy.consume(2.0));
        energy.recover(5.0);
        assert_eq!(energy.value, 3.0);

        let mut tags = Tags::default();
        assert!(!tags.is_tagged());
        tags.add("enemy");
        tags.add("enemy");
        assert!(tags.has("enemy"));
        assert_eq!(tags.iter().count(), 1);
        tags.clear();
        assert!(!tags.has("enemy"));
    }

    #[test]
    fn test_entity_downcast() {
        let mut entity = Entity::new(GameObject::new(), Marker(3));
        assert!(entity.is::<Marker>());
        assert!(!entity.is::<Plain>());
        assert_eq!(entity.behavior::<Marker>().map(|m| m.0), Some(3));

        if let Some(marker) = entity.behavior_mut::<Marker>() {
            marker.0 = 4;
        }
        assert_eq!(entity.behavior::<Marker>().map(|m| m.0), Some(4));
        assert!(entity.behavior::<Plain>().is_none());
    }
}
