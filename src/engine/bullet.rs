//! Projectiles that damage the first thing they hit

use glam::Vec2;

use super::collider::Collider;
use super::context::GameContext;
use super::object::{Behavior, Entity, GameObject, ObjectId};
use crate::geom::{Rect, Shape};

/// Bullet behaviour: never hits its launcher, dies on impact, range or age
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub launcher: Option<ObjectId>,
    pub damage: f32,
    /// Remaining seconds, if the bullet expires
    pub life_time: Option<f32>,
    /// The bullet dies once fully outside this rect
    pub max_rect: Option<Rect>,
    pub kill_on_collision: bool,
}

impl Bullet {
    pub fn new(launcher: Option<ObjectId>, damage: f32) -> Self {
        Self {
            launcher,
            damage,
            life_time: None,
            max_rect: None,
            kill_on_collision: true,
        }
    }

    pub fn with_life_time(mut self, seconds: f32) -> Self {
        self.life_time = Some(seconds);
        self
    }

    pub fn with_max_rect(mut self, rect: Rect) -> Self {
        self.max_rect = Some(rect);
        self
    }

    pub fn with_kill_on_collision(mut self, kill_on_collision: bool) -> Self {
        self.kill_on_collision = kill_on_collision;
        self
    }

    /// Arrow-like outline pointing along +X
    pub fn default_shape() -> Shape {
        Shape::polygon(
            Vec2::ZERO,
            vec![
                Vec2::new(-10.0, 2.0),
                Vec2::new(5.0, 2.0),
                Vec2::new(7.0, 1.0),
                Vec2::new(8.0, 0.0),
                Vec2::new(7.0, -1.0),
                Vec2::new(5.0, -2.0),
                Vec2::new(-10.0, -2.0),
            ],
        )
    }

    /// Wrap this behaviour in a moving object with a bullet collider
    pub fn spawn(self, position: Vec2, velocity: Vec2, shape: Shape) -> Entity {
        let object = GameObject::new()
            .with_position(position)
            .with_velocity(velocity)
            .with_collider(Collider::bullet(shape));
        Entity::new(object, self)
    }
}

impl Behavior for Bullet {
    fn on_frame(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>, dt: f32) {
        object.update_motion(dt);
        if let Some(rect) = &self.max_rect {
            if object.is_out_of_rect(rect, 0.0, 0.0) {
                object.kill(ctx);
            }
        }
        if let Some(life_time) = self.life_time.as_mut() {
            if *life_time <= 0.0 {
                object.kill(ctx);
            }
            *life_time -= dt;
        }
    }

    fn can_collide_with(&self, _object: &GameObject, other: &GameObject) -> bool {
        self.launcher != Some(other.id())
    }

    fn on_collision(
        &mut self,
        object: &mut GameObject,
        other: &mut GameObject,
        ctx: &mut GameContext<'_>,
    ) {
        if self.damage <= 0.0 || (!self.kill_on_collision && other.health.is_none()) {
            return;
        }
        if other.health.is_some() {
            other.receive_damage(ctx, self.damage);
        }
        if self.kill_on_collision {
            // One hit per bullet, even when it touched several targets this tick
            self.damage = 0.0;
            object.kill(ctx);
        }
    }
}

/// A bullet that steers towards the target closest to its heading
#[derive(Debug, Clone, PartialEq)]
pub struct HomingBullet {
    pub bullet: Bullet,
    /// Largest steering acceleration
    pub steer_force: f32,
    /// Targets further than this from the heading, in radians, are ignored
    pub max_angle: f32,
    pub max_speed: f32,
}

impl HomingBullet {
    pub fn new(bullet: Bullet, steer_force: f32, max_angle: f32) -> Self {
        Self {
            bullet,
            steer_force,
            max_angle,
            max_speed: 0.0,
        }
    }

    /// The launch speed becomes the speed limit
    pub fn spawn(mut self, position: Vec2, velocity: Vec2, shape: Shape) -> Entity {
        self.max_speed = velocity.length();
        let object = GameObject::new()
            .with_position(position)
            .with_velocity(velocity)
            .with_collider(Collider::bullet(shape));
        Entity::new(object, self)
    }

    /// Position of the candidate needing the smallest turn, among bodies that accept ours
    fn target_position(&self, object: &GameObject, ctx: &GameContext<'_>) -> Option<Vec2> {
        let position = object.position();
        let heading = object
            .velocity()
            .try_normalize()
            .unwrap_or(Vec2::from_angle(object.orientation()));
        ctx.others()
            .iter()
            .filter(|other| {
                other.object.accepts_layer(object.body_layer)
                    && Some(other.id()) != self.bullet.launcher
            })
            .filter_map(|other| {
                let offset = other.object.position() - position;
                if offset == Vec2::ZERO {
                    return None;
                }
                let angle = heading.angle_to(offset).abs();
                (angle < self.max_angle).then_some((angle, other.object.position()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, target)| target)
    }
}

impl Behavior for HomingBullet {
    fn on_frame(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>, dt: f32) {
        let steering = match self.target_position(object, ctx) {
            Some(target) => {
                let desired = (target - object.position()).normalize_or_zero() * self.max_speed;
                (desired - object.velocity()).clamp_length_max(self.steer_force)
            }
            None => Vec2::ZERO,
        };
        object.set_acceleration(steering);
        self.bullet.on_frame(object, ctx, dt);

        let velocity = object.velocity().clamp_length_max(self.max_speed);
        object.set_velocity(velocity);
        if velocity != Vec2::ZERO {
            let turn = velocity.to_angle() - object.orientation();
            object.rotate(turn);
        }
    }

    fn can_collide_with(&self, object: &GameObject, other: &GameObject) -> bool {
        self.bullet.can_collide_with(object, other)
    }

    fn on_collision(
        &mut self,
        object: &mut GameObject,
        other: &mut GameObject,
        ctx: &mut GameContext<'_>,
    ) {
        self.bullet.on_collision(object, other, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::manager::GameManager;
    use crate::engine::object::Health;

    fn target(x: f32, health: Option<f32>) -> Entity {
        let mut object = GameObject::new()
            .with_position(Vec2::new(x, 0.0))
            .with_collider(Collider::circle(20.0));
        object.health = health.map(Health::new);
        Entity::plain(object)
    }

    #[test]
    fn test_bullet_damages_and_dies() {
        let mut manager = GameManager::default();
        let victim = manager.add_object(target(0.0, Some(3.0)));
        let bullet = manager.add_object(Bullet::new(None, 2.0).spawn(
            Vec2::new(5.0, 0.0),
            Vec2::ZERO,
            Shape::circle(Vec2::ZERO, 1.0),
        ));
        manager.tick();

        assert!(manager.object(bullet).is_none());
        let health = manager
            .object(victim)
            .and_then(|e| e.object.health)
            .map(|h| h.value);
        assert_eq!(health, Some(1.0));
    }

    #[test]
    fn test_bullet_spares_launcher() {
        let mut manager = GameManager::default();
        let launcher = manager.add_object(target(0.0, Some(3.0)));
        let bullet = manager.add_object(Bullet::new(Some(launcher), 2.0).spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Bullet::default_shape(),
        ));
        manager.tick();
        assert!(manager.object(bullet).is_some());
        assert_eq!(
            manager.object(launcher).and_then(|e| e.object.health),
            Some(Health::new(3.0))
        );
    }

    #[test]
    fn test_bullet_dies_on_scenery() {
        let mut manager = GameManager::default();
        manager.add_object(target(0.0, None));
        let bullet = manager.add_object(Bullet::new(None, 1.0).spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Shape::circle(Vec2::ZERO, 1.0),
        ));
        manager.tick();
        assert!(manager.object(bullet).is_none());
    }

    #[test]
    fn test_bullet_expires_and_leaves_range() {
        let mut manager = GameManager::new(crate::engine::GameManagerParams {
            game_dt: Some(0.5),
            ..Default::default()
        });
        let aged = manager.add_object(
            Bullet::new(None, 1.0)
                .with_life_time(0.5)
                .spawn(Vec2::ZERO, Vec2::ZERO, Shape::circle(Vec2::ZERO, 1.0)),
        );
        let ranged = manager.add_object(
            Bullet::new(None, 1.0)
                .with_max_rect(Rect::new(Vec2::splat(-10.0), Vec2::splat(10.0)))
                .spawn(
                    Vec2::new(200.0, 0.0),
                    Vec2::new(100.0, 0.0),
                    Shape::circle(Vec2::ZERO, 1.0),
                ),
        );
        manager.tick();
        assert!(manager.object(aged).is_some());
        assert!(manager.object(ranged).is_none());
        manager.tick();
        assert!(manager.object(aged).is_none());
    }

    fn homing_setup(max_angle: f32, launcher_is_target: bool) -> (GameManager, ObjectId) {
        let mut manager = GameManager::new(crate::engine::GameManagerParams {
            game_dt: Some(0.1),
            ..Default::default()
        });
        let side = manager.add_object(Entity::plain(
            GameObject::new()
                .with_position(Vec2::new(0.0, 100.0))
                .with_collider(Collider::circle(20.0)),
        ));
        manager.add_object(target(-100.0, None));
        manager.tick();

        let launcher = launcher_is_target.then_some(side);
        let homing = manager.add_object(
            HomingBullet::new(Bullet::new(launcher, 1.0), 100.0, max_angle).spawn(
                Vec2::ZERO,
                Vec2::new(10.0, 0.0),
                Shape::circle(Vec2::ZERO, 1.0),
            ),
        );
        (manager, homing)
    }

    #[test]
    fn test_homing_bullet_turns_towards_target() {
        let (mut manager, homing) = homing_setup(std::f32::consts::PI, false);
        // The bullet goes live and steers in the same tick
        manager.tick();

        let object = manager.object(homing).map(|e| &e.object);
        let velocity = object.map(GameObject::velocity).unwrap_or_default();
        assert!((velocity - Vec2::new(9.0, 1.0)).length() < 1e-4);
        assert!(velocity.length() <= 10.0 + 1e-4);
        let orientation = object.map(GameObject::orientation).unwrap_or_default();
        assert!((orientation - velocity.to_angle()).abs() < 1e-5);
    }

    #[test]
    fn test_homing_bullet_ignores_wide_and_launcher_targets() {
        // Too narrow a cone, or the only target in range is the launcher
        for (max_angle, launcher_is_target) in [(0.1, false), (3.0, true)] {
            let (mut manager, homing) = homing_setup(max_angle, launcher_is_target);
            manager.tick();
            let velocity = manager.object(homing).map(|e| e.object.velocity());
            assert_eq!(velocity, Some(Vec2::new(10.0, 0.0)));
        }
    }
}
