//! Arcade Core demo entry point
//!
//! Runs a headless asteroid field: a spawner throws asteroids at a turret sitting in the
//! middle of the screen, the turret shoots back, big asteroids split when destroyed.
//!
//! Usage: `arcade-core [settings.json] [seed] [--realtime]`

#[cfg(not(target_arch = "wasm32"))]
mod asteroids {
    use std::f32::consts::{FRAC_PI_4, TAU};

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use arcade_core::engine::{
        Behavior, Bullet, Collider, Entity, GameContext, GameObject, Health, ObjectClass,
        ShapeRenderer,
    };
    use arcade_core::{Rect, Shape};

    pub const ASTEROID_LAYER: i32 = 1;
    pub const TURRET_LAYER: i32 = 2;
    pub const BULLET_LAYER: i32 = 3;

    const ASTEROID: ObjectClass = ObjectClass {
        body_layer: ASTEROID_LAYER,
        collision_layers: &[ASTEROID_LAYER, TURRET_LAYER, BULLET_LAYER],
        ..ObjectClass::DEFAULT
    };
    const TURRET: ObjectClass = ObjectClass {
        body_layer: TURRET_LAYER,
        collision_layers: &[],
        ..ObjectClass::DEFAULT
    };
    const BULLET: ObjectClass = ObjectClass {
        body_layer: BULLET_LAYER,
        collision_layers: &[],
        collision_priority: 1,
        ..ObjectClass::DEFAULT
    };

    const BIG_SIZE: (f32, f32) = (30.0, 50.0);
    const SMALL_SIZE: (f32, f32) = (10.0, 20.0);
    const BIG_POINTS: (usize, usize) = (10, 15);
    const SMALL_POINTS: (usize, usize) = (6, 9);
    const DIVIDE_NUMBER: (usize, usize) = (2, 4);
    const MAX_SPEED: f32 = 100.0;
    const MAX_ROTATION_SPEED: f32 = 1.0;

    const BULLET_SPEED: f32 = 400.0;
    const FIRE_PERIOD: f32 = 0.4;

    /// Jagged outline with neighbouring radii at most 3 apart
    fn asteroid_shape(rng: &mut Pcg32, big: bool) -> Shape {
        let (min_points, max_points) = if big { BIG_POINTS } else { SMALL_POINTS };
        let (min_size, max_size) = if big { BIG_SIZE } else { SMALL_SIZE };
        let points = rng.random_range(min_points..max_points);

        let mut radii = vec![rng.random_range(min_size..max_size)];
        for i in 1..points {
            let previous = radii[i - 1];
            let low = min_size.max(previous - 3.0);
            let high = max_size.min(previous + 3.0);
            radii.push(rng.random_range(low..=high));
        }
        radii[points - 1] = (radii[points - 1] + radii[0]) / 2.0;
        Shape::regular(Vec2::ZERO, &radii, points, rng.random_range(0.0..TAU))
    }

    /// Breaks on any impact; big ones leave fragments behind
    #[derive(Debug)]
    pub struct Asteroid {
        exploded: bool,
        rng: Pcg32,
    }

    impl Asteroid {
        fn spawn(
            rng: &mut Pcg32,
            position: Vec2,
            velocity: Vec2,
            rotation_speed: f32,
            shape: Shape,
        ) -> Entity {
            let object = GameObject::with_class(&ASTEROID)
                .with_velocity(velocity)
                .with_rotation_speed(rotation_speed)
                .with_collider(Collider::shaped(shape.clone()))
                .with_renderer(ShapeRenderer::outlined(shape, 0xffffffff))
                .with_position(position);
            let behavior = Asteroid {
                exploded: false,
                rng: Pcg32::seed_from_u64(rng.random()),
            };
            Entity::new(object, behavior)
        }
    }

    impl Behavior for Asteroid {
        fn on_frame(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>, dt: f32) {
            object.update_motion(dt);
            if let Some(viewer) = ctx.viewer() {
                let margin = viewer.visible_rect.width() / 50.0;
                if object.is_out_of_rect(&viewer.visible_rect, margin, margin) {
                    object.kill(ctx);
                }
            }
        }

        fn on_collision(
            &mut self,
            object: &mut GameObject,
            _other: &mut GameObject,
            ctx: &mut GameContext<'_>,
        ) {
            self.exploded = true;
            object.kill(ctx);
        }

        fn on_death(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>) {
            if !self.exploded {
                return;
            }
            ctx.fire_object_destroyed(object.id());
            if object.collider_radius() < BIG_SIZE.0 {
                return;
            }

            let count = self.rng.random_range(DIVIDE_NUMBER.0..=DIVIDE_NUMBER.1);
            log::debug!("Asteroid {} splits into {count}", object.id());
            let step = TAU / count as f32;
            let mut angle = self.rng.random_range(0.0..TAU);
            for _ in 0..count {
                let shape = asteroid_shape(&mut self.rng, false);
                let jitter = self.rng.random_range(-step / 4.0..step / 4.0);
                let direction = Vec2::from_angle(angle + jitter);
                angle += step;
                let position = object.position() + direction * shape.radius() * 1.3;
                let rotation_speed = self.rng.random_range(0.0..MAX_ROTATION_SPEED);
                let fragment = Asteroid::spawn(
                    &mut self.rng,
                    position,
                    direction * MAX_SPEED,
                    rotation_speed,
                    shape,
                );
                let id = ctx.add_object(fragment);
                ctx.fire_object_created(id);
            }
        }
    }

    /// Quadratic ease-in-out over [0, 1]
    fn ease_in_out(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            2.0 * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
        }
    }

    /// Point at fraction `t` of the perimeter, clockwise from the top-left corner
    fn perimeter_point(rect: &Rect, t: f32) -> Vec2 {
        let (w, h) = (rect.width(), rect.height());
        let mut d = t.rem_euclid(1.0) * 2.0 * (w + h);
        if d < w {
            return Vec2::new(rect.min.x + d, rect.min.y);
        }
        d -= w;
        if d < h {
            return Vec2::new(rect.max.x, rect.min.y + d);
        }
        d -= h;
        if d < w {
            return Vec2::new(rect.max.x - d, rect.max.y);
        }
        d -= w;
        Vec2::new(rect.min.x, rect.max.y - d)
    }

    /// Throws asteroids in from the screen edges at a rate ramping up over a minute
    #[derive(Debug)]
    pub struct Spawner {
        start_rate: f32,
        max_rate: f32,
        time: f32,
        spawned: f32,
        rng: Pcg32,
    }

    impl Spawner {
        pub fn spawn(seed: u64, start_rate: f32, max_rate: f32) -> Entity {
            let behavior = Spawner {
                start_rate,
                max_rate,
                time: 0.0,
                spawned: 0.0,
                rng: Pcg32::seed_from_u64(seed),
            };
            Entity::new(GameObject::with_class(&ObjectClass::DECOR), behavior)
        }
    }

    impl Behavior for Spawner {
        fn on_frame(&mut self, _object: &mut GameObject, ctx: &mut GameContext<'_>, dt: f32) {
            let Some(viewer) = ctx.viewer() else {
                return;
            };
            self.time += dt;
            let rate = ease_in_out(self.time / 60.0) * (self.max_rate - self.start_rate)
                + self.start_rate;
            let total = self.spawned + rate * dt;
            let count = (total.floor() - self.spawned.floor()) as usize;
            self.spawned = total;

            let visible = viewer.visible_rect;
            for _ in 0..count {
                let shape = asteroid_shape(&mut self.rng, true);
                let margin = shape.radius();
                let position =
                    perimeter_point(&visible.expand(margin, margin), self.rng.random());
                let heading = (visible.center() - position)
                    .normalize_or_zero()
                    .rotate(Vec2::from_angle(self.rng.random_range(-FRAC_PI_4..FRAC_PI_4)));
                let velocity = heading * self.rng.random_range(0.2..1.0) * MAX_SPEED;
                let rotation_speed = self.rng.random_range(0.0..MAX_ROTATION_SPEED);
                let asteroid =
                    Asteroid::spawn(&mut self.rng, position, velocity, rotation_speed, shape);
                let id = ctx.add_object(asteroid);
                ctx.fire_object_created(id);
            }
        }
    }

    /// Fixed gun shooting at the closest asteroid; the game stops when it is destroyed
    #[derive(Debug, Default)]
    pub struct Turret {
        cooldown: f32,
        shots: u32,
    }

    impl Turret {
        pub fn spawn(position: Vec2, health: f32) -> Entity {
            let object = GameObject::with_class(&TURRET)
                .with_collider(Collider::circle(15.0))
                .with_health(Health::new(health))
                .with_position(position);
            Entity::new(object, Turret::default())
        }
    }

    impl Behavior for Turret {
        fn on_frame(&mut self, object: &mut GameObject, ctx: &mut GameContext<'_>, dt: f32) {
            self.cooldown -= dt;
            if self.cooldown > 0.0 {
                return;
            }
            let position = object.position();
            let target = ctx
                .others()
                .iter()
                .filter(|entity| entity.is::<Asteroid>())
                .map(|entity| entity.object.position())
                .min_by(|a, b| {
                    a.distance_squared(position)
                        .total_cmp(&b.distance_squared(position))
                });
            let Some(target) = target else {
                return;
            };

            let direction = (target - position).normalize_or(Vec2::X);
            let mut bullet = Bullet::new(Some(object.id()), 1.0);
            if let Some(viewer) = ctx.viewer() {
                bullet = bullet.with_max_rect(viewer.visible_rect);
            }
            let mut entity = bullet.with_life_time(3.0).spawn(
                position,
                direction * BULLET_SPEED,
                Bullet::default_shape(),
            );
            entity.object.apply_class(&BULLET);
            entity.object.rotate(direction.to_angle());
            ctx.add_object(entity);

            self.shots += 1;
            self.cooldown = FIRE_PERIOD;
        }

        fn on_collision(
            &mut self,
            object: &mut GameObject,
            other: &mut GameObject,
            ctx: &mut GameContext<'_>,
        ) {
            if other.body_layer == ASTEROID_LAYER && object.receive_damage(ctx, 1.0) {
                log::info!("Turret destroyed after {} shots", self.shots);
            }
        }

        fn on_death(&mut self, _object: &mut GameObject, ctx: &mut GameContext<'_>) {
            ctx.stop();
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_perimeter_walks_clockwise() {
            let rect = Rect::new(Vec2::ZERO, Vec2::new(10.0, 30.0));
            assert_eq!(perimeter_point(&rect, 0.0), Vec2::ZERO);
            assert_eq!(perimeter_point(&rect, 0.125), Vec2::new(10.0, 0.0));
            assert_eq!(perimeter_point(&rect, 0.5), Vec2::new(10.0, 30.0));
        }

        #[test]
        fn test_ease_in_out_bounds() {
            assert_eq!(ease_in_out(-1.0), 0.0);
            assert_eq!(ease_in_out(0.5), 0.5);
            assert_eq!(ease_in_out(2.0), 1.0);
        }

        #[test]
        fn test_asteroid_shapes_are_deterministic() {
            let a = asteroid_shape(&mut Pcg32::seed_from_u64(7), true);
            let b = asteroid_shape(&mut Pcg32::seed_from_u64(7), true);
            assert_eq!(a, b);
            assert!(a.radius() >= BIG_SIZE.0 - 3.0);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use arcade_core::engine::{GameEvent, GameManager, GameManagerParams, Viewer};
    use arcade_core::{Rect, Settings};
    use glam::Vec2;

    /// Simulated seconds before the demo gives up on the turret dying
    const MAX_GAME_TIME: f32 = 120.0;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut settings = Settings::default();
    let mut seed = 123u64;
    let mut realtime = false;
    for arg in std::env::args().skip(1) {
        if arg == "--realtime" {
            realtime = true;
        } else if let Ok(value) = arg.parse() {
            seed = value;
        } else {
            settings = match Settings::load(&arg) {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("Failed to load {arg}: {e}");
                    std::process::exit(1);
                }
            };
        }
    }
    log::info!("Arcade Core asteroid demo, seed {seed}, {settings:?}");

    let destroyed = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&destroyed);
    let screen = Rect::new(Vec2::ZERO, Vec2::new(1280.0, 720.0));
    let mut manager = GameManager::from_settings(
        &settings,
        GameManagerParams {
            on_game_event: Some(Box::new(move |event: &GameEvent| {
                if let GameEvent::ObjectDestroyed(_) = event {
                    counter.set(counter.get() + 1);
                }
            })),
            viewer: Some(Viewer::new(screen)),
            ..Default::default()
        },
    );

    manager.add_object(asteroids::Turret::spawn(screen.center(), 5.0));
    manager.add_object(asteroids::Spawner::spawn(seed, 0.3, 1.5));
    manager.start();

    let max_ticks = (MAX_GAME_TIME / manager.game_dt()) as u64;
    let report_every = (10.0 / manager.game_dt()).max(1.0) as u64;
    let mut last = Instant::now();
    while manager.is_running() {
        let elapsed = if realtime {
            std::thread::sleep(Duration::from_secs_f32(manager.real_dt()));
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f32();
            last = now;
            elapsed
        } else {
            manager.real_dt()
        };

        let before = manager.tick_count();
        manager.advance(elapsed);
        if manager.tick_count() / report_every != before / report_every {
            log::info!(
                "tick {}: {} objects, {} asteroids destroyed",
                manager.tick_count(),
                manager.len(),
                destroyed.get()
            );
        }
        if manager.tick_count() >= max_ticks {
            log::info!("Time is up");
            manager.stop();
        }
    }

    let survived = !manager.instances_of::<asteroids::Turret>().is_empty();
    log::info!(
        "Finished after {} ticks: {} asteroids destroyed, turret {}",
        manager.tick_count(),
        destroyed.get(),
        if survived { "survived" } else { "destroyed" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven from JavaScript on the web
}
