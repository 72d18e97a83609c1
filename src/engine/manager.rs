//! Fixed-step scheduler owning the live object list
//!
//! One tick runs these phases in order:
//! 1. Pending additions go live
//! 2. `FrameBegin` is emitted
//! 3. `on_frame` for every living object
//! 4. Collision detection, then `end_collision` for every body
//! 5. Pending removals leave the list and get `on_death`
//!
//! Hooks only ever queue structural changes, so the list they observe is stable for the
//! whole tick.

use serde::{Deserialize, Serialize};

use super::context::{EventCallback, EventSink, GameContext, ObjectQueue, Others};
use super::object::{Behavior, Entity, ObjectId};
use super::physics::PhysicWorld;
use super::renderer::Viewer;
use crate::consts::*;
use crate::error::QueueError;
use crate::settings::{Settings, is_valid_dt};

/// Notifications sent to the manager's event callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tick is starting; `dt` is the simulated step
    FrameBegin { dt: f32 },
    Start,
    Stop,
    /// Only ever fired by game code
    ObjectCreated(ObjectId),
    /// Only ever fired by game code
    ObjectDestroyed(ObjectId),
}

/// Construction options; every field falls back to a default
#[derive(Default)]
pub struct GameManagerParams {
    pub on_game_event: Option<EventCallback>,
    pub viewer: Option<Viewer>,
    pub game_dt: Option<f32>,
    pub real_dt: Option<f32>,
    pub physic_world: Option<PhysicWorld>,
}

/// Owns the live objects and drives the tick loop
#[derive(Debug)]
pub struct GameManager {
    objects: Vec<Entity>,
    queue: ObjectQueue,
    events: EventSink,
    game_dt: f32,
    real_dt: f32,
    max_substeps: u32,
    viewer: Option<Viewer>,
    physic_world: Option<PhysicWorld>,
    running: bool,
    /// Wall time not yet consumed by ticks
    accumulator: f32,
    tick_count: u64,
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(GameManagerParams::default())
    }
}

fn dt_or_default(dt: Option<f32>, default: f32, name: &str) -> f32 {
    match dt {
        Some(dt) if is_valid_dt(dt) => dt,
        Some(dt) => {
            log::warn!("Ignoring invalid {name} {dt}, using {default}");
            default
        }
        None => default,
    }
}

impl GameManager {
    pub fn new(params: GameManagerParams) -> Self {
        Self {
            objects: Vec::new(),
            queue: ObjectQueue::new(),
            events: EventSink::new(params.on_game_event),
            game_dt: dt_or_default(params.game_dt, DEFAULT_GAME_DT, "game_dt"),
            real_dt: dt_or_default(params.real_dt, DEFAULT_REAL_DT, "real_dt"),
            max_substeps: MAX_SUBSTEPS,
            viewer: params.viewer,
            physic_world: params.physic_world,
            running: false,
            accumulator: 0.0,
            tick_count: 0,
        }
    }

    /// Timing from `settings` fills in whatever `params` leaves unset
    pub fn from_settings(settings: &Settings, mut params: GameManagerParams) -> Self {
        params.game_dt = params.game_dt.or(Some(settings.game_dt));
        params.real_dt = params.real_dt.or(Some(settings.real_dt));
        let mut manager = Self::new(params);
        manager.set_max_substeps(settings.max_substeps);
        manager
    }

    // --- Timing ---

    pub fn game_dt(&self) -> f32 {
        self.game_dt
    }

    /// Takes effect from the next tick
    pub fn set_game_dt(&mut self, game_dt: f32) {
        self.game_dt = dt_or_default(Some(game_dt), self.game_dt, "game_dt");
    }

    pub fn real_dt(&self) -> f32 {
        self.real_dt
    }

    pub fn set_real_dt(&mut self, real_dt: f32) {
        self.real_dt = dt_or_default(Some(real_dt), self.real_dt, "real_dt");
    }

    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    pub fn set_max_substeps(&mut self, max_substeps: u32) {
        self.max_substeps = max_substeps.max(1);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- Run state ---

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.accumulator = 0.0;
        self.events.emit(GameEvent::Start);
        self.running = true;
        log::info!("Game started, {} objects live", self.objects.len());
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.events.emit(GameEvent::Stop);
        log::info!("Game stopped after {} ticks", self.tick_count);
    }

    /// Feed elapsed wall time; runs one tick per `real_dt` while running.
    ///
    /// At most `max_substeps` ticks run per call. Any backlog beyond that is dropped.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !self.running {
            return 0;
        }
        if !(elapsed.is_finite() && elapsed >= 0.0) {
            log::warn!("Ignoring invalid elapsed time {elapsed}");
            return 0;
        }
        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.running && self.accumulator >= self.real_dt {
            if ticks >= self.max_substeps {
                let dropped = (self.accumulator / self.real_dt) as u32;
                log::warn!("Falling behind, dropping {dropped} ticks");
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= self.real_dt;
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Run one full tick regardless of the run state
    pub fn tick(&mut self) {
        self.apply_additions();
        self.events.emit(GameEvent::FrameBegin { dt: self.game_dt });
        self.update_objects();
        self.detect_collisions();
        self.remove_dead_objects();
        self.tick_count += 1;

        if std::mem::take(&mut self.queue.stop_requested) {
            self.stop();
        }
    }

    fn apply_additions(&mut self) {
        let added = std::mem::take(&mut self.queue.to_add);
        if !added.is_empty() {
            log::debug!("Adding {} objects", added.len());
            self.objects.extend(added);
        }
    }

    fn update_objects(&mut self) {
        for index in 0..self.objects.len() {
            let (before, rest) = self.objects.split_at_mut(index);
            let Some((entity, after)) = rest.split_first_mut() else {
                break;
            };
            if !entity.object.living {
                continue;
            }
            let mut ctx = GameContext::new(
                &mut self.queue,
                &mut self.events,
                self.physic_world.as_ref(),
                self.viewer.as_ref(),
                self.game_dt,
            )
            .with_others(Others::new(before, after));
            let Entity { object, behavior } = entity;
            behavior.on_frame(object, &mut ctx, self.game_dt);
        }
    }

    /// Both sides must agree to collide, and either side's layers may accept the other
    fn should_collide(handler: &Entity, other: &Entity) -> bool {
        handler.object.layers_match(&other.object)
            && handler.behavior.can_collide_with(&handler.object, &other.object)
            && other.behavior.can_collide_with(&other.object, &handler.object)
            && handler.object.collides(&other.object)
    }

    /// Bodies are popped from the highest priority down. Each popped body handles its hits
    /// among the bodies still in the pool, so a pair is handled by its higher-priority
    /// member. The pass stops at the first negative priority.
    fn detect_collisions(&mut self) {
        let mut bodies: Vec<&mut Entity> = self
            .objects
            .iter_mut()
            .filter(|entity| entity.object.can_collide())
            .collect();
        if bodies.is_empty() {
            return;
        }
        // Stable: among equal priorities the later-added body pops first
        bodies.sort_by_key(|entity| entity.object.collision_priority);
        for body in bodies.iter_mut() {
            body.object.prepare_collision();
        }

        let mut ctx = GameContext::new(
            &mut self.queue,
            &mut self.events,
            self.physic_world.as_ref(),
            self.viewer.as_ref(),
            self.game_dt,
        );

        // Popped bodies are put back so `end_collision` reaches every one of them
        let mut slots: Vec<Option<&mut Entity>> = bodies.into_iter().map(Some).collect();
        for current in (0..slots.len()).rev() {
            let Some(handler) = slots[current].take() else {
                continue;
            };
            if handler.object.collision_priority < 0 {
                slots[current] = Some(handler);
                break;
            }

            let hits: Vec<usize> = (0..current)
                .filter(|&i| {
                    slots[i]
                        .as_deref()
                        .is_some_and(|other| Self::should_collide(handler, other))
                })
                .collect();
            if !hits.is_empty() {
                log::trace!("{} hit {} bodies", handler.id(), hits.len());
                let mut others: Vec<&mut Entity> =
                    hits.iter().filter_map(|&i| slots[i].take()).collect();
                let Entity { object, behavior } = &mut *handler;
                behavior.handle_collision(object, &mut others, &mut ctx);
                for (&i, other) in hits.iter().zip(others) {
                    slots[i] = Some(other);
                }
            }
            slots[current] = Some(handler);
        }

        for entity in slots.into_iter().rev().flatten() {
            let Entity { object, behavior } = entity;
            behavior.end_collision(object, &mut ctx);
        }
    }

    /// FIFO; removals queued by death hooks are drained in the same pass
    fn remove_dead_objects(&mut self) {
        loop {
            if std::mem::take(&mut self.queue.clear_requested) {
                for entity in &self.objects {
                    self.queue.enqueue_removal(entity.id());
                }
            }
            let Some(id) = self.queue.to_remove.pop_front() else {
                break;
            };
            let Some(index) = self.object_index(id) else {
                log::debug!("Object {id} is not live, ignoring removal");
                continue;
            };

            let mut entity = self.objects.remove(index);
            let mut ctx = GameContext::new(
                &mut self.queue,
                &mut self.events,
                self.physic_world.as_ref(),
                self.viewer.as_ref(),
                self.game_dt,
            )
            .with_others(Others::new(&self.objects, &[]));
            let Entity { object, behavior } = &mut entity;
            behavior.on_death(object, &mut ctx);
        }
    }

    // --- Structural changes ---

    /// Queue an entity; it goes live at the start of the next tick
    pub fn add_object(&mut self, entity: Entity) -> ObjectId {
        self.queue.add(entity)
    }

    pub fn add_objects(&mut self, entities: impl IntoIterator<Item = Entity>) -> Vec<ObjectId> {
        entities
            .into_iter()
            .map(|entity| self.queue.add(entity))
            .collect()
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), QueueError> {
        self.queue.remove(id)
    }

    /// Queue several removals, skipping ids that are already pending
    pub fn remove_objects(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        for id in ids {
            self.queue.kill(id);
        }
    }

    /// Drop pending additions and queue every live object for removal
    pub fn clear_objects(&mut self) {
        self.queue.to_add.clear();
        for entity in &self.objects {
            self.queue.enqueue_removal(entity.id());
        }
    }

    pub fn pending_additions(&self) -> usize {
        self.queue.pending_additions()
    }

    pub fn pending_removals(&self) -> Vec<ObjectId> {
        self.queue.pending_removals()
    }

    // --- Queries ---

    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    pub fn objects_where(&self, filter: impl Fn(&Entity) -> bool) -> Vec<&Entity> {
        self.objects.iter().filter(|entity| filter(entity)).collect()
    }

    pub fn object_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|entity| entity.id() == id)
    }

    pub fn object_at(&self, index: usize) -> Option<&Entity> {
        self.objects.get(index)
    }

    pub fn object(&self, id: ObjectId) -> Option<&Entity> {
        self.objects.iter().find(|entity| entity.id() == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Entity> {
        self.objects.iter_mut().find(|entity| entity.id() == id)
    }

    pub fn instances_of<T: Behavior>(&self) -> Vec<&Entity> {
        self.objects_where(Entity::is::<T>)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // --- Collaborators ---

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    pub fn set_viewer(&mut self, viewer: Option<Viewer>) {
        self.viewer = viewer;
    }

    pub fn physic_world(&self) -> Option<&PhysicWorld> {
        self.physic_world.as_ref()
    }

    pub fn physic_world_mut(&mut self) -> Option<&mut PhysicWorld> {
        self.physic_world.as_mut()
    }

    pub fn set_physic_world(&mut self, physic_world: Option<PhysicWorld>) {
        self.physic_world = physic_world;
    }

    // --- Events ---

    pub fn set_event_callback(&mut self, callback: impl FnMut(&GameEvent) + 'static) {
        self.events.set(Some(Box::new(callback)));
    }

    pub fn clear_event_callback(&mut self) {
        self.events.set(None);
    }

    pub fn fire_object_created(&mut self, id: ObjectId) {
        self.events.emit(GameEvent::ObjectCreated(id));
    }

    pub fn fire_object_destroyed(&mut self, id: ObjectId) {
        self.events.emit(GameEvent::ObjectDestroyed(id));
    }
}
