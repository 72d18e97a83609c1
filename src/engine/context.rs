//! What a hook may touch while a tick is running
//!
//! Hooks never see the live list mutably. Additions, removals and stop requests go into
//! the [`ObjectQueue`] and are applied by the manager between phases.

use std::collections::VecDeque;
use std::fmt;

use super::manager::GameEvent;
use super::object::{Entity, ObjectId};
use super::physics::PhysicWorld;
use super::renderer::Viewer;
use crate::error::QueueError;

/// Receiver of the manager's event stream
pub type EventCallback = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub(crate) struct EventSink {
    callback: Option<EventCallback>,
}

impl EventSink {
    pub fn new(callback: Option<EventCallback>) -> Self {
        Self { callback }
    }

    pub fn set(&mut self, callback: Option<EventCallback>) {
        self.callback = callback;
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("Game event {event:?}");
        if let Some(callback) = self.callback.as_mut() {
            callback(&event);
        }
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Structural changes requested since the last time the manager drained them
#[derive(Debug)]
pub(crate) struct ObjectQueue {
    pub to_add: Vec<Entity>,
    pub to_remove: VecDeque<ObjectId>,
    next_id: u32,
    pub clear_requested: bool,
    pub stop_requested: bool,
}

impl ObjectQueue {
    pub fn new() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: VecDeque::new(),
            next_id: 1,
            clear_requested: false,
            stop_requested: false,
        }
    }

    /// Assign a fresh id and queue the entity
    pub fn add(&mut self, mut entity: Entity) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        entity.object.assign_id(id);
        self.to_add.push(entity);
        id
    }

    /// Returns false if `id` was already pending
    pub fn enqueue_removal(&mut self, id: ObjectId) -> bool {
        if self.to_remove.contains(&id) {
            return false;
        }
        self.to_remove.push_back(id);
        true
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<(), QueueError> {
        if self.enqueue_removal(id) {
            Ok(())
        } else {
            log::warn!("Object {id} is already queued for removal");
            Err(QueueError::AlreadyQueued(id))
        }
    }

    pub fn kill(&mut self, id: ObjectId) {
        if !self.enqueue_removal(id) {
            log::debug!("Object {id} killed twice in one tick");
        }
    }

    /// Drop pending additions and remove everything live at the end of the tick
    pub fn clear(&mut self) {
        self.to_add.clear();
        self.clear_requested = true;
    }

    pub fn pending_additions(&self) -> usize {
        self.to_add.len()
    }

    pub fn pending_removals(&self) -> Vec<ObjectId> {
        self.to_remove.iter().copied().collect()
    }
}

/// Read-only view of the live objects other than the one running a hook
#[derive(Debug, Clone, Copy, Default)]
pub struct Others<'a> {
    before: &'a [Entity],
    after: &'a [Entity],
}

impl<'a> Others<'a> {
    pub(crate) fn new(before: &'a [Entity], after: &'a [Entity]) -> Self {
        Self { before, after }
    }

    /// Live-list order, skipping the caller
    pub fn iter(self) -> impl Iterator<Item = &'a Entity> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn get(self, id: ObjectId) -> Option<&'a Entity> {
        self.iter().find(|entity| entity.id() == id)
    }

    pub fn len(self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Handle passed to every behaviour hook
pub struct GameContext<'a> {
    queue: &'a mut ObjectQueue,
    events: &'a mut EventSink,
    physic_world: Option<&'a PhysicWorld>,
    viewer: Option<&'a Viewer>,
    game_dt: f32,
    others: Others<'a>,
}

impl<'a> GameContext<'a> {
    pub(crate) fn new(
        queue: &'a mut ObjectQueue,
        events: &'a mut EventSink,
        physic_world: Option<&'a PhysicWorld>,
        viewer: Option<&'a Viewer>,
        game_dt: f32,
    ) -> Self {
        Self {
            queue,
            events,
            physic_world,
            viewer,
            game_dt,
            others: Others::default(),
        }
    }

    pub(crate) fn with_others(mut self, others: Others<'a>) -> Self {
        self.others = others;
        self
    }

    /// Simulated seconds per tick
    pub fn game_dt(&self) -> f32 {
        self.game_dt
    }

    pub fn physic_world(&self) -> Option<&'a PhysicWorld> {
        self.physic_world
    }

    pub fn viewer(&self) -> Option<&'a Viewer> {
        self.viewer
    }

    /// Empty during collision hooks, where the bodies are already borrowed
    pub fn others(&self) -> Others<'a> {
        self.others
    }

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

    /// Queue a removal; the object's `on_death` runs at the end of the tick
    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), QueueError> {
        self.queue.remove(id)
    }

    /// Queue several removals, skipping ids that are already pending
    pub fn remove_objects(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        for id in ids {
            self.queue.kill(id);
        }
    }

    /// Like `remove_object`, but killing twice is not an error
    pub fn kill(&mut self, id: ObjectId) {
        self.queue.kill(id);
    }

    pub fn clear_objects(&mut self) {
        self.queue.clear();
    }

    pub fn fire_object_created(&mut self, id: ObjectId) {
        self.events.emit(GameEvent::ObjectCreated(id));
    }

    pub fn fire_object_destroyed(&mut self, id: ObjectId) {
        self.events.emit(GameEvent::ObjectDestroyed(id));
    }

    /// Stop the manager once the current tick completes
    pub fn stop(&mut self) {
        self.queue.stop_requested = true;
    }
}

impl fmt::Debug for GameContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("game_dt", &self.game_dt)
            .field("others", &self.others.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::object::GameObject;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_ids_are_sequential() {
        let mut queue = ObjectQueue::new();
        let a = queue.add(Entity::plain(GameObject::new()));
        let b = queue.add(Entity::plain(GameObject::new()));
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(queue.to_add[1].id(), b);
    }

    #[test]
    fn test_duplicate_removal_is_reported() {
        let mut queue = ObjectQueue::new();
        let mut events = EventSink::default();
        let mut ctx = GameContext::new(&mut queue, &mut events, None, None, 1.0);
        let id = ObjectId::new(3);

        assert_eq!(ctx.remove_object(id), Ok(()));
        assert_eq!(ctx.remove_object(id), Err(QueueError::AlreadyQueued(id)));
        ctx.kill(id);
        ctx.remove_objects([id, ObjectId::new(4)]);
        assert_eq!(queue.pending_removals(), vec![id, ObjectId::new(4)]);
    }

    #[test]
    fn test_clear_drops_pending_additions() {
        let mut queue = ObjectQueue::new();
        let mut events = EventSink::default();
        let mut ctx = GameContext::new(&mut queue, &mut events, None, None, 1.0);
        ctx.add_objects([Entity::plain(GameObject::new()), Entity::plain(GameObject::new())]);
        ctx.clear_objects();
        assert_eq!(queue.pending_additions(), 0);
        assert!(queue.clear_requested);
    }

    #[test]
    fn test_manual_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut queue = ObjectQueue::new();
        let mut events = EventSink::new(Some(Box::new(move |event: &GameEvent| {
            sink_seen.borrow_mut().push(*event);
        })));
        let mut ctx = GameContext::new(&mut queue, &mut events, None, None, 1.0);
        ctx.fire_object_created(ObjectId::new(1));
        ctx.fire_object_destroyed(ObjectId::new(1));
        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::ObjectCreated(ObjectId::new(1)),
                GameEvent::ObjectDestroyed(ObjectId::new(1)),
            ]
        );
    }

    #[test]
    fn test_others_skips_nothing_but_the_caller() {
        let entities: Vec<Entity> = (0..3)
            .map(|_| Entity::plain(GameObject::new()))
            .collect();
        let others = Others::new(&entities[..1], &entities[2..]);
        assert_eq!(others.len(), 2);
        assert!(!others.is_empty());
        assert!(Others::default().is_empty());
    }
}
