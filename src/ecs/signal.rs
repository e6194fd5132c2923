//! Synchronous event dispatch between entities.
//!
//! A [`Signal`] is an ordered list of plain function handlers. Handlers run on
//! the calling thread, in connection order, before `emit` returns. Anything a
//! handler wants to do to the occupant lists it is currently being called
//! over goes into the [`PostMove`] queue instead, which the world applies once
//! every handler of the movement has run.

use specs::Entity;

use crate::ecs::World;

pub type Handler<E> = fn(&mut World, Entity, &E, &mut PostMove);

/// A movement attempt as seen by the mover's subscribers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveEvent {
    pub dx: i32,
    pub dy: i32,
    pub moved: bool,
}

/// The mover shares a tile with `other`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub other: Entity,
}

pub struct Signal<E> {
    handlers: Vec<Handler<E>>,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<E> Signal<E> {
    pub fn connect(&mut self, handler: Handler<E>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn emit(&self, world: &mut World, entity: Entity, event: &E, post: &mut PostMove) {
        for handler in &self.handlers {
            handler(world, entity, event, post);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deferred {
    Detach(Entity),
}

/// Side effects collected while collisions are being resolved.
#[derive(Debug, Default)]
pub struct PostMove {
    deferred: Vec<Deferred>,
}

impl PostMove {
    pub fn defer(&mut self, action: Deferred) {
        if !self.deferred.contains(&action) {
            self.deferred.push(action);
        }
    }

    pub fn pending(&self) -> &[Deferred] {
        &self.deferred
    }

    pub fn apply(self, world: &mut World) {
        for action in self.deferred {
            match action {
                Deferred::Detach(entity) => world.detach(entity),
            }
        }
    }
}
