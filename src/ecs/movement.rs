//! Attachment bookkeeping and the move/collision pipeline.
//!
//! An entity is part of the simulation while the tile under its position lists
//! it. Every relocation is detach, reposition, attach. Contacts on the landing
//! tile are dispatched pairwise, and anything that would edit an occupant list
//! mid-dispatch is deferred through [`PostMove`].

use smallvec::SmallVec;
use specs::{Entity, WorldExt};
use tracing::{trace, warn};

use super::{
    World,
    components::{Kind, Position, Signals},
    signal::{Contact, Deferred, MoveEvent, PostMove},
};
use crate::{error::WorldError, map::Tile};

/// Local nudges tried around each random sample before resampling.
const PLACEMENT_NUDGES: usize = 20;

impl World {
    /// Lists the entity on the tile under it. No-op off the grid or when
    /// already listed.
    pub fn attach(&mut self, entity: Entity) {
        let Some(pos) = self.position(entity) else {
            return;
        };
        if let Some(tile) = self.map.tile_mut(pos.x, pos.y) {
            tile.add(entity);
        }
    }

    pub fn detach(&mut self, entity: Entity) {
        let Some(pos) = self.position(entity) else {
            return;
        };
        if let Some(tile) = self.map.tile_mut(pos.x, pos.y) {
            tile.remove(entity);
        }
    }

    pub fn attached(&self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.position(entity)
            .and_then(|pos| self.map.tile(pos.x, pos.y))
            .is_some_and(|tile| tile.contains(entity))
    }

    pub fn can_pass(&self, entity: Entity, tile: &Tile) -> bool {
        match self.kind(entity) {
            Some(Kind::Monster) => !tile.solid && !tile.conceal,
            _ => !tile.solid,
        }
    }

    fn relocate(&mut self, entity: Entity, to: Position) {
        self.detach(entity);
        self.set_position(entity, to);
        self.attach(entity);
    }

    /// Gated single move. Subscribers hear about every attempt; contacts are
    /// resolved only when the mover actually lands.
    pub fn try_move(&mut self, entity: Entity, dx: i32, dy: i32) -> bool {
        debug_assert!(self.attached(entity), "try_move on a detached entity");
        let Some(origin) = self.position(entity).filter(|_| self.attached(entity)) else {
            return false;
        };
        let dest = Position::new(origin.x + dx as f32, origin.y + dy as f32);
        let moved = self
            .map
            .tile(dest.x, dest.y)
            .is_some_and(|tile| self.can_pass(entity, tile));
        if moved {
            self.relocate(entity, dest);
        }

        let mut post = PostMove::default();
        let event = MoveEvent { dx, dy, moved };
        self.emit_moved(entity, &event, &mut post);
        if moved {
            self.resolve_contacts(entity, &mut post);
        }
        post.apply(self);
        moved
    }

    /// Ungated relative move.
    pub fn move_by(&mut self, entity: Entity, dx: f32, dy: f32) {
        debug_assert!(self.attached(entity), "move_by on a detached entity");
        let Some(origin) = self.position(entity) else {
            return;
        };
        self.relocate(entity, Position::new(origin.x + dx, origin.y + dy));

        let mut post = PostMove::default();
        self.resolve_contacts(entity, &mut post);
        post.apply(self);
    }

    /// Ballistic step: a projectile is spent once it lands inside something solid.
    pub(crate) fn fly(&mut self, entity: Entity, dx: f32, dy: f32) {
        self.move_by(entity, dx, dy);
        let Some(pos) = self.position(entity) else {
            return;
        };
        if self.map.tile(pos.x, pos.y).is_some_and(|tile| tile.solid) {
            trace!(?entity, "projectile spent");
            self.detach(entity);
        }
    }

    pub fn teleport(&mut self, entity: Entity, x: f32, y: f32) {
        self.relocate(entity, Position::new(x, y));
    }

    /// Hill-climbing search for a passable, vacant tile. Gives up after
    /// `rules.placement_rounds` outer samples when a cap is configured.
    pub fn random_teleport(&mut self, entity: Entity) -> Result<(i32, i32), WorldError> {
        let cap = self.rules.placement_rounds;
        let mut rounds = 0usize;
        loop {
            if cap.is_some_and(|cap| rounds >= cap) {
                let name = self.name_of(entity).unwrap_or_default();
                warn!(%name, rounds, "placement search exhausted");
                return Err(WorldError::NoOpenTile { name, rounds });
            }
            rounds += 1;

            let mut x = self.roll(0, self.map.width);
            let mut y = self.roll(0, self.map.height);
            for _ in 0..PLACEMENT_NUDGES {
                let open = self
                    .map
                    .tile(x, y)
                    .is_some_and(|tile| tile.is_vacant() && self.can_pass(entity, tile));
                if open {
                    self.teleport(entity, x as f32, y as f32);
                    return Ok((x, y));
                }
                let nudged_x = x + self.roll(-1, 2);
                let nudged_y = y + self.roll(-1, 2);
                (x, y) = self.map.snap(nudged_x, nudged_y);
            }
        }
    }

    fn emit_moved(&mut self, entity: Entity, event: &MoveEvent, post: &mut PostMove) {
        let signal = self
            .specs_world
            .read_component::<Signals>()
            .get(entity)
            .map(|signals| signals.moved.clone());
        if let Some(signal) = signal {
            signal.emit(self, entity, event, post);
        }
    }

    fn emit_contact(&mut self, entity: Entity, other: Entity, post: &mut PostMove) {
        let signal = self
            .specs_world
            .read_component::<Signals>()
            .get(entity)
            .map(|signals| signals.collided.clone());
        if let Some(signal) = signal {
            signal.emit(self, entity, &Contact { other }, post);
        }
    }

    /// Every unordered pair on the mover's tile touches, in both directions.
    fn resolve_contacts(&mut self, mover: Entity, post: &mut PostMove) {
        let Some(pos) = self.position(mover) else {
            return;
        };
        let occupants: SmallVec<[Entity; 4]> = match self.map.tile(pos.x, pos.y) {
            Some(tile) if tile.occupants().len() > 1 => tile.occupants().iter().copied().collect(),
            _ => return,
        };
        for (i, &a) in occupants.iter().enumerate() {
            for &b in &occupants[i + 1..] {
                self.emit_contact(a, b, post);
                self.emit_contact(b, a, post);
            }
        }
    }
}

/// Contact handler for projectiles: a monster hit removes both.
pub fn bullet_contact(world: &mut World, bullet: Entity, contact: &Contact, post: &mut PostMove) {
    if world.kind(contact.other) == Some(Kind::Monster) {
        trace!(?bullet, monster = ?contact.other, "monster shot");
        post.defer(Deferred::Detach(contact.other));
        post.defer(Deferred::Detach(bullet));
    }
}
