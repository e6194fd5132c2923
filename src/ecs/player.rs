use specs::{Entity, WorldExt};
use tracing::{debug, info};

use super::{
    World,
    components::{Facing, Kind, Loot, PlayerState, Renderable},
    signal::{Contact, Deferred, MoveEvent, PostMove},
};

/// Faces the attempted direction, blocked or not.
pub fn orient(world: &mut World, player: Entity, event: &MoveEvent, _post: &mut PostMove) {
    let Some(facing) = Facing::from_step(event.dx, event.dy) else {
        return;
    };
    if let Some(state) = world.ecs().write_component::<PlayerState>().get_mut(player) {
        state.facing = facing;
    }
    if let Some(render) = world.ecs().write_component::<Renderable>().get_mut(player) {
        render.glyph.symbol = facing.arrow();
    }
}

pub fn contact(world: &mut World, player: Entity, contact: &Contact, post: &mut PostMove) {
    let Some(kind) = world.kind(contact.other) else {
        return;
    };
    let damage = world.rules.contact_damage;
    let name = world.name_of(contact.other).unwrap_or_default();
    let mut states = world.ecs().write_component::<PlayerState>();
    let Some(state) = states.get_mut(player) else {
        return;
    };
    match kind {
        Kind::Monster => {
            state.hp = (state.hp - damage).max(0);
            debug!(hp = state.hp, damage, "monster contact");
        }
        Kind::Item(loot) => {
            match loot {
                Loot::Gold(value) => state.gold += value,
                Loot::Restore => state.hp = state.max_hp,
            }
            info!(item = %name, gold = state.gold, hp = state.hp, "picked up");
            state.last_pickup = Some(name);
            post.defer(Deferred::Detach(contact.other));
        }
        Kind::Player | Kind::Bullet => {}
    }
}

fn describe(name: &str, plural: bool) -> String {
    if plural {
        format!("some {name}")
    } else if name.starts_with(['a', 'e', 'i', 'o', 'u']) {
        format!("an {name}")
    } else {
        format!("a {name}")
    }
}

impl World {
    pub fn player_state(&self, player: Entity) -> Option<PlayerState> {
        self.ecs().read_component::<PlayerState>().get(player).cloned()
    }

    /// Refreshes what the player is looking at: the first noteworthy occupant
    /// of the tile ahead, else the terrain unless it is unremarkable.
    pub fn update_targets(&mut self, player: Entity) {
        let target = self.target_ahead(player);
        if let Some(state) = self.ecs().write_component::<PlayerState>().get_mut(player) {
            state.last_target = target;
        }
    }

    fn target_ahead(&self, player: Entity) -> Option<String> {
        let pos = self.position(player)?;
        let facing = self.player_state(player)?.facing;
        let ahead = facing.delta();
        let tile = self.map.tile(pos.x + ahead.x as f32, pos.y + ahead.y as f32)?;

        if !tile.conceal {
            let renderables = self.ecs().read_component::<Renderable>();
            let noteworthy = tile.occupants().iter().copied().find(|entity| {
                *entity != player
                    && renderables
                        .get(*entity)
                        .is_some_and(|render| !render.glyph.obvious)
            });
            if let Some(entity) = noteworthy {
                let plural = renderables.get(entity).is_some_and(|r| r.glyph.plural);
                let name = self.name_of(entity)?;
                return Some(describe(&name, plural));
            }
        }

        if tile.obvious || tile.name.is_empty() {
            None
        } else {
            Some(describe(&tile.name, tile.plural))
        }
    }
}
