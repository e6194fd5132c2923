pub mod items;
pub mod monsters;

use bracket_terminal::prelude::RGB;
use specs::prelude::{Builder, Entity, WorldExt};
use tracing::info;

use crate::{
    config::GameConfig,
    ecs::{
        Scatter, World,
        components::{Kind, Name, PlayerState, Position, Renderable, Signals},
        player,
    },
    error::WorldError,
    map::{Glyph, Map, Tile},
};

use self::{items::ItemTemplate, monsters::MonsterTemplate};

pub const THEME: &str = "forest";

pub fn builtin_glyphs() -> Vec<(&'static str, Glyph)> {
    vec![
        ("grass", Glyph::new('.', RGB::from_u8(60, 180, 75)).obvious()),
        ("rock", Glyph::new('o', RGB::from_u8(230, 230, 230))),
        ("shrub", Glyph::new('*', RGB::from_u8(60, 180, 75))),
        ("tree", Glyph::new('T', RGB::from_u8(34, 139, 34))),
        ("tall grass", Glyph::new('"', RGB::from_u8(120, 200, 80)).plural()),
        ("player", Glyph::new('v', RGB::from_u8(255, 255, 255))),
        ("void", Glyph::new('X', RGB::from_u8(200, 30, 30))),
        ("monster", MonsterTemplate::forest().glyph()),
        ("gold coin", ItemTemplate::gold_coin().glyph()),
        ("health kit", ItemTemplate::health_kit().glyph()),
        ("bullet", ItemTemplate::bullet().glyph()),
    ]
}

pub fn register_builtins(world: &mut World) {
    for (name, glyph) in builtin_glyphs() {
        world.register_glyph(name, glyph);
    }
    world.register_factory("monster", monsters::monster);
    world.register_factory("gold coin", items::gold_coin);
    world.register_factory("health kit", items::health_kit);
    world.register_factory("bullet", items::bullet);
}

fn glyph(name: &str) -> Glyph {
    builtin_glyphs()
        .into_iter()
        .find(|(key, _)| *key == name)
        .map(|(_, glyph)| glyph)
        .unwrap_or_else(|| Glyph::new('?', RGB::from_u8(255, 0, 255)))
}

fn empty_world(
    name: &str,
    width: i32,
    height: i32,
    config: &GameConfig,
    seed: u64,
) -> Result<World, WorldError> {
    let fill = Tile::new(glyph("grass"), "grass").with_theme(THEME);
    let map = Map::new(width, height, fill)?;
    let mut world = World::new(name, map, config.rules.clone(), seed, glyph("void"));
    register_builtins(&mut world);
    Ok(world)
}

/// Player at the origin, attached; callers place it.
pub fn spawn_player(world: &mut World) -> Entity {
    let mut signals = Signals::default();
    signals.moved.connect(player::orient);
    signals.collided.connect(player::contact);
    let max_hp = world.rules.max_hp;
    let entity = world
        .ecs_mut()
        .create_entity()
        .with(Name("you".to_string()))
        .with(Position::new(0.0, 0.0))
        .with(Renderable {
            glyph: glyph("player"),
        })
        .with(Kind::Player)
        .with(PlayerState::new(max_hp))
        .with(signals)
        .build();
    world.attach(entity);
    entity
}

/// Terrain first, then the player, then everything that wanders or waits.
pub fn build_world(config: &GameConfig, seed: u64) -> Result<(World, Entity), WorldError> {
    let mut world = empty_world(&config.world_name, config.width, config.height, config, seed)?;
    for layer in &config.terrain {
        world.sprinkle(
            Scatter::Terrain {
                glyph: &layer.glyph,
                patch: &layer.patch,
            },
            layer.frequency,
        )?;
    }

    let player = spawn_player(&mut world);
    world.random_teleport(player)?;

    for population in &config.populations {
        world.sprinkle(
            Scatter::Entities {
                factory: &population.factory,
            },
            population.frequency,
        )?;
    }
    info!(
        world = %world.name,
        seed,
        entities = world.roster().len(),
        "world built"
    );
    Ok((world, player))
}

#[cfg(test)]
pub(crate) fn sandbox_seeded(width: i32, height: i32, seed: u64) -> World {
    empty_world("sandbox", width, height, &GameConfig::default(), seed).expect("small sandbox")
}

#[cfg(test)]
pub(crate) fn sandbox(width: i32, height: i32) -> World {
    sandbox_seeded(width, height, 0x5eed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Population;

    #[test]
    fn builtin_factories_are_registered() {
        let mut world = sandbox(4, 4);
        for name in ["bullet", "monster", "gold coin", "health kit"] {
            let spawned = world.spawn(name, &crate::ecs::SpawnParams::at(1.0, 1.0));
            assert!(spawned.is_ok(), "{name} should be registered");
        }
    }

    #[test]
    fn built_world_places_everything() {
        let config = GameConfig::default().with_size(40, 30);
        let (world, player) = build_world(&config, 42).expect("room to spare");
        assert!(world.attached(player));
        let pos = world.position(player).expect("placed");
        assert!(world.map.tile(pos.x, pos.y).is_some_and(|t| !t.solid));

        let monsters = world
            .roster()
            .into_iter()
            .filter(|e| world.kind(*e) == Some(Kind::Monster))
            .count();
        assert_eq!(monsters, 2);
        // player + 2 monsters + 25 coins + 4 kits
        assert_eq!(world.roster().len(), 32);
        assert!(world.roster().into_iter().all(|e| world.attached(e)));
    }

    #[test]
    fn same_seed_same_world() {
        let config = GameConfig::default().with_size(30, 30);
        let (a, pa) = build_world(&config, 9).expect("room");
        let (b, pb) = build_world(&config, 9).expect("room");
        assert_eq!(a.position(pa), b.position(pb));
        let names = |w: &World| w.map.tiles().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn oversized_configs_fail_the_build() {
        let config = GameConfig::default().with_size(50_000, 50_000);
        let err = build_world(&config, 1).map(|_| ()).unwrap_err();
        assert!(matches!(err, WorldError::MapTooLarge { .. }));
    }

    #[test]
    fn unknown_population_fails_the_build() {
        let config = GameConfig::default()
            .with_size(10, 10)
            .with_populations(vec![Population::new("wyvern", 1.0)]);
        let err = build_world(&config, 1).map(|_| ()).unwrap_err();
        assert!(matches!(err, WorldError::UnknownFactory(_)));
    }
}
