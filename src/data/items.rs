use bracket_terminal::prelude::RGB;
use specs::prelude::{Builder, Entity, WorldExt};

use crate::{
    ecs::{
        SpawnParams, World,
        components::{Kind, Loot, Name, Position, Renderable, Signals, Velocity},
        movement::bullet_contact,
    },
    map::Glyph,
};

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub obvious: bool,
}

impl ItemTemplate {
    pub fn gold_coin() -> Self {
        Self::new("gold coin", '$', RGB::from_u8(255, 215, 0))
    }

    pub fn health_kit() -> Self {
        Self::new("health kit", '+', RGB::from_u8(255, 80, 200))
    }

    pub fn bullet() -> Self {
        Self {
            obvious: true,
            ..Self::new("bullet", '\u{2022}', RGB::from_u8(255, 255, 255))
        }
    }

    pub fn glyph(&self) -> Glyph {
        let glyph = Glyph::new(self.glyph, self.color);
        if self.obvious { glyph.obvious() } else { glyph }
    }

    const fn new(name: &'static str, glyph: char, color: RGB) -> Self {
        Self {
            name,
            glyph,
            color,
            obvious: false,
        }
    }
}

fn item(world: &mut World, template: ItemTemplate, loot: Loot, params: &SpawnParams) -> Entity {
    let entity = world
        .ecs_mut()
        .create_entity()
        .with(Name(template.name.to_string()))
        .with(Position::new(params.x, params.y))
        .with(Renderable {
            glyph: template.glyph(),
        })
        .with(Kind::Item(loot))
        .build();
    world.attach(entity);
    entity
}

pub fn gold_coin(world: &mut World, params: &SpawnParams) -> Entity {
    let value = world.rules.gold_value;
    item(world, ItemTemplate::gold_coin(), Loot::Gold(value), params)
}

pub fn health_kit(world: &mut World, params: &SpawnParams) -> Entity {
    item(world, ItemTemplate::health_kit(), Loot::Restore, params)
}

/// Flies along `params` velocity every tick until it leaves the grid, hits
/// something solid or strikes a monster.
pub fn bullet(world: &mut World, params: &SpawnParams) -> Entity {
    let template = ItemTemplate::bullet();
    let mut signals = Signals::default();
    signals.collided.connect(bullet_contact);
    let entity = world
        .ecs_mut()
        .create_entity()
        .with(Name(template.name.to_string()))
        .with(Position::new(params.x, params.y))
        .with(Renderable {
            glyph: template.glyph(),
        })
        .with(Kind::Bullet)
        .with(Velocity {
            dx: params.dx,
            dy: params.dy,
        })
        .with(signals)
        .build();
    world.attach(entity);
    entity
}
