use bracket_terminal::prelude::RGB;
use specs::prelude::{Builder, Entity, WorldExt};

use crate::{
    ecs::{
        SpawnParams, World,
        components::{Kind, Name, Position, Renderable, Walker},
    },
    map::Glyph,
};

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
}

impl MonsterTemplate {
    pub fn forest() -> Self {
        Self::new("monster", 'M', RGB::from_u8(220, 60, 60))
    }

    pub fn glyph(&self) -> Glyph {
        Glyph::new(self.glyph, self.color)
    }

    fn new(name: &'static str, glyph: char, color: RGB) -> Self {
        Self { name, glyph, color }
    }
}

/// Random walker at the world's configured pace.
pub fn monster(world: &mut World, params: &SpawnParams) -> Entity {
    let template = MonsterTemplate::forest();
    let speed = world.rules.monster_speed;
    let entity = world
        .ecs_mut()
        .create_entity()
        .with(Name(template.name.to_string()))
        .with(Position::new(params.x, params.y))
        .with(Renderable {
            glyph: template.glyph(),
        })
        .with(Kind::Monster)
        .with(Walker { speed })
        .build();
    world.attach(entity);
    entity
}
