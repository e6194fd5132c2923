pub mod components;
pub mod movement;
pub mod player;
pub mod resources;
pub mod signal;
pub mod systems;

use std::collections::HashMap;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{
    Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};
use tracing::{debug, trace};

use crate::{
    config::Rules,
    error::WorldError,
    map::{Glyph, Map, TilePatch},
};

use self::{
    components::{
        Intent, Kind, Name, PlayerState, Position, Renderable, Signals, Velocity, Walker,
    },
    resources::TickDelta,
    systems::{FlightSystem, WanderSystem},
};

/// Builds one entity and attaches it. Registered by name for data-driven spawns.
pub type Factory = fn(&mut World, &SpawnParams) -> Entity;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SpawnParams {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

impl SpawnParams {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, dx: f32, dy: f32) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }
}

/// What `sprinkle` scatters over the grid.
#[derive(Clone, Debug)]
pub enum Scatter<'a> {
    Terrain { glyph: &'a str, patch: &'a TilePatch },
    Entities { factory: &'a str },
}

/// A cell of a rendered view, already in screen coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCell {
    pub screen: Point,
    pub glyph: Glyph,
}

pub struct World {
    pub name: String,
    pub map: Map,
    pub rules: Rules,
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    glyphs: HashMap<String, Glyph>,
    factories: HashMap<String, Factory>,
    void: Glyph,
}

impl World {
    pub fn new(name: &str, map: Map, rules: Rules, seed: u64, void: Glyph) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(RandomNumberGenerator::seeded(seed));
        specs_world.insert(TickDelta::default());
        let dispatcher = DispatcherBuilder::new()
            .with_thread_local(WanderSystem)
            .with_thread_local(FlightSystem)
            .build();

        Self {
            name: name.to_string(),
            map,
            rules,
            specs_world,
            dispatcher,
            glyphs: HashMap::new(),
            factories: HashMap::new(),
            void,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Name>();
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Kind>();
        world.register::<Velocity>();
        world.register::<Walker>();
        world.register::<Intent>();
        world.register::<PlayerState>();
        world.register::<Signals>();
    }

    pub fn ecs(&self) -> &SpecsWorld {
        &self.specs_world
    }

    pub fn ecs_mut(&mut self) -> &mut SpecsWorld {
        &mut self.specs_world
    }

    pub fn register_glyph(&mut self, name: &str, glyph: Glyph) {
        self.glyphs.insert(name.to_string(), glyph);
    }

    pub fn glyph(&self, name: &str) -> Result<Glyph, WorldError> {
        self.glyphs
            .get(name)
            .copied()
            .ok_or_else(|| WorldError::UnknownGlyph(name.to_string()))
    }

    pub fn register_factory(&mut self, name: &str, factory: Factory) {
        self.factories.insert(name.to_string(), factory);
    }

    fn factory(&self, name: &str) -> Result<Factory, WorldError> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| WorldError::UnknownFactory(name.to_string()))
    }

    /// Uniform integer in `[min, max)` from the world's generator.
    pub fn roll(&self, min: i32, max: i32) -> i32 {
        self.specs_world
            .write_resource::<RandomNumberGenerator>()
            .range(min, max)
    }

    pub fn spawn(&mut self, factory: &str, params: &SpawnParams) -> Result<Entity, WorldError> {
        let build = self.factory(factory)?;
        let entity = build(self, params);
        debug!(factory, x = params.x, y = params.y, "spawned");
        Ok(entity)
    }

    pub fn sprinkle(&mut self, what: Scatter<'_>, frequency: f64) -> Result<Vec<Entity>, WorldError> {
        match what {
            Scatter::Terrain { glyph, patch } => {
                let glyph = self.glyph(glyph)?;
                let mut rng = self.specs_world.write_resource::<RandomNumberGenerator>();
                let mut painted = 0usize;
                for tile in self.map.tiles_mut() {
                    if rng.rand::<f64>() < frequency {
                        tile.repaint(glyph, patch);
                        painted += 1;
                    }
                }
                trace!(painted, frequency, "terrain sprinkled");
                Ok(Vec::new())
            }
            Scatter::Entities { factory } => {
                let build = self.factory(factory)?;
                let count = if frequency >= 1.0 {
                    frequency as usize
                } else {
                    (frequency * self.map.area() as f64).floor() as usize
                };
                let mut spawned = Vec::with_capacity(count);
                for _ in 0..count {
                    let entity = build(self, &SpawnParams::default());
                    self.random_teleport(entity)?;
                    spawned.push(entity);
                }
                debug!(factory, count, "entities sprinkled");
                Ok(spawned)
            }
        }
    }

    /// Entities the world is simulating, in arena order.
    pub fn roster(&self) -> Vec<Entity> {
        self.specs_world.entities().join().collect()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.specs_world.is_alive(entity)
    }

    pub fn kind(&self, entity: Entity) -> Option<Kind> {
        self.specs_world.read_component::<Kind>().get(entity).copied()
    }

    pub fn name_of(&self, entity: Entity) -> Option<String> {
        self.specs_world
            .read_component::<Name>()
            .get(entity)
            .map(|name| name.0.clone())
    }

    pub fn glyph_of(&self, entity: Entity) -> Option<Glyph> {
        self.specs_world
            .read_component::<Renderable>()
            .get(entity)
            .map(|render| render.glyph)
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.specs_world
            .read_component::<Position>()
            .get(entity)
            .copied()
    }

    fn set_position(&mut self, entity: Entity, position: Position) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            *pos = position;
        }
    }

    /// Deletes every non-player entity that is no longer attached to a tile.
    pub fn prune_detached(&mut self) -> usize {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let kinds = self.specs_world.read_component::<Kind>();
            (&entities, kinds.maybe())
                .join()
                .filter(|(_, kind)| *kind != Some(&Kind::Player))
                .map(|(entity, _)| entity)
                .collect()
        };
        let doomed: Vec<Entity> = doomed
            .into_iter()
            .filter(|entity| !self.attached(*entity))
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        for &entity in &doomed {
            let _ = self.specs_world.delete_entity(entity);
        }
        self.specs_world.maintain();
        trace!(pruned = doomed.len(), "roster compacted");
        doomed.len()
    }

    /// Runs every entity's behaviour for `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) {
        self.specs_world.insert(TickDelta(elapsed));
        self.dispatcher.dispatch(&self.specs_world);

        let plans: Vec<(Entity, Intent)> = {
            let entities = self.specs_world.entities();
            let mut intents = self.specs_world.write_component::<Intent>();
            (&entities, intents.drain()).join().collect()
        };

        for (entity, intent) in plans {
            match intent {
                Intent::Walk(steps) => {
                    for step in steps {
                        if !self.attached(entity) {
                            break;
                        }
                        self.try_move(entity, step.x, step.y);
                    }
                }
                Intent::Drift { dx, dy } => {
                    if self.attached(entity) {
                        self.fly(entity, dx, dy);
                    }
                }
            }
        }
        self.specs_world.maintain();
    }

    /// Camera-relative view of `viewport` (screen cells) with `camera` as the
    /// world coordinate of the viewport's top-left corner.
    pub fn render(&self, camera: Point, viewport: Rect) -> Vec<DrawCell> {
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut cells = Vec::with_capacity((viewport.width() * viewport.height()).max(0) as usize);
        for iy in 0..viewport.height() {
            for ix in 0..viewport.width() {
                let glyph = match self.map.tile(camera.x + ix, camera.y + iy) {
                    Some(tile) => tile
                        .frontmost()
                        .filter(|_| !tile.conceal)
                        .and_then(|entity| renderables.get(entity))
                        .map_or(tile.glyph, |render| render.glyph),
                    None => self.void,
                };
                cells.push(DrawCell {
                    screen: Point::new(viewport.x1 + ix, viewport.y1 + iy),
                    glyph,
                });
            }
        }
        cells
    }
}

#[cfg(test)]
impl World {
    pub(crate) fn spawn_marker(&mut self) -> Entity {
        use specs::Builder;

        let glyph = self.void;
        let entity = self
            .specs_world
            .create_entity()
            .with(Name("marker".to_string()))
            .with(Position::new(0.0, 0.0))
            .with(Renderable { glyph })
            .with(Kind::Item(components::Loot::Gold(0)))
            .build();
        self.attach(entity);
        entity
    }
}
