use std::time::Instant;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use chrono::{DateTime, Local};
use specs::Entity;
use tracing::{error, info};

use crate::{
    config::GameConfig,
    data,
    ecs::{DrawCell, SpawnParams, World},
    error::WorldError,
    scheduler::Scheduler,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Quit,
    None,
}

impl Key {
    pub fn step(self) -> Option<(i32, i32)> {
        match self {
            Key::Up => Some((0, -1)),
            Key::Down => Some((0, 1)),
            Key::Left => Some((-1, 0)),
            Key::Right => Some((1, 0)),
            Key::Fire | Key::Quit | Key::None => None,
        }
    }
}

/// Non-blocking key source, polled once per simulated tick.
pub trait InputSource {
    fn poll_key(&mut self) -> Key;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Running,
    Quit,
    Defeat(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    pub title: String,
    pub status: String,
    pub caption: Option<String>,
}

pub struct Session {
    world: World,
    player: Entity,
    scheduler: Scheduler,
    seed: u64,
    ticks: u64,
    started: DateTime<Local>,
}

impl Session {
    pub fn new(config: &GameConfig) -> Result<Self, WorldError> {
        let seed = config
            .seed
            .unwrap_or_else(|| RandomNumberGenerator::new().rand::<u64>());
        let (world, player) = data::build_world(config, seed)?;
        info!(seed, world = %world.name, "session started");
        Ok(Self {
            world,
            player,
            scheduler: Scheduler::new(config.tick_rate, Instant::now()),
            seed,
            ticks: 0,
            started: Local::now(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One simulated tick: act on the key, refresh the player, compact the
    /// roster, then advance everything else by one fixed step.
    pub fn step(&mut self, key: Key) -> Outcome {
        match key {
            Key::Quit => {
                info!(ticks = self.ticks, "quit requested");
                return Outcome::Quit;
            }
            Key::Fire => self.fire(),
            _ => {
                if let Some((dx, dy)) = key.step() {
                    self.world.try_move(self.player, dx, dy);
                }
            }
        }

        self.world.update_targets(self.player);
        self.world.prune_detached();
        self.world.advance(self.scheduler.tick_seconds());
        self.ticks += 1;

        match self.world.player_state(self.player) {
            Some(state) if state.hp <= 0 => {
                let survived = Local::now().signed_duration_since(self.started);
                let message = format!(
                    "You were slain in {} after {} seconds, clutching {} gold.",
                    self.world.name,
                    survived.num_seconds(),
                    state.gold
                );
                info!(ticks = self.ticks, gold = state.gold, "defeat");
                Outcome::Defeat(message)
            }
            _ => Outcome::Running,
        }
    }

    fn fire(&mut self) {
        let (Some(pos), Some(state)) = (
            self.world.position(self.player),
            self.world.player_state(self.player),
        ) else {
            return;
        };
        let heading = state.facing.delta();
        let speed = self.world.rules.bullet_speed;
        let params = SpawnParams::at(pos.x, pos.y)
            .with_velocity(heading.x as f32 * speed, heading.y as f32 * speed);
        if let Err(err) = self.world.spawn("bullet", &params) {
            error!(%err, "cannot fire");
        }
    }

    /// Runs a tick if the scheduler has one due, polling input only then.
    pub fn pump<I: InputSource>(&mut self, input: &mut I, now: Instant) -> Option<Outcome> {
        if self.scheduler.accumulate(now) {
            Some(self.step(input.poll_key()))
        } else {
            None
        }
    }

    /// Real-time loop for frontends without their own frame pacing.
    pub fn run<I: InputSource>(&mut self, input: &mut I) -> Outcome {
        loop {
            self.scheduler.wait_for_tick();
            let outcome = self.step(input.poll_key());
            if outcome != Outcome::Running {
                return outcome;
            }
        }
    }

    /// As fast as possible, giving up as quit after `max_ticks`.
    pub fn run_headless<I: InputSource>(&mut self, input: &mut I, max_ticks: u64) -> Outcome {
        while self.ticks < max_ticks {
            let outcome = self.step(input.poll_key());
            if outcome != Outcome::Running {
                return outcome;
            }
        }
        Outcome::Quit
    }

    pub fn hud(&self) -> Hud {
        let state = self.world.player_state(self.player);
        let (gold, hp, max_hp) = state
            .as_ref()
            .map_or((0, 0, 0), |s| (s.gold, s.hp, s.max_hp));
        Hud {
            title: self.world.name.clone(),
            status: format!("Gold: {gold} | HP {hp} / {max_hp}"),
            caption: state.and_then(|s| s.last_target),
        }
    }

    /// World coordinate of the viewport's top-left corner, centred on the player.
    pub fn camera(&self, viewport: Rect) -> Point {
        let center = self
            .world
            .position(self.player)
            .map_or(Point::new(0, 0), |pos| pos.cell());
        Point::new(
            center.x - viewport.width() / 2,
            center.y - viewport.height() / 2,
        )
    }

    pub fn view(&self, viewport: Rect) -> Vec<DrawCell> {
        self.world.render(self.camera(viewport), viewport)
    }
}
