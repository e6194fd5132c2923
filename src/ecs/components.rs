use bracket_geometry::prelude::Point;
use smallvec::SmallVec;
use specs::prelude::{Component, VecStorage};

use crate::ecs::signal::{Contact, MoveEvent, Signal};
use crate::map::Glyph;

#[derive(Clone, Debug)]
pub struct Name(pub String);

impl Component for Name {
    type Storage = VecStorage<Self>;
}

/// Walkers sit on whole numbers; bullets drift between cells.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn cell(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: Glyph,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Loot {
    Gold(u32),
    Restore,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Player,
    Monster,
    Item(Loot),
    Bullet,
}

impl Component for Kind {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Component for Velocity {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Walker {
    /// Tiles per second.
    pub speed: f32,
}

impl Component for Walker {
    type Storage = VecStorage<Self>;
}

/// Movement planned by a system, resolved by the world after dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Walk(SmallVec<[Point; 4]>),
    Drift { dx: f32, dy: f32 },
}

impl Component for Intent {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Horizontal intent wins over vertical; a null step keeps nothing.
    pub fn from_step(dx: i32, dy: i32) -> Option<Self> {
        if dx > 0 {
            Some(Facing::Right)
        } else if dx < 0 {
            Some(Facing::Left)
        } else if dy < 0 {
            Some(Facing::Up)
        } else if dy > 0 {
            Some(Facing::Down)
        } else {
            None
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Facing::Up => '^',
            Facing::Down => 'v',
            Facing::Left => '<',
            Facing::Right => '>',
        }
    }

    pub fn delta(self) -> Point {
        match self {
            Facing::Up => Point::new(0, -1),
            Facing::Down => Point::new(0, 1),
            Facing::Left => Point::new(-1, 0),
            Facing::Right => Point::new(1, 0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub gold: u32,
    pub facing: Facing,
    pub last_target: Option<String>,
    pub last_pickup: Option<String>,
}

impl PlayerState {
    pub fn new(max_hp: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            gold: 0,
            facing: Facing::default(),
            last_target: None,
            last_pickup: None,
        }
    }
}

impl Component for PlayerState {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Default)]
pub struct Signals {
    pub moved: Signal<MoveEvent>,
    pub collided: Signal<Contact>,
}

impl Component for Signals {
    type Storage = VecStorage<Self>;
}
