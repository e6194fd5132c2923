use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use specs::Entity;

use crate::error::WorldError;

pub const DEFAULT_MAP_WIDTH: i32 = 100;
pub const DEFAULT_MAP_HEIGHT: i32 = 100;
/// Upper bound on `width * height`.
pub const MAX_MAP_AREA: usize = 1 << 22;

/// Display symbol plus the flags the target description cares about.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Glyph {
    pub symbol: char,
    pub color: RGB,
    pub plural: bool,
    pub obvious: bool,
}

impl Glyph {
    pub fn new(symbol: char, color: RGB) -> Self {
        Self {
            symbol,
            color,
            plural: false,
            obvious: false,
        }
    }

    pub fn plural(mut self) -> Self {
        self.plural = true;
        self
    }

    pub fn obvious(mut self) -> Self {
        self.obvious = true;
        self
    }
}

/// Property overrides merged into a tile by terrain sprinkling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilePatch {
    pub name: Option<String>,
    pub solid: Option<bool>,
    pub conceal: Option<bool>,
    pub plural: Option<bool>,
    pub obvious: Option<bool>,
    pub theme: Option<String>,
}

impl TilePatch {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn solid(mut self) -> Self {
        self.solid = Some(true);
        self
    }

    pub fn concealing(mut self) -> Self {
        self.conceal = Some(true);
        self
    }

    pub fn plural(mut self) -> Self {
        self.plural = Some(true);
        self
    }

    pub fn obvious(mut self) -> Self {
        self.obvious = Some(true);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub glyph: Glyph,
    pub name: String,
    pub solid: bool,
    pub conceal: bool,
    pub plural: bool,
    pub obvious: bool,
    pub theme: String,
    occupants: SmallVec<[Entity; 2]>,
}

impl Tile {
    pub fn new(glyph: Glyph, name: &str) -> Self {
        Self {
            glyph,
            name: name.to_string(),
            solid: false,
            conceal: false,
            plural: glyph.plural,
            obvious: glyph.obvious,
            theme: String::new(),
            occupants: SmallVec::new(),
        }
    }

    pub fn with_theme(mut self, theme: &str) -> Self {
        self.theme = theme.to_string();
        self
    }

    /// New glyph, its flags, then the patch on top.
    pub fn repaint(&mut self, glyph: Glyph, patch: &TilePatch) {
        self.glyph = glyph;
        self.plural = glyph.plural;
        self.obvious = glyph.obvious;
        self.apply(patch);
    }

    pub fn apply(&mut self, patch: &TilePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(theme) = &patch.theme {
            self.theme.clone_from(theme);
        }
        self.solid = patch.solid.unwrap_or(self.solid);
        self.conceal = patch.conceal.unwrap_or(self.conceal);
        self.plural = patch.plural.unwrap_or(self.plural);
        self.obvious = patch.obvious.unwrap_or(self.obvious);
    }

    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.occupants.contains(&entity)
    }

    /// Returns false when the entity was already listed.
    pub fn add(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.occupants.push(entity);
        true
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.occupants.iter().position(|e| *e == entity) {
            Some(idx) => {
                self.occupants.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn frontmost(&self) -> Option<Entity> {
        self.occupants.first().copied()
    }
}

/// Coordinate types the grid accepts. Floats resolve to the nearest cell.
pub trait GridCoord: Copy {
    fn cell(self) -> i32;
    fn clamp_axis(self, len: i32) -> Self;
}

impl GridCoord for i32 {
    fn cell(self) -> i32 {
        self
    }

    fn clamp_axis(self, len: i32) -> Self {
        self.clamp(0, len - 1)
    }
}

impl GridCoord for f32 {
    fn cell(self) -> i32 {
        self.round() as i32
    }

    fn clamp_axis(self, len: i32) -> Self {
        self.clamp(0.0, (len - 1) as f32)
    }
}

#[derive(Clone, Debug)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
}

impl Map {
    pub fn new(width: i32, height: i32, fill: Tile) -> Result<Self, WorldError> {
        let width = width.max(1);
        let height = height.max(1);
        let area = (width as usize)
            .checked_mul(height as usize)
            .filter(|area| *area <= MAX_MAP_AREA)
            .ok_or(WorldError::MapTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            tiles: vec![fill; area],
        })
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile<C: GridCoord>(&self, x: C, y: C) -> Option<&Tile> {
        self.idx(x.cell(), y.cell()).map(|idx| &self.tiles[idx])
    }

    pub fn tile_mut<C: GridCoord>(&mut self, x: C, y: C) -> Option<&mut Tile> {
        self.idx(x.cell(), y.cell()).map(|idx| &mut self.tiles[idx])
    }

    pub fn snap<C: GridCoord>(&self, x: C, y: C) -> (C, C) {
        (x.clamp_axis(self.width), y.clamp_axis(self.height))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub fn area(&self) -> usize {
        self.tiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_terminal::prelude::{GREEN, WHITE};
    use proptest::prelude::*;
    use specs::{Builder, World as SpecsWorld, WorldExt};

    fn grass() -> Tile {
        Tile::new(Glyph::new('.', RGB::named(GREEN)).obvious(), "grass")
    }

    #[test]
    fn tile_lookup_rejects_out_of_range() {
        let map = Map::new(4, 3, grass()).expect("small map");
        assert!(map.tile(0, 0).is_some());
        assert!(map.tile(3, 2).is_some());
        assert!(map.tile(-1, 0).is_none());
        assert!(map.tile(0, -1).is_none());
        assert!(map.tile(4, 0).is_none());
        assert!(map.tile(0, 3).is_none());
    }

    #[test]
    fn float_lookup_rounds_to_nearest_cell() {
        let mut map = Map::new(4, 4, grass()).expect("small map");
        if let Some(tile) = map.tile_mut(2, 1) {
            tile.name = "stump".to_string();
        }
        assert_eq!(map.tile(1.6f32, 0.6f32).map(|t| t.name.as_str()), Some("stump"));
        assert_eq!(map.tile(2.4f32, 1.4f32).map(|t| t.name.as_str()), Some("stump"));
        assert!(map.tile(3.6f32, 0.0f32).is_none());
    }

    #[test]
    fn degenerate_dimensions_are_raised_to_one() {
        let map = Map::new(0, -3, grass()).expect("small map");
        assert_eq!((map.width, map.height), (1, 1));
        assert!(map.tile(0, 0).is_some());
    }

    #[test]
    fn oversized_maps_are_rejected() {
        let err = Map::new(50_000, 50_000, grass()).unwrap_err();
        assert!(matches!(err, WorldError::MapTooLarge { width: 50_000, height: 50_000 }));
        let err = Map::new(i32::MAX, i32::MAX, grass()).unwrap_err();
        assert!(matches!(err, WorldError::MapTooLarge { .. }));
        assert!(Map::new(64, 64, grass()).is_ok());
    }

    #[test]
    fn snap_preserves_coordinate_type() {
        let map = Map::new(10, 5, grass()).expect("small map");
        assert_eq!(map.snap(-3, 7), (0, 4));
        assert_eq!(map.snap(12.5f32, -0.5f32), (9.0, 0.0));
        assert_eq!(map.snap(3.25f32, 2.75f32), (3.25, 2.75));
    }

    #[test]
    fn patch_merges_only_given_properties() {
        let mut tile = grass().with_theme("forest");
        tile.apply(&TilePatch::named("rock").solid());
        assert_eq!(tile.name, "rock");
        assert!(tile.solid);
        assert!(!tile.conceal);
        assert!(tile.obvious);
        assert_eq!(tile.theme, "forest");
    }

    #[test]
    fn occupant_list_has_no_duplicates() {
        let mut specs_world = SpecsWorld::new();
        let a = specs_world.create_entity().build();
        let b = specs_world.create_entity().build();
        let mut tile = grass();
        assert!(tile.add(a));
        assert!(!tile.add(a));
        assert!(tile.add(b));
        assert_eq!(tile.occupants(), &[a, b]);
        assert_eq!(tile.frontmost(), Some(a));
        assert!(tile.remove(a));
        assert!(!tile.remove(a));
        assert_eq!(tile.occupants(), &[b]);
    }

    #[test]
    fn repaint_takes_flags_from_the_new_glyph() {
        let mut tile = grass();
        let rock = Glyph::new('o', RGB::named(WHITE));
        tile.repaint(rock, &TilePatch::named("rock").solid());
        assert_eq!(tile.glyph, rock);
        assert!(!tile.obvious);
        assert!(tile.solid);
    }

    #[test]
    fn glyph_flags_seed_tile_flags() {
        let glyph = Glyph::new('"', RGB::named(WHITE)).plural();
        let tile = Tile::new(glyph, "tall grass");
        assert!(tile.plural);
        assert!(!tile.obvious);
    }

    proptest! {
        #[test]
        fn lookup_matches_bounds(w in 1i32..40, h in 1i32..40, x in -50i32..50, y in -50i32..50) {
            let map = Map::new(w, h, grass()).expect("small map");
            let inside = x >= 0 && y >= 0 && x < w && y < h;
            prop_assert_eq!(map.tile(x, y).is_some(), inside);
        }

        #[test]
        fn snap_is_idempotent(w in 1i32..40, h in 1i32..40, x in -100i32..100, y in -100i32..100) {
            let map = Map::new(w, h, grass()).expect("small map");
            let once = map.snap(x, y);
            prop_assert_eq!(map.snap(once.0, once.1), once);
            prop_assert!(map.tile(once.0, once.1).is_some());
            if x >= 0 && y >= 0 && x < w && y < h {
                prop_assert_eq!(once, (x, y));
            }
        }

        #[test]
        fn float_snap_is_idempotent(x in -100.0f32..100.0, y in -100.0f32..100.0) {
            let map = Map::new(20, 20, grass()).expect("small map");
            let once = map.snap(x, y);
            prop_assert_eq!(map.snap(once.0, once.1), once);
        }
    }
}
