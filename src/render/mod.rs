use bracket_geometry::prelude::{Point, Rect};
use bracket_terminal::prelude::*;

use crate::{ecs::DrawCell, session::Hud};

/// Map viewport for a console: one column of border on each side, one row of
/// border on top, and the HUD row plus bottom border underneath.
pub fn viewport(width: i32, height: i32) -> Rect {
    Rect::with_size(1, 1, (width - 2).max(1), (height - 3).max(1))
}

/// Where each HUD string lands for a given viewport. Title and status share
/// the row under the map; the caption sits centred in the top border.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudLayout {
    pub title: (Point, String),
    pub status: (Point, String),
    pub caption: Option<(Point, String)>,
}

impl HudLayout {
    pub fn new(hud: &Hud, view: Rect) -> Self {
        let row = view.y2;
        let status_x = (view.x2 - hud.status.chars().count() as i32).max(view.x1);
        let caption = hud.caption.as_ref().map(|caption| {
            let text: String = caption.chars().take(view.width().max(0) as usize).collect();
            let len = text.chars().count() as i32;
            let x = view.x1 + (view.width() - len) / 2;
            (Point::new(x, view.y1 - 1), text)
        });
        Self {
            title: (Point::new(view.x1, row), hud.title.clone()),
            status: (Point::new(status_x, row), hud.status.clone()),
            caption,
        }
    }
}

/// Border first, then the map, then the HUD text on top.
pub fn draw_scene(console: &mut dyn Console, cells: &[DrawCell], hud: &Hud, view: Rect) {
    let (width, height) = console.get_char_size();
    console.draw_hollow_box(
        0,
        0,
        width as i32 - 1,
        height as i32 - 1,
        RGBA::named(GRAY),
        RGBA::named(BLACK),
    );
    draw_view(console, cells);
    draw_hud(console, hud, view);
}

pub fn draw_view(console: &mut dyn Console, cells: &[DrawCell]) {
    for cell in cells {
        console.set(
            cell.screen.x,
            cell.screen.y,
            cell.glyph.color.into(),
            RGBA::named(BLACK),
            to_cp437(cell.glyph.symbol),
        );
    }
}

pub fn draw_hud(console: &mut dyn Console, hud: &Hud, view: Rect) {
    let layout = HudLayout::new(hud, view);
    let (at, text) = &layout.title;
    console.print_color(at.x, at.y, RGBA::named(WHITE), RGBA::named(BLACK), text);
    let (at, text) = &layout.status;
    console.print_color(at.x, at.y, RGBA::named(YELLOW), RGBA::named(BLACK), text);
    if let Some((at, text)) = &layout.caption {
        console.print_color(at.x, at.y, RGBA::named(LIGHT_CYAN), RGBA::named(BLACK), text);
    }
}

pub fn draw_prompt(console: &mut dyn Console, headline: &str) {
    let (_, height) = console.get_char_size();
    let middle = height as i32 / 2;
    console.print_color_centered(middle - 1, RGBA::named(RED), RGBA::named(BLACK), headline);
    console.print_color_centered(
        middle + 1,
        RGBA::named(WHITE),
        RGBA::named(BLACK),
        "[R] try again   [Q] quit",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Glyph;

    fn hud(caption: Option<&str>) -> Hud {
        Hud {
            title: "The Forest".to_string(),
            status: "Gold: 0 | HP 100 / 100".to_string(),
            caption: caption.map(str::to_string),
        }
    }

    fn glyph_at(console: &VirtualConsole, x: i32, y: i32) -> FontCharType {
        console.tiles[console.at(x, y)].glyph
    }

    fn row_text(console: &VirtualConsole, y: i32) -> Vec<FontCharType> {
        (0..console.width as i32).map(|x| glyph_at(console, x, y)).collect()
    }

    #[test]
    fn viewport_leaves_room_for_border_and_hud() {
        let view = viewport(80, 50);
        assert_eq!((view.x1, view.y1), (1, 1));
        assert_eq!((view.width(), view.height()), (78, 47));
        assert_eq!(view.y2, 48);
    }

    #[test]
    fn tiny_consoles_still_get_a_cell() {
        let view = viewport(1, 1);
        assert_eq!((view.width(), view.height()), (1, 1));
    }

    #[test]
    fn hud_sits_under_the_map() {
        let view = viewport(80, 50);
        let layout = HudLayout::new(&hud(None), view);
        assert_eq!(layout.title.0, Point::new(1, 48));
        assert_eq!(layout.status.0, Point::new(79 - 22, 48));
        assert_eq!(layout.caption, None);
    }

    #[test]
    fn captions_are_centred_in_the_top_border() {
        let view = viewport(80, 50);
        let layout = HudLayout::new(&hud(Some("a tree")), view);
        assert_eq!(
            layout.caption,
            Some((Point::new(1 + 36, 0), "a tree".to_string()))
        );
    }

    #[test]
    fn long_captions_are_clipped_to_the_viewport() {
        let view = viewport(12, 8);
        let layout = HudLayout::new(&hud(Some("some very tall grass indeed")), view);
        let (at, text) = layout.caption.expect("caption");
        assert_eq!(at, Point::new(1, 0));
        assert_eq!(text, "some very ");
    }

    #[test]
    fn map_cells_survive_the_frame_and_hud() {
        let mut console = VirtualConsole::new(Point::new(30, 10));
        let view = viewport(30, 10);
        let monster = Glyph::new('M', RGB::named(RED));
        let cells = vec![
            DrawCell {
                screen: Point::new(3, 3),
                glyph: monster,
            },
            DrawCell {
                screen: Point::new(view.x2 - 1, view.y2 - 1),
                glyph: monster,
            },
        ];
        draw_scene(&mut console, &cells, &hud(Some("a monster")), view);

        assert_eq!(glyph_at(&console, 3, 3), to_cp437('M'));
        assert_eq!(glyph_at(&console, view.x2 - 1, view.y2 - 1), to_cp437('M'));
        assert_eq!(glyph_at(&console, 0, 0), to_cp437('┌'));
        assert_eq!(glyph_at(&console, 29, 9), to_cp437('┘'));
    }

    #[test]
    fn caption_never_overwrites_title_or_status() {
        let mut console = VirtualConsole::new(Point::new(40, 10));
        let view = viewport(40, 10);
        let long = "some extraordinarily tall grass";
        draw_scene(&mut console, &[], &hud(Some(long)), view);

        let status_row = row_text(&console, view.y2);
        let title: Vec<FontCharType> = "The Forest".chars().map(to_cp437).collect();
        assert_eq!(&status_row[1..11], title.as_slice());
        let status: Vec<FontCharType> = "Gold: 0 | HP 100 / 100".chars().map(to_cp437).collect();
        let start = (view.x2 - 22) as usize;
        assert_eq!(&status_row[start..start + 22], status.as_slice());
        assert_eq!(glyph_at(&console, 4, 0), to_cp437('s'));
        assert_eq!(glyph_at(&console, 0, 0), to_cp437('┌'));
    }

    #[test]
    fn prompt_offers_retry_and_quit() {
        let mut console = VirtualConsole::new(Point::new(40, 10));
        draw_prompt(&mut console, "slain");
        let row: String = row_text(&console, 6)
            .into_iter()
            .filter(|g| *g != 0 && *g != 32)
            .map(|g| char::from(g as u8))
            .collect();
        assert_eq!(row, "[R]tryagain[Q]quit");
    }
}
