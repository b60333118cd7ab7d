//! Full-frame text rendering. Each participant gets the whole arena drawn
//! from their perspective: the border takes their color, the HUD shows their
//! scores, and every live player's trail is painted at its rounded cells.

use crate::game::arena::Arena;
use crate::game::constants::glyph;
use crate::game::grid::TileKind;
use crate::net::session::Session;

/// Render one participant's frame: a (width+2) x (height+2) character matrix
/// flattened to CRLF-separated rows, colorized with ANSI escapes. Pure read;
/// callers prepend the clear-screen sequence when writing.
pub fn frame(arena: &Arena, viewer: &Session) -> String {
    let grid = arena.grid();
    let cols = grid.width() + 2;
    let rows = grid.height() + 2;
    let border = viewer.player.color;

    let mut cells: Vec<Vec<String>> = vec![vec![String::new(); cols]; rows];

    // Walls, viewer-tinted
    for x in 0..cols {
        cells[0][x] = border.paint_bright(glyph::WALL_HORIZONTAL);
        cells[rows - 1][x] = border.paint_bright(glyph::WALL_HORIZONTAL);
    }
    for row in cells.iter_mut() {
        row[0] = border.paint_bright(glyph::WALL_VERTICAL);
        row[cols - 1] = border.paint_bright(glyph::WALL_VERTICAL);
    }
    cells[0][0] = border.paint_bright(glyph::WALL_TOP_LEFT);
    cells[0][cols - 1] = border.paint_bright(glyph::WALL_TOP_RIGHT);
    cells[rows - 1][cols - 1] = border.paint_bright(glyph::WALL_BOTTOM_RIGHT);
    cells[rows - 1][0] = border.paint_bright(glyph::WALL_BOTTOM_LEFT);

    // Field tiles
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let ch = match grid.tile(x, y).map(|t| t.kind) {
                Some(TileKind::Blocking) => glyph::TILE_BLOCKING,
                _ => glyph::TILE_OPEN,
            };
            cells[y + 1][x + 1] = ch.to_string();
        }
    }

    // Score line along the top wall
    let score_line = format!(
        " Score: {} : Your High Score: {} : Game High Score: {} ",
        viewer.player.score(),
        viewer.high_score,
        arena.high_score(),
    );
    draw_text(&mut cells, 0, 3, &score_line, |ch| border.paint_bright(ch));

    // Viewer's color label, right-aligned three cells from the corner
    let label = format!(" {} ", viewer.player.color.name());
    let start = cols.saturating_sub(3 + label.chars().count());
    draw_text(&mut cells, 0, start, &label, |ch| viewer.player.color.paint(ch));

    // Opponents' live scores along the bottom wall, alphabetical by color
    // name, each entry in its owner's color
    if arena.session_count() > 1 {
        let mut others: Vec<&Session> =
            arena.sessions().filter(|s| s.id != viewer.id).collect();
        others.sort_by_key(|s| s.player.color.name());

        let mut col = 3;
        for other in &others {
            let entry = format!(" {}: {}", other.player.color.name(), other.player.score());
            for ch in entry.chars() {
                put(&mut cells, rows - 1, col, other.player.color.paint(ch));
                col += 1;
            }
        }
        put(&mut cells, rows - 1, col, " ".to_string());
    } else {
        draw_text(
            &mut cells,
            rows - 1,
            3,
            crate::game::constants::term::SCORE_WARNING,
            |ch| border.paint_bright(ch),
        );
    }

    // Arena name, right-aligned on the bottom wall
    let name = format!(" {} ", arena.name());
    let start = cols.saturating_sub(3 + name.chars().count());
    draw_text(&mut cells, rows - 1, start, &name, |ch| border.paint_bright(ch));

    // Trails first, then head markers on top
    for session in arena.sessions() {
        let color = session.player.color;
        for seg in &session.player.trail {
            let (x, y) = seg.pos.cell();
            put_cell(&mut cells, x, y, color.paint(seg.glyph));
        }
        let (x, y) = session.player.pos.cell();
        put_cell(&mut cells, x, y, color.paint(session.player.marker));
    }

    let mut out = String::with_capacity(rows * cols * 2);
    for (i, row) in cells.iter().enumerate() {
        for cell in row {
            out.push_str(cell);
        }
        if i != rows - 1 {
            out.push_str("\r\n");
        }
    }
    out
}

/// Place a string at an interior grid cell, offset past the border. Writes
/// outside the matrix are dropped so a transiently out-of-bounds player can
/// never break a frame.
fn put_cell(cells: &mut [Vec<String>], x: i32, y: i32, value: String) {
    if x >= 0 && y >= 0 {
        put(cells, y as usize + 1, x as usize + 1, value);
    }
}

fn put(cells: &mut [Vec<String>], row: usize, col: usize, value: String) {
    if let Some(cell) = cells.get_mut(row).and_then(|r| r.get_mut(col)) {
        *cell = value;
    }
}

fn draw_text<F>(cells: &mut [Vec<String>], row: usize, col: usize, text: &str, paint: F)
where
    F: Fn(char) -> String,
{
    for (i, ch) in text.chars().enumerate() {
        put(cells, row, col + i, paint(ch));
    }
}
