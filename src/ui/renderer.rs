/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (array of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each grid cell takes two terminal columns so wide glyphs (the coin)
/// line up with narrow ones.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use log::warn;

use crate::domain::tile::{Tile, TileKind, Tint};
use crate::sim::frame::{Frame, RenderSink};
use crate::ui::input::HELP;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    wide: bool, // this char occupies 2 terminal columns
    cont: bool, // right half of a wide char (skip render)
}

impl Cell {
    /// Explicit background for every cell, so the gaps between rows on
    /// VTE terminals match the cell color after a `Clear`.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG, wide: false, cont: false };

    const WIDE_CONT: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG, wide: false, cont: true };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta, wide: false, cont: false };

    fn from_char(ch: char, fg: Color) -> Self {
        Cell { ch, fg, ..Self::BLANK }
    }

    fn from_char_wide(ch: char, fg: Color) -> Self {
        Cell { ch, fg, wide: true, ..Self::BLANK }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn filled(width: usize, height: usize, cell: Cell) -> Self {
        FrameBuffer { width, height, cells: vec![cell; width * height] }
    }

    fn blank(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::BLANK)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Make every cell differ from anything `compose` can produce.
    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        self.index(x, y).map_or(Cell::BLANK, |i| self.cells[i])
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Cell::from_char(ch, fg));
        }
    }

    /// Cells that differ from `prev`, row-major, with their positions.
    /// Right halves of wide glyphs are never yielded; the wide glyph
    /// itself is yielded when either half changed.
    fn changes<'a>(&'a self, prev: &'a FrameBuffer) -> impl Iterator<Item = (usize, usize, Cell)> + 'a {
        self.cells.iter().enumerate().filter_map(move |(i, &cell)| {
            let (x, y) = (i % self.width, i / self.width);
            if cell.cont { return None; }
            let changed = cell != prev.get(x, y)
                || (cell.wide && self.get(x + 1, y) != prev.get(x + 1, y));
            changed.then_some((x, y, cell))
        })
    }
}

// ── Layout ──

/// Terminal columns per grid cell.
const CELL_W: usize = 2;
const MAP_ROW: usize = 0;
const FOG_GLYPH: char = '.';

/// The two terminal cells that draw one grid tile.
fn tile_cells(tile: Tile) -> (Cell, Cell) {
    let glyph = tile.kind.symbol();
    let fg = match (tile.kind, tile.tint) {
        (TileKind::Enemy, Tint::Frozen) => Color::Blue,
        (TileKind::Enemy, Tint::Normal) => Color::Rgb { r: 255, g: 80, b: 80 },
        (TileKind::Player, _) => Color::Rgb { r: 255, g: 220, b: 50 },
        (TileKind::Wall, _) => Color::Rgb { r: 120, g: 120, b: 120 },
        (TileKind::Barrier, _) => Color::Rgb { r: 180, g: 120, b: 60 },
        (TileKind::Vegetation, _) => Color::Rgb { r: 80, g: 200, b: 80 },
        (TileKind::Special, _) => Color::Rgb { r: 100, g: 200, b: 255 },
        (TileKind::Coin, _) | (TileKind::Empty, _) => Color::White,
    };
    match tile.kind {
        // Token: wide emoji
        TileKind::Coin => (Cell::from_char_wide(glyph, fg), Cell::WIDE_CONT),
        TileKind::Wall => (Cell::from_char(glyph, fg), Cell::from_char(glyph, fg)),
        _ => (Cell::from_char(glyph, fg), Cell::BLANK),
    }
}

/// Build the whole screen for `frame`: the grid, then the status line
/// and the key help underneath.
fn compose(buf: &mut FrameBuffer, frame: &Frame) {
    for (gy, row) in frame.grid.rows().iter().enumerate() {
        let y = MAP_ROW + gy;
        if y >= buf.height { break; }
        for (gx, &tile) in row.iter().enumerate() {
            let col = gx * CELL_W;
            if col + 1 >= buf.width { break; }
            let (left, right) = if frame.is_visible(gx, gy) {
                tile_cells(tile)
            } else {
                (Cell::from_char(FOG_GLYPH, Color::DarkGrey), Cell::BLANK)
            };
            buf.set(col, y, left);
            buf.set(col + 1, y, right);
        }
    }

    let status_row = MAP_ROW + frame.grid.height() + 1;
    buf.put_str(0, status_row, &frame.status, Color::White);
    buf.put_str(0, status_row + 1, HELP, Color::DarkGrey);
}

// ── Renderer ──

/// Pass `result` through, running `undo` first if it failed.
fn undo_on_err<T>(result: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if result.is_err() {
        if let Err(e) = undo() {
            warn!("terminal restore failed: {e}");
        }
    }
    result
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::blank(0, 0),
            back: FrameBuffer::blank(0, 0),
        }
    }

    /// Raw mode, alternate screen, hidden cursor. On failure the terminal
    /// is restored before the error is returned.
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let entered = execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        );
        undo_on_err(entered, || self.cleanup())?;
        self.fit_terminal();
        Ok(())
    }

    /// Leave the alternate screen and raw mode. Raw mode is dropped even
    /// when the screen commands fail.
    pub fn cleanup(&mut self) -> io::Result<()> {
        let left = execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let cooked = terminal::disable_raw_mode();
        left.and(cooked)
    }

    /// Resize both buffers to the terminal. Returns true on a change,
    /// after which the next flush repaints every cell.
    fn fit_terminal(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (w, h) = (tw as usize, th as usize);
        if (w, h) == (self.front.width, self.front.height) {
            return false;
        }
        self.front = FrameBuffer::blank(w, h);
        self.back = FrameBuffer::filled(w, h, Cell::INVALID);
        true
    }

    /// Blank the screen and forget the previous frame.
    pub fn clear(&mut self) -> io::Result<()> {
        self.front.clear();
        self.back.invalidate();
        self.present()
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        if self.fit_terminal() {
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        self.front.clear();
        compose(&mut self.front, frame);
        self.present()
    }

    /// Flush the difference, then the frame just drawn becomes the
    /// baseline for the next one.
    fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        let (mut fg, mut bg) = (Color::White, Cell::BASE_BG);
        queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        // Where the terminal cursor sits after the last print.
        let mut cursor = None;
        let mut utf8 = [0u8; 4];
        for (x, y, cell) in self.front.changes(&self.back) {
            if cursor != Some((x, y)) {
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
            }
            if cell.fg != fg {
                fg = cell.fg;
                queue!(self.writer, SetForegroundColor(fg))?;
            }
            if cell.bg != bg {
                bg = cell.bg;
                queue!(self.writer, SetBackgroundColor(bg))?;
            }
            queue!(self.writer, Print(&*cell.ch.encode_utf8(&mut utf8)))?;
            cursor = Some((x + if cell.wide { CELL_W } else { 1 }, y));
        }

        self.writer.flush()
    }
}

impl RenderSink for Renderer {
    fn apply_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.render(frame)
    }
}
