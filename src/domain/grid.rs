/// Rectangular tile grid.
///
/// Plain data: no locking here. The shared copy lives inside the
/// `GridStore`, which serializes every access. Every accessor is
/// bounds-checked and reports `GridError::OutOfBounds` instead of panicking.

use crate::domain::tile::{Tile, TileKind};
use crate::error::GridError;

#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build from rows. Short rows are padded with empty tiles so the
    /// grid is always rectangular.
    pub fn from_rows(mut rows: Vec<Vec<Tile>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Tile::EMPTY);
        }
        let height = rows.len();
        Grid { cells: rows, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.cells
    }

    /// Resolve signed coordinates to a cell index.
    pub fn checked(&self, x: i64, y: i64) -> Result<(usize, usize), GridError> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Err(GridError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok((x as usize, y as usize))
    }

    /// Cell reached from (x, y) by (dx, dy), if it is on the grid.
    pub fn offset(&self, x: usize, y: usize, dx: i64, dy: i64) -> Result<(usize, usize), GridError> {
        self.checked(x as i64 + dx, y as i64 + dy)
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Tile, GridError> {
        let (x, y) = self.checked(x as i64, y as i64)?;
        Ok(self.cells[y][x])
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> Result<(), GridError> {
        let (x, y) = self.checked(x as i64, y as i64)?;
        self.cells[y][x] = tile;
        Ok(())
    }

    /// Relocate the tile at `from` onto `to`, leaving empty floor behind.
    /// Both ends are validated before anything is written.
    pub fn move_tile(&mut self, from: (usize, usize), to: (usize, usize)) -> Result<(), GridError> {
        let tile = self.get(from.0, from.1)?;
        self.checked(to.0 as i64, to.1 as i64)?;
        if from == to {
            return Ok(());
        }
        self.cells[from.1][from.0] = Tile::EMPTY;
        self.cells[to.1][to.0] = tile;
        Ok(())
    }

    /// First cell (row-major) whose tile satisfies `pred`.
    pub fn find_first(&self, pred: impl Fn(Tile) -> bool) -> Result<(usize, usize), GridError> {
        self.cells
            .iter()
            .enumerate()
            .find_map(|(y, row)| row.iter().position(|t| pred(*t)).map(|x| (x, y)))
            .ok_or(GridError::NotFound)
    }

    /// All cells of the given kind, row-major.
    pub fn positions_of(&self, kind: TileKind) -> Vec<(usize, usize)> {
        let mut found = vec![];
        for (y, row) in self.cells.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is(kind) {
                    found.push((x, y));
                }
            }
        }
        found
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().flatten().filter(|t| t.is(kind)).count()
    }

    /// On-grid cells within `radius` of the center on both axes whose
    /// squared distance is at most `max_sq`. Row-major order.
    pub fn cells_near(&self, cx: usize, cy: usize, radius: i64, max_sq: i64) -> Vec<(usize, usize)> {
        let mut out = vec![];
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > max_sq { continue; }
                if let Ok(cell) = self.offset(cx, cy, dx, dy) {
                    out.push(cell);
                }
            }
        }
        out
    }
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str]) -> Grid {
    Grid::from_rows(
        rows.iter()
            .map(|r| {
                r.chars()
                    .map(|c| TileKind::from_symbol(c).map(Tile::new).unwrap_or_default())
                    .collect()
            })
            .collect(),
    )
}
