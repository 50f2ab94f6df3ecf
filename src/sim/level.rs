/// Map loader.
///
/// ## Format
///   Plain text, one line per row, one character per column.
///   Columns are counted in characters, so wide glyphs take one cell.
///
/// ## Tile legend:
///   '▤' / '=' = Wall         '#' = Barrier
///   '♣'       = Vegetation   '*' = Special (freeze trigger)
///   '☠' / 'E' = Enemy        '🪙' / '$' = Coin
///   '☺' / 'P' = Player start (loaded as empty floor)
///   anything else = Empty
///
/// Short rows are padded with empty floor to the widest row.
/// Trailing blank lines are dropped.

use std::path::Path;

use log::info;

use crate::domain::grid::Grid;
use crate::domain::tile::{Tile, TileKind};
use crate::error::MapError;

/// A parsed map, ready to seed a simulation.
#[derive(Clone, Debug)]
pub struct LoadedMap {
    /// The grid with the player start replaced by empty floor.
    pub grid: Grid,
    pub player_start: (usize, usize),
    /// Coins on the map at load time; reaching this score wins.
    pub coins: usize,
}

pub fn load_map(path: &Path) -> Result<LoadedMap, MapError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| MapError::Unreadable { path: path.to_path_buf(), source })?;
    let map = parse_map(&text)?;
    info!(
        "loaded {} ({}x{}, {} coins)",
        path.display(), map.grid.width(), map.grid.height(), map.coins,
    );
    Ok(map)
}

pub fn parse_map(text: &str) -> Result<LoadedMap, MapError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(MapError::Empty);
    }

    let mut starts = vec![];
    let mut rows = Vec::with_capacity(lines.len());
    for (y, line) in lines.iter().enumerate() {
        let mut row = vec![];
        for (x, ch) in line.chars().enumerate() {
            let kind = TileKind::from_symbol(ch).unwrap_or(TileKind::Empty);
            if kind == TileKind::Player {
                starts.push((x, y));
                row.push(Tile::EMPTY);
            } else {
                row.push(Tile::new(kind));
            }
        }
        rows.push(row);
    }

    let player_start = match starts.as_slice() {
        [] => return Err(MapError::NoPlayerStart),
        [start] => *start,
        many => return Err(MapError::MultiplePlayerStarts(many.len())),
    };

    let grid = Grid::from_rows(rows);
    let enemies = grid.count(TileKind::Enemy);
    if enemies > 1 {
        return Err(MapError::TooManyEnemies(enemies));
    }
    let coins = grid.count(TileKind::Coin);

    Ok(LoadedMap { grid, player_start, coins })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glyphs_and_records_start() {
        let map = parse_map("▤▤▤▤\n▤☺🪙▤\n▤*☠▤\n▤♣#▤\n").unwrap();
        assert_eq!((map.grid.width(), map.grid.height()), (4, 4));
        assert_eq!(map.player_start, (1, 1));
        assert!(map.grid.get(1, 1).unwrap().is(TileKind::Empty));
        assert!(map.grid.get(2, 1).unwrap().is(TileKind::Coin));
        assert!(map.grid.get(1, 2).unwrap().is(TileKind::Special));
        assert!(map.grid.get(2, 2).unwrap().is(TileKind::Enemy));
        assert!(map.grid.get(1, 3).unwrap().is(TileKind::Vegetation));
        assert!(map.grid.get(2, 3).unwrap().is(TileKind::Barrier));
        assert_eq!(map.coins, 1);
    }

    #[test]
    fn wide_glyphs_count_as_one_column() {
        // the coin glyph is four bytes in UTF-8
        let map = parse_map("🪙P$").unwrap();
        assert_eq!(map.grid.width(), 3);
        assert_eq!(map.player_start, (1, 0));
        assert_eq!(map.coins, 2);
    }

    #[test]
    fn ragged_rows_are_padded() {
        let map = parse_map("=====\n=P\n===").unwrap();
        assert_eq!(map.grid.width(), 5);
        assert!(map.grid.get(4, 1).unwrap().is(TileKind::Empty));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let map = parse_map("P \n\n\n").unwrap();
        assert_eq!(map.grid.height(), 1);
    }

    #[test]
    fn rejects_empty_map() {
        assert!(matches!(parse_map("\n \n"), Err(MapError::Empty)));
    }

    #[test]
    fn rejects_missing_or_duplicate_start() {
        assert!(matches!(parse_map("=$="), Err(MapError::NoPlayerStart)));
        assert!(matches!(parse_map("P P"), Err(MapError::MultiplePlayerStarts(2))));
    }

    #[test]
    fn rejects_two_enemies() {
        assert!(matches!(parse_map("P E E"), Err(MapError::TooManyEnemies(2))));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_map(Path::new("/nonexistent/coinchase/map.txt")).unwrap_err();
        assert!(matches!(err, MapError::Unreadable { .. }));
    }
}
