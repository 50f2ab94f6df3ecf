/// Error types shared by the map loader and the grid store.
///
/// Win and loss are not errors; they travel as `Outcome` values.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::tile::TileKind;

/// Startup failures: the map cannot become a playable grid.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read map {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map is empty")]
    Empty,
    #[error("map has no player start")]
    NoPlayerStart,
    #[error("map has {0} player starts, expected exactly one")]
    MultiplePlayerStarts(usize),
    #[error("map has {0} enemies, at most one is supported")]
    TooManyEnemies(usize),
}

/// Rejected grid access. Callers drop the action for this tick.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: i64, y: i64, width: usize, height: usize },
    #[error("no cell matches")]
    NotFound,
    #[error("a {kind:?} already stands at ({x}, {y})")]
    AlreadyPlaced { kind: TileKind, x: usize, y: usize },
    #[error("cell ({x}, {y}) holds the player")]
    PlayerCell { x: usize, y: usize },
}
