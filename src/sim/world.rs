/// WorldState: everything the actors share, and the store that guards it.
///
/// ## Exclusion domain
///
/// One `Mutex<WorldState>` inside `GridStore` covers the grid, the fog
/// overlay, cached actor positions, score, freeze state and the outcome.
/// Every find-then-mutate sequence (pursuit step, drift pass, interaction
/// scan) runs under a single `lock()` guard. Nothing sleeps while holding it.
///
/// ## Cached positions
///
/// `player` and `enemy` mirror where those tiles sit on the grid. They are
/// only changed through `set_tile()` / `move_tile()`, which update the cache
/// in the same critical section as the grid write.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::FogConfig;
use crate::domain::fog::VisibilityOverlay;
use crate::domain::freeze::FreezeState;
use crate::domain::grid::Grid;
use crate::domain::tile::{Tile, TileKind, Tint};
use crate::error::GridError;
use crate::sim::frame::Frame;
use crate::sim::level::LoadedMap;

/// How a game ends. None of these are errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Won,
    Lost,
    Quit,
}

pub struct WorldState {
    pub grid: Grid,
    pub fog: VisibilityOverlay,
    pub fog_enabled: bool,
    /// Reveal window half-extents (columns, rows).
    pub fog_radius: (usize, usize),

    // ── Cached positions ──
    pub player: (usize, usize),
    pub enemy: Option<(usize, usize)>,

    // ── Tracking ──
    pub score: usize,
    pub max_score: usize,
    pub freeze: FreezeState,
    pub outcome: Option<Outcome>,
    pub message: String,
    /// Off-grid drift targets dropped so far.
    pub rejected_drifts: usize,
}

impl WorldState {
    /// Seed from a loaded map: place the player tile on its start cell
    /// and reveal around it when fog is on.
    pub fn new(map: LoadedMap, fog: &FogConfig) -> Self {
        let LoadedMap { mut grid, player_start, coins } = map;
        let enemy = grid.find_first(|t| t.is(TileKind::Enemy)).ok();
        // the loader guarantees the start is on the grid
        let _ = grid.set(player_start.0, player_start.1, Tile::new(TileKind::Player));
        let fog_overlay = VisibilityOverlay::new(grid.width(), grid.height());

        let mut world = WorldState {
            grid,
            fog: fog_overlay,
            fog_enabled: fog.enabled,
            fog_radius: (fog.radius, fog.radius / 2),
            player: player_start,
            enemy,
            score: 0,
            max_score: coins,
            freeze: FreezeState::Idle,
            outcome: None,
            message: String::new(),
            rejected_drifts: 0,
        };
        world.reveal_around_player();
        world
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record the terminal outcome. Only the first call wins.
    pub fn finish(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() { return false; }
        self.outcome = Some(outcome);
        true
    }

    pub fn reveal_around_player(&mut self) {
        if !self.fog_enabled { return; }
        let (rx, ry) = self.fog_radius;
        self.fog.reveal(self.player.0, self.player.1, rx, ry);
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
    }

    /// Write one cell, keeping the cached positions in step.
    ///
    /// Refuses writes that would leave zero or two players, or two
    /// enemies: the player's cell only takes a player tile, and a player
    /// or enemy tile only goes where that actor already stands (or, for
    /// the enemy, where there is none yet). Use `move_tile` to relocate.
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) -> Result<(), GridError> {
        let before = self.grid.get(x, y)?;
        self.check_placement(x, y, tile.kind)?;
        self.grid.set(x, y, tile)?;
        if before.is(TileKind::Enemy) && self.enemy == Some((x, y)) {
            self.enemy = None;
        }
        if tile.is(TileKind::Enemy) {
            self.enemy = Some((x, y));
        }
        Ok(())
    }

    fn check_placement(&self, x: usize, y: usize, kind: TileKind) -> Result<(), GridError> {
        let (px, py) = self.player;
        match kind {
            TileKind::Player if (x, y) != self.player => {
                Err(GridError::AlreadyPlaced { kind, x: px, y: py })
            }
            TileKind::Player => Ok(()),
            _ if (x, y) == self.player => Err(GridError::PlayerCell { x, y }),
            TileKind::Enemy => match self.enemy {
                Some((ex, ey)) if (ex, ey) != (x, y) => {
                    Err(GridError::AlreadyPlaced { kind, x: ex, y: ey })
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Atomic relocate, keeping the cached positions in step.
    /// Nothing may be moved onto the player; the player itself moves
    /// only from the cell the cache says it occupies.
    pub fn move_tile(&mut self, from: (usize, usize), to: (usize, usize)) -> Result<(), GridError> {
        let moved = self.grid.get(from.0, from.1)?;
        let displaced = self.grid.get(to.0, to.1)?;
        if from == to { return Ok(()); }
        if to == self.player {
            return Err(GridError::PlayerCell { x: to.0, y: to.1 });
        }
        if moved.is(TileKind::Player) != (from == self.player) {
            return Err(GridError::PlayerCell { x: self.player.0, y: self.player.1 });
        }
        self.grid.move_tile(from, to)?;
        if displaced.is(TileKind::Enemy) {
            self.enemy = None;
        }
        match moved.kind {
            TileKind::Enemy => self.enemy = Some(to),
            TileKind::Player => self.player = to,
            _ => {}
        }
        Ok(())
    }

    // ── Freeze ──

    /// Start or extend a freeze. Returns true when the enemy was not
    /// already frozen.
    pub fn trigger_freeze(&mut self, now: Instant, duration: Duration) -> bool {
        let started = self.freeze.trigger(now, duration);
        self.tint_enemy(Tint::Frozen);
        started
    }

    /// Lift the freeze if its deadline has passed.
    pub fn expire_freeze(&mut self, now: Instant) -> bool {
        if !self.freeze.expire_due(now) { return false; }
        self.tint_enemy(Tint::Normal);
        self.set_message("The enemy is moving again");
        true
    }

    fn tint_enemy(&mut self, tint: Tint) {
        let Some((x, y)) = self.enemy else { return };
        if let Ok(mut tile) = self.grid.get(x, y) {
            tile.tint = tint;
            let _ = self.grid.set(x, y, tile);
        }
    }

    pub fn status_line(&self) -> String {
        let mut status = format!("Score: {}/{}", self.score, self.max_score);
        if self.freeze.is_frozen() {
            status.push_str("  FROZEN");
        }
        if !self.message.is_empty() {
            status.push_str("  ");
            status.push_str(&self.message);
        }
        status
    }
}

/// The single exclusion domain around `WorldState`.
pub struct GridStore {
    state: Mutex<WorldState>,
    /// Wakes the freeze expiry timer when the deadline changes or on shutdown.
    timer: Condvar,
}

impl GridStore {
    pub fn new(world: WorldState) -> Self {
        GridStore { state: Mutex::new(world), timer: Condvar::new() }
    }

    /// Scoped acquisition. A panicked holder can't leave the grid half
    /// written (every mutation validates before writing), so poisoning
    /// is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Single-call operations ──
    // Each takes and releases the lock on its own. The actors need
    // find-then-mutate under one guard and go through `lock()` instead.

    #[allow(dead_code)]
    pub fn get(&self, x: usize, y: usize) -> Result<Tile, GridError> {
        self.lock().grid.get(x, y)
    }

    #[allow(dead_code)]
    pub fn set(&self, x: usize, y: usize, tile: Tile) -> Result<(), GridError> {
        self.lock().set_tile(x, y, tile)
    }

    #[allow(dead_code)]
    pub fn move_tile(&self, from: (usize, usize), to: (usize, usize)) -> Result<(), GridError> {
        self.lock().move_tile(from, to)
    }

    #[allow(dead_code)]
    pub fn find_first(&self, pred: impl Fn(Tile) -> bool) -> Result<(usize, usize), GridError> {
        self.lock().grid.find_first(pred)
    }

    /// Consistent copy for rendering. The lock is released before the
    /// caller touches the terminal.
    pub fn snapshot(&self) -> Frame {
        Frame::capture(&self.lock())
    }

    pub(crate) fn notify_timer(&self) {
        self.timer.notify_all();
    }

    pub(crate) fn wait_timer<'a>(&self, guard: MutexGuard<'a, WorldState>) -> MutexGuard<'a, WorldState> {
        self.timer.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_timer_for<'a>(
        &self,
        guard: MutexGuard<'a, WorldState>,
        timeout: Duration,
    ) -> MutexGuard<'a, WorldState> {
        match self.timer.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

#[cfg(test)]
pub(crate) fn world_from(rows: &[&str]) -> WorldState {
    let text = rows.join("\n");
    let map = crate::sim::level::parse_map(&text).expect("test map");
    WorldState::new(map, &FogConfig::default())
}
