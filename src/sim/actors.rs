/// Recurring actors: enemy pursuit and coin drift.
///
/// Each actor is a loop of `step` (one lock acquisition, find + mutate)
/// followed by a cancellable sleep taken outside the lock.
/// Loops end when the game has an outcome or the shutdown token fires.

use log::{debug, info, warn};
use rand::Rng;

use crate::domain::pursuit;
use crate::domain::tile::TileKind;
use crate::error::GridError;
use crate::sim::event::GameEvent;
use crate::sim::world::{Outcome, WorldState};
use crate::sim::Simulation;

/// Whether an actor loop should keep going.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Stop,
}

// ══════════════════════════════════════════════════════════════
// Enemy pursuit
// ══════════════════════════════════════════════════════════════

/// Result of one pursuit step, decided under the lock.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pursuit {
    Moved { x: usize, y: usize },
    Caught,
    Frozen,
    Stuck,
    NoEnemy,
    Over,
}

/// One pursuit decision + move against an already-locked world.
///
/// Capture is checked before any movement: an enemy that shares the
/// player's cell, or whose next step lands on it, ends the game.
pub fn pursuit_step(world: &mut WorldState) -> Pursuit {
    if world.is_over() { return Pursuit::Over; }
    let Some(enemy) = world.enemy else { return Pursuit::NoEnemy };
    let player = world.player;

    if enemy == player {
        world.finish(Outcome::Lost);
        return Pursuit::Caught;
    }
    if world.freeze.is_frozen() { return Pursuit::Frozen; }

    match pursuit::greedy_step(&world.grid, enemy, player) {
        Some(next) if next == player => {
            world.finish(Outcome::Lost);
            Pursuit::Caught
        }
        Some(next) => match world.move_tile(enemy, next) {
            Ok(()) => Pursuit::Moved { x: next.0, y: next.1 },
            Err(e) => {
                warn!("enemy step from {enemy:?} dropped: {e}");
                Pursuit::Stuck
            }
        },
        None => Pursuit::Stuck,
    }
}

pub fn run_pursuit(sim: &Simulation) {
    let interval = sim.timing.enemy_step();
    loop {
        let step = pursuit_step(&mut sim.store.lock());
        let flow = match step {
            Pursuit::Moved { x, y } => {
                debug!("enemy -> ({x}, {y})");
                sim.emit(GameEvent::EnemyMoved { x, y });
                Flow::Continue
            }
            Pursuit::Caught => {
                info!("player caught");
                sim.emit(GameEvent::PlayerCaught);
                Flow::Stop
            }
            Pursuit::Over => Flow::Stop,
            Pursuit::Frozen | Pursuit::Stuck | Pursuit::NoEnemy => Flow::Continue,
        };
        if flow == Flow::Stop || sim.shutdown_token().sleep(interval) {
            break;
        }
    }
    debug!("pursuit actor stopped");
}

// ══════════════════════════════════════════════════════════════
// Coin drift
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Drift {
    Moved,
    Stayed,
    /// Target cell holds something else; coins never overwrite.
    Blocked,
    /// Target is off the grid: an internal inconsistency, logged and dropped.
    Rejected,
}

/// Shift the coin at `from` by `(d, d)`. Diagonal or nothing, never a
/// single axis.
pub fn drift_coin(world: &mut WorldState, from: (usize, usize), d: i64) -> Drift {
    if d == 0 { return Drift::Stayed; }
    let to = match world.grid.offset(from.0, from.1, d, d) {
        Ok(to) => to,
        Err(e) => {
            reject_drift(world, from, e);
            return Drift::Rejected;
        }
    };
    match world.grid.get(to.0, to.1) {
        Ok(tile) if tile.is(TileKind::Empty) => match world.move_tile(from, to) {
            Ok(()) => Drift::Moved,
            Err(e) => {
                reject_drift(world, from, e);
                Drift::Rejected
            }
        },
        _ => Drift::Blocked,
    }
}

/// Count a dropped drift. Only the first one is a warning; coins on an
/// unwalled edge hit this every few passes.
fn reject_drift(world: &mut WorldState, from: (usize, usize), e: GridError) {
    world.rejected_drifts += 1;
    if world.rejected_drifts == 1 {
        warn!("coin drift from {from:?} rejected: {e} (further rejections logged at debug)");
    } else {
        debug!("coin drift from {from:?} rejected: {e}");
    }
}

/// One sweep over every coin present at the start of the pass.
/// Returns how many coins moved.
pub fn drift_pass(world: &mut WorldState, rng: &mut impl Rng) -> usize {
    if world.is_over() { return 0; }
    world
        .grid
        .positions_of(TileKind::Coin)
        .into_iter()
        .filter(|&coin| drift_coin(world, coin, rng.random_range(-1..=1)) == Drift::Moved)
        .count()
}

pub fn run_drift(sim: &Simulation, mut rng: impl Rng) {
    let interval = sim.timing.coin_drift();
    loop {
        let (moved, over) = {
            let mut world = sim.store.lock();
            let moved = drift_pass(&mut world, &mut rng);
            (moved, world.is_over())
        };
        if over { break; }
        if moved > 0 {
            sim.emit(GameEvent::CoinDrifted { moved });
        }
        if sim.shutdown_token().sleep(interval) { break; }
    }
    debug!("drift actor stopped");
}
