/// Player command processor.
///
/// Moves only onto passable cells (empty floor, vegetation). Coins and
/// special tiles block movement and are reached with `interact` instead,
/// which works within a radius-2 neighborhood.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::domain::command::{Command, Direction, INTERACT_MAX_SQ, INTERACT_RADIUS};
use crate::domain::tile::{Tile, TileKind};
use crate::sim::event::GameEvent;
use crate::sim::world::{Outcome, WorldState};
use crate::sim::Simulation;

/// What an interaction did, decided under one lock acquisition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interaction {
    pub picked: Vec<(usize, usize)>,
    pub won: bool,
    /// `Some(true)` for a fresh freeze, `Some(false)` for an extension.
    pub froze: Option<bool>,
}

pub fn apply(sim: &Simulation, command: Command) {
    match command {
        Command::Move(dir) => {
            move_player(sim, dir);
        }
        Command::Interact => {
            interact(sim);
        }
        Command::Quit => {
            sim.finish(Outcome::Quit);
        }
    }
}

/// Apply a move to an already-locked world. Returns the new position.
pub fn step_player(world: &mut WorldState, dir: Direction) -> Option<(usize, usize)> {
    if world.is_over() { return None; }
    let (dx, dy) = dir.delta();
    let from = world.player;
    if !world.grid.get(from.0, from.1).is_ok_and(|t| t.is(TileKind::Player)) {
        warn!("player cache points at {from:?}, which holds no player");
        return None;
    }
    let to = world.grid.offset(from.0, from.1, dx, dy).ok()?;
    if !world.grid.get(to.0, to.1).ok()?.is_passable() { return None; }
    world.move_tile(from, to).ok()?;
    world.reveal_around_player();
    Some(to)
}

pub fn move_player(sim: &Simulation, dir: Direction) -> bool {
    let moved = step_player(&mut sim.store.lock(), dir);
    match moved {
        Some((x, y)) => {
            sim.emit(GameEvent::PlayerMoved { x, y });
            true
        }
        None => {
            debug!("move {dir:?} blocked");
            false
        }
    }
}

/// Pick up every coin in reach, then check for a special tile in reach.
/// The win check runs after each pickup; once won, nothing else happens.
pub fn interact_with(world: &mut WorldState, now: Instant, freeze: Duration) -> Interaction {
    let mut result = Interaction::default();
    if world.is_over() { return result; }

    let (px, py) = world.player;
    let reach = world.grid.cells_near(px, py, INTERACT_RADIUS, INTERACT_MAX_SQ);

    for &(x, y) in &reach {
        let is_coin = world.grid.get(x, y).is_ok_and(|t| t.is(TileKind::Coin));
        if !is_coin || world.set_tile(x, y, Tile::EMPTY).is_err() { continue; }
        world.score += 1;
        world.set_message("Coin collected!");
        result.picked.push((x, y));
        if world.score == world.max_score && world.finish(Outcome::Won) {
            result.won = true;
            return result;
        }
    }

    let special_near = reach
        .iter()
        .any(|&(x, y)| world.grid.get(x, y).is_ok_and(|t| t.is(TileKind::Special)));
    if special_near {
        result.froze = Some(world.trigger_freeze(now, freeze));
        world.set_message("Enemy frozen!");
    }
    result
}

pub fn interact(sim: &Simulation) -> Interaction {
    let result = interact_with(&mut sim.store.lock(), Instant::now(), sim.timing.freeze());

    for &(x, y) in &result.picked {
        sim.emit(GameEvent::CoinPicked { x, y });
    }
    if result.won {
        info!("all coins collected");
        sim.emit(GameEvent::AllCoinsCollected);
    }
    if let Some(fresh) = result.froze {
        sim.store.notify_timer();
        info!("enemy frozen{}", if fresh { "" } else { " (extended)" });
        sim.emit(GameEvent::EnemyFrozen);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FogConfig, TimingConfig};
    use crate::sim::level::parse_map;
    use crate::sim::test_sim;
    use crate::sim::world::world_from;

    const FREEZE: Duration = Duration::from_secs(3);

    #[test]
    fn moves_onto_empty_and_vegetation() {
        let mut w = world_from(&["P ♣"]);
        assert_eq!(step_player(&mut w, Direction::Right), Some((1, 0)));
        assert_eq!(step_player(&mut w, Direction::Right), Some((2, 0)));
        assert!(w.grid.get(0, 0).unwrap().is(TileKind::Empty));
        assert_eq!(w.grid.find_first(|t| t.is(TileKind::Player)), Ok((2, 0)));
    }

    #[test]
    fn coins_specials_walls_block_movement() {
        for blocker in ['$', '*', '=', '#', 'E'] {
            let row = format!("P{blocker}");
            let mut w = world_from(&[row.as_str()]);
            assert_eq!(step_player(&mut w, Direction::Right), None, "walked onto {blocker}");
            assert_eq!(w.player, (0, 0));
        }
    }

    #[test]
    fn stale_player_cache_refuses_to_move() {
        let mut w = world_from(&["P   "]);
        w.player = (1, 0);
        assert_eq!(step_player(&mut w, Direction::Right), None);
        assert_eq!(w.grid.count(TileKind::Player), 1);
        assert!(w.grid.get(0, 0).unwrap().is(TileKind::Player));
    }

    #[test]
    fn edge_of_grid_blocks() {
        let mut w = world_from(&["P"]);
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(step_player(&mut w, dir), None);
        }
    }

    #[test]
    fn exactly_one_player_after_moves() {
        let mut w = world_from(&[
            "======",
            "=P   =",
            "= ♣  =",
            "=    =",
            "======",
        ]);
        let path = [
            Direction::Down, Direction::Right, Direction::Right, Direction::Down,
            Direction::Left, Direction::Up, Direction::Up, Direction::Up, Direction::Right,
        ];
        for dir in path {
            step_player(&mut w, dir);
            assert_eq!(w.grid.count(TileKind::Player), 1);
            assert_eq!(w.grid.find_first(|t| t.is(TileKind::Player)), Ok(w.player));
        }
    }

    #[test]
    fn move_reveals_fog() {
        let map = parse_map("P         ").unwrap();
        let fog = FogConfig { enabled: true, radius: 2 };
        let mut w = WorldState::new(map, &fog);
        assert!(!w.fog.is_revealed(4, 0));
        step_player(&mut w, Direction::Right);
        step_player(&mut w, Direction::Right);
        assert!(w.fog.is_revealed(4, 0));
        assert!(w.fog.is_revealed(0, 0), "revealed cells stay revealed");
    }

    #[test]
    fn interact_picks_coins_in_reach() {
        let mut w = world_from(&[
            "$    ",
            "  P  ",
            "     ",
            "     ",
            "    $",
        ]);
        // (0,0) is at squared distance 5, (4,4) at 13
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(r.picked, vec![(0, 0)]);
        assert_eq!(w.score, 1);
        assert!(!r.won);
        assert!(w.grid.get(4, 4).unwrap().is(TileKind::Coin));
    }

    #[test]
    fn interact_outside_corner_radius_misses() {
        let mut w = world_from(&[
            "   $",
            "    ",
            "    ",
            "P   ",
        ]);
        // dx = 3 is beyond the radius-2 window
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert!(r.picked.is_empty());
        assert_eq!(w.score, 0);
    }

    #[test]
    fn last_coin_wins_once() {
        let mut w = world_from(&["$P$"]);
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(r.picked.len(), 2);
        assert!(r.won);
        assert_eq!(w.outcome, Some(Outcome::Won));
        assert_eq!(w.score, w.max_score);
        let again = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(again, Interaction::default());
    }

    #[test]
    fn special_in_reach_freezes() {
        let mut w = world_from(&["P * E"]);
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(r.froze, Some(true));
        assert!(w.freeze.is_frozen());
        assert!(w.status_line().ends_with("Enemy frozen!"));
        // special tile stays put
        assert_eq!(w.grid.count(TileKind::Special), 1);
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(r.froze, Some(false));
    }

    #[test]
    fn special_out_of_reach_does_nothing() {
        let mut w = world_from(&["P  *E"]);
        let r = interact_with(&mut w, Instant::now(), FREEZE);
        assert_eq!(r.froze, None);
        assert!(!w.freeze.is_frozen());
    }

    #[test]
    fn five_by_five_scenario_wins() {
        // 5x5 with border walls, player at (1,1), one coin at (3,3), no enemy
        let (sim, rx) = test_sim(&[
            "=====",
            "=P  =",
            "=   =",
            "=  $=",
            "=====",
        ], TimingConfig::default());
        assert!(move_player(&sim, Direction::Right));
        assert!(move_player(&sim, Direction::Right));
        assert!(!move_player(&sim, Direction::Right), "wall at (4,1)");
        let r = interact(&sim);
        assert!(r.won);
        assert_eq!(sim.score(), (1, 1));
        assert_eq!(sim.outcome(), Some(Outcome::Won));
        let events: Vec<GameEvent> = rx.try_iter().collect();
        assert_eq!(events.iter().filter(|e| **e == GameEvent::AllCoinsCollected).count(), 1);
        assert!(events.contains(&GameEvent::CoinPicked { x: 3, y: 3 }));
    }

    #[test]
    fn quit_sets_outcome() {
        let (sim, _rx) = test_sim(&["P"], TimingConfig::default());
        apply(&sim, Command::Quit);
        assert_eq!(sim.outcome(), Some(Outcome::Quit));
        apply(&sim, Command::Move(Direction::Right));
        assert_eq!(sim.outcome(), Some(Outcome::Quit));
    }
}
