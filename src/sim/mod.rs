/// Simulation context: the one object every thread shares.
///
/// Built once at startup from a loaded map and the config, shared by `Arc`
/// between the input loop, the two actors and the freeze timer, and torn
/// down with `shutdown()` + `Workers::join()`.

pub mod actors;
pub mod event;
pub mod frame;
pub mod freeze;
pub mod level;
pub mod player;
pub mod shutdown;
pub mod world;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, TimingConfig};
use event::GameEvent;
use frame::Frame;
use level::LoadedMap;
use shutdown::Shutdown;
use world::{GridStore, Outcome, WorldState};

pub struct Simulation {
    pub store: GridStore,
    pub timing: TimingConfig,
    shutdown: Shutdown,
    events: Sender<GameEvent>,
}

impl Simulation {
    pub fn new(map: LoadedMap, config: &GameConfig) -> (Arc<Self>, Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel();
        let sim = Simulation {
            store: GridStore::new(WorldState::new(map, &config.fog)),
            timing: config.timing.clone(),
            shutdown: Shutdown::new(),
            events: tx,
        };
        (Arc::new(sim), rx)
    }

    /// Send an event. A dropped receiver just means nobody is drawing.
    pub fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.store.lock().outcome
    }

    /// Record a terminal outcome (first one wins).
    pub fn finish(&self, outcome: Outcome) -> bool {
        let finished = self.store.lock().finish(outcome);
        if finished {
            info!("game over: {outcome:?}");
        }
        finished
    }

    pub fn score(&self) -> (usize, usize) {
        let world = self.store.lock();
        (world.score, world.max_score)
    }

    pub fn snapshot(&self) -> Frame {
        self.store.snapshot()
    }

    pub fn shutdown_token(&self) -> &Shutdown {
        &self.shutdown
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel every worker. The store lock is taken around the timer
    /// notification so the freeze timer can't miss it between its
    /// cancellation check and its wait.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let _world = self.store.lock();
        self.store.notify_timer();
    }

    /// Start the enemy pursuit actor, the coin drift actor and the
    /// freeze expiry timer.
    pub fn spawn_workers(self: &Arc<Self>) -> std::io::Result<Workers> {
        let mut handles = Vec::with_capacity(3);

        let sim = Arc::clone(self);
        handles.push(thread::Builder::new()
            .name("enemy-pursuit".into())
            .spawn(move || actors::run_pursuit(&sim))?);

        let sim = Arc::clone(self);
        handles.push(thread::Builder::new()
            .name("coin-drift".into())
            .spawn(move || actors::run_drift(&sim, StdRng::from_os_rng()))?);

        let sim = Arc::clone(self);
        handles.push(thread::Builder::new()
            .name("freeze-timer".into())
            .spawn(move || freeze::run_expiry_timer(&sim))?);

        Ok(Workers { handles })
    }
}

/// Join handles for the background threads.
pub struct Workers {
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    /// Wait for every worker. Call after `Simulation::shutdown()`.
    pub fn join(self) {
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!("{name} thread panicked");
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_sim(rows: &[&str], timing: TimingConfig) -> (Arc<Simulation>, Receiver<GameEvent>) {
    let map = level::parse_map(&rows.join("\n")).expect("test map");
    let config = GameConfig { timing, ..GameConfig::default() };
    Simulation::new(map, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            enemy_step_ms: 10,
            coin_drift_ms: 10,
            freeze_ms: 50,
            win_pause_ms: 0,
            input_poll_ms: 10,
        }
    }

    #[test]
    fn workers_stop_on_shutdown() {
        let (sim, _rx) = test_sim(&[
            "==========",
            "=P     $ =",
            "=      * =",
            "=       E=",
            "==========",
        ], fast_timing());
        let workers = sim.spawn_workers().unwrap();
        thread::sleep(Duration::from_millis(30));
        sim.shutdown();
        // join returns only if all three threads observed the cancellation
        workers.join();
        assert!(sim.is_cancelled());
    }

    #[test]
    fn enemy_catches_idle_player() {
        let (sim, rx) = test_sim(&[
            "=======",
            "=P   E=",
            "=======",
        ], fast_timing());
        let workers = sim.spawn_workers().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut caught = false;
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match rx.recv_timeout(left) {
                Ok(GameEvent::PlayerCaught) => { caught = true; break; }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        sim.shutdown();
        workers.join();
        assert!(caught);
        assert_eq!(sim.outcome(), Some(Outcome::Lost));
    }

    #[test]
    fn finish_keeps_first_outcome() {
        let (sim, _rx) = test_sim(&["P"], fast_timing());
        assert!(sim.finish(Outcome::Quit));
        assert!(!sim.finish(Outcome::Won));
        assert_eq!(sim.outcome(), Some(Outcome::Quit));
    }
}
