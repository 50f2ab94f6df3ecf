/// Freeze expiry timer.
///
/// One long-lived thread per simulation. It sleeps on the store's condvar
/// until the current deadline, so a re-trigger just moves the deadline and
/// wakes it; there is never more than one pending expiry.

use std::time::Instant;

use log::{debug, info};

use crate::sim::event::GameEvent;
use crate::sim::Simulation;

pub fn run_expiry_timer(sim: &Simulation) {
    let mut world = sim.store.lock();
    loop {
        // Checked under the lock; `Simulation::shutdown` notifies under it too.
        if sim.is_cancelled() { break; }
        match world.freeze.deadline() {
            None => world = sim.store.wait_timer(world),
            Some(deadline) => {
                let now = Instant::now();
                if world.expire_freeze(now) {
                    info!("freeze expired");
                    sim.emit(GameEvent::FreezeExpired);
                } else {
                    world = sim.store.wait_timer_for(world, deadline.saturating_duration_since(now));
                }
            }
        }
    }
    debug!("freeze timer stopped");
}
