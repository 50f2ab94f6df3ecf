/// Cancellation token shared by the worker threads.
///
/// Actors sleep through `sleep()`, which returns as soon as the token is
/// cancelled, so shutdown never waits out a full step interval.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct Shutdown {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` unless cancelled first.
    /// Returns true if the token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if *cancelled { return true; }
            let now = Instant::now();
            if now >= deadline { return false; }
            cancelled = match self.wake.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn sleep_runs_full_duration_when_not_cancelled() {
        let s = Shutdown::new();
        let t0 = Instant::now();
        assert!(!s.sleep(Duration::from_millis(30)));
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_wakes_sleeper_early() {
        let s = Arc::new(Shutdown::new());
        let sleeper = {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                let t0 = Instant::now();
                let cancelled = s.sleep(Duration::from_secs(30));
                (cancelled, t0.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        s.cancel();
        let (cancelled, waited) = sleeper.join().unwrap();
        assert!(cancelled);
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn sleep_after_cancel_returns_immediately() {
        let s = Shutdown::new();
        s.cancel();
        assert!(s.is_cancelled());
        assert!(s.sleep(Duration::from_secs(30)));
    }
}
