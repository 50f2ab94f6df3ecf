/// Freeze state machine: `Idle -> Active(deadline) -> Idle`.
///
/// Pure transitions on explicit instants. The timer that drives
/// `expire_due` lives in `sim::freeze`.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreezeState {
    #[default]
    Idle,
    Active { deadline: Instant },
}

impl FreezeState {
    pub fn is_frozen(&self) -> bool {
        matches!(self, FreezeState::Active { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            FreezeState::Active { deadline } => Some(*deadline),
            FreezeState::Idle => None,
        }
    }

    /// Freeze until `now + duration`. A trigger while already active
    /// replaces the old deadline, so there is only ever one pending expiry.
    /// Returns true when this trigger started a new freeze.
    pub fn trigger(&mut self, now: Instant, duration: Duration) -> bool {
        let was_idle = !self.is_frozen();
        *self = FreezeState::Active { deadline: now + duration };
        was_idle
    }

    /// Go idle if the deadline has passed. Returns true on that transition.
    pub fn expire_due(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                *self = FreezeState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUR: Duration = Duration::from_secs(3);

    #[test]
    fn starts_idle() {
        let f = FreezeState::default();
        assert!(!f.is_frozen());
        assert_eq!(f.deadline(), None);
    }

    #[test]
    fn trigger_freezes_until_deadline() {
        let t0 = Instant::now();
        let mut f = FreezeState::default();
        assert!(f.trigger(t0, DUR));
        assert!(f.is_frozen());
        assert!(!f.expire_due(t0 + DUR - Duration::from_millis(1)));
        assert!(f.is_frozen());
        assert!(f.expire_due(t0 + DUR));
        assert!(!f.is_frozen());
    }

    #[test]
    fn retrigger_supersedes_deadline() {
        let t0 = Instant::now();
        let mut f = FreezeState::default();
        f.trigger(t0, DUR);
        let t1 = t0 + Duration::from_secs(2);
        assert!(!f.trigger(t1, DUR), "retrigger is not a new freeze");
        assert_eq!(f.deadline(), Some(t1 + DUR));
        // the first deadline no longer expires anything
        assert!(!f.expire_due(t0 + DUR));
        assert!(f.expire_due(t1 + DUR));
    }

    #[test]
    fn expiry_happens_once() {
        let t0 = Instant::now();
        let mut f = FreezeState::default();
        f.trigger(t0, DUR);
        assert!(f.expire_due(t0 + DUR));
        assert!(!f.expire_due(t0 + DUR * 2));
    }
}
