//! Track unsaved changes of a persisted entity.

use crate::log;

/// Autosave timing shared by all tracked entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Autosave {
    /// How long an entity must stay untouched before it gets saved.
    pub window_ms: u32,
    /// Failed attempts after which saving is suspended.
    pub max_retries: u8,
}

impl Default for Autosave {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_retries: 3,
        }
    }
}

/// Dirty flag with a timer and a bounded retry counter.
///
/// Once the retries run out, the entity stays dirty but is not offered for
/// saving again until it gets mutated. The change is never dropped, it just
/// stops hammering a failing store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyTracker {
    dirty: bool,
    since: u32,
    retries: u8,
}

impl DirtyTracker {
    /// Record a mutation. This restarts both the timer and the retries.
    pub fn mark(&mut self, now: u32) {
        self.dirty = true;
        self.since = now;
        self.retries = 0;
    }

    /// Whether an autosave attempt should be made now.
    #[must_use]
    pub fn due(&self, now: u32, autosave: Autosave) -> bool {
        self.dirty
            && self.retries < autosave.max_retries
            && now.wrapping_sub(self.since) >= autosave.window_ms
    }

    pub fn saved(&mut self) {
        self.dirty = false;
        self.retries = 0;
    }

    /// Count a failed autosave and wait another window before the next one.
    pub fn failed(&mut self, now: u32, autosave: Autosave) {
        self.retries = self.retries.saturating_add(1).min(autosave.max_retries);
        self.since = now;
        if self.retries >= autosave.max_retries {
            log::warning!("Giving up autosave after {} attempts", self.retries);
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn retries(&self) -> u8 {
        self.retries
    }

    #[must_use]
    pub fn is_suspended(&self, autosave: Autosave) -> bool {
        self.dirty && self.retries >= autosave.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTOSAVE: Autosave = Autosave {
        window_ms: 1000,
        max_retries: 3,
    };

    #[test]
    fn clean_tracker_is_never_due() {
        let tracker = DirtyTracker::default();
        assert!(!tracker.due(100_000, AUTOSAVE));
    }

    #[test]
    fn when_marked_it_becomes_due_after_the_window() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(500);
        assert!(!tracker.due(1499, AUTOSAVE));
        assert!(tracker.due(1500, AUTOSAVE));
    }

    #[test]
    fn every_mutation_restarts_the_window() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(0);
        tracker.mark(900);
        assert!(!tracker.due(1000, AUTOSAVE));
        assert!(tracker.due(1900, AUTOSAVE));
    }

    #[test]
    fn when_saved_it_is_clean() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(0);
        tracker.saved();
        assert!(!tracker.is_dirty());
        assert!(!tracker.due(10_000, AUTOSAVE));
    }

    #[test]
    fn failure_rearms_the_timer() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(0);
        tracker.failed(1000, AUTOSAVE);
        assert!(!tracker.due(1500, AUTOSAVE));
        assert!(tracker.due(2000, AUTOSAVE));
    }

    #[test]
    fn when_retries_run_out_it_stays_dirty_but_is_not_due() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(0);
        let mut now = 0;
        for _ in 0..3 {
            now += 1000;
            assert!(tracker.due(now, AUTOSAVE));
            tracker.failed(now, AUTOSAVE);
        }

        assert!(tracker.is_dirty());
        assert!(tracker.is_suspended(AUTOSAVE));
        assert_eq!(tracker.retries(), 3);
        assert!(!tracker.due(now + 1_000_000, AUTOSAVE));
    }

    #[test]
    fn new_mutation_resumes_suspended_autosave() {
        let mut tracker = DirtyTracker::default();
        tracker.mark(0);
        for i in 1..=3 {
            tracker.failed(i * 1000, AUTOSAVE);
        }

        tracker.mark(10_000);

        assert_eq!(tracker.retries(), 0);
        assert!(tracker.due(11_000, AUTOSAVE));
    }
}
