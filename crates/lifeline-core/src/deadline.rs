//! Check-in and escalation deadlines.

use serde::{Deserialize, Serialize};

use crate::settings::EmergencySettings;

/// Absolute deadlines in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadlines {
    /// When the user must next check in. Meaning differs by state: "check
    /// in by" while SAFE, frozen at its missed value during WARNING.
    pub next_check_in_ms: u64,
    /// When WARNING escalates to EMERGENCY; armed only during WARNING.
    pub emergency_ms: Option<u64>,
}

/// Owns deadline arithmetic; recomputed on check-in, reset, and interval
/// changes while SAFE.
#[derive(Debug, Clone)]
pub struct DeadlineTracker {
    deadlines: Deadlines,
}

impl DeadlineTracker {
    /// Start tracking with a freshly armed check-in deadline.
    pub fn new(now_ms: u64, settings: &EmergencySettings) -> Self {
        Self {
            deadlines: Deadlines {
                next_check_in_ms: now_ms.saturating_add(settings.interval_ms()),
                emergency_ms: None,
            },
        }
    }

    /// Re-arm the check-in deadline from `now`.
    pub fn arm(&mut self, now_ms: u64, settings: &EmergencySettings) -> u64 {
        let deadline = now_ms.saturating_add(settings.interval_ms());
        self.deadlines.next_check_in_ms = deadline;
        deadline
    }

    /// Arm the emergency deadline at `now + grace`. Frozen once set:
    /// settings edits during WARNING do not move it.
    pub fn enter_warning(&mut self, now_ms: u64, settings: &EmergencySettings) -> u64 {
        let deadline = now_ms.saturating_add(settings.grace_ms());
        self.deadlines.emergency_ms = Some(deadline);
        deadline
    }

    /// Drop the emergency deadline without touching the check-in deadline.
    pub fn disarm_emergency(&mut self) {
        self.deadlines.emergency_ms = None;
    }

    /// Leave the warning/emergency path: drop the emergency deadline and
    /// re-arm the check-in deadline from `now`.
    pub fn clear(&mut self, now_ms: u64, settings: &EmergencySettings) {
        self.deadlines.emergency_ms = None;
        self.arm(now_ms, settings);
    }

    pub fn deadlines(&self) -> Deadlines {
        self.deadlines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TimeUnit;

    fn settings(interval_min: u64, grace_min: u64) -> EmergencySettings {
        EmergencySettings {
            check_in_interval_value: interval_min,
            check_in_interval_unit: TimeUnit::Minutes,
            warning_grace_period_minutes: grace_min,
            ..EmergencySettings::default()
        }
    }

    #[test]
    fn arm_sets_now_plus_interval() {
        let s = settings(30, 60);
        let mut tracker = DeadlineTracker::new(1_000, &s);
        assert_eq!(tracker.deadlines().next_check_in_ms, 1_000 + 30 * 60_000);
        assert_eq!(tracker.deadlines().emergency_ms, None);

        tracker.arm(5_000, &s);
        assert_eq!(tracker.deadlines().next_check_in_ms, 5_000 + 30 * 60_000);
    }

    #[test]
    fn enter_warning_derives_from_grace() {
        let s = settings(30, 60);
        let mut tracker = DeadlineTracker::new(0, &s);
        let deadline = tracker.enter_warning(2_000, &s);
        assert_eq!(deadline, 2_000 + 60 * 60_000);
        assert_eq!(tracker.deadlines().emergency_ms, Some(deadline));
        // Check-in deadline is untouched (frozen by the caller's state).
        assert_eq!(tracker.deadlines().next_check_in_ms, 30 * 60_000);
    }

    #[test]
    fn clear_drops_emergency_and_rearms() {
        let s = settings(30, 60);
        let mut tracker = DeadlineTracker::new(0, &s);
        tracker.enter_warning(1_000, &s);
        tracker.clear(10_000, &s);
        assert_eq!(tracker.deadlines().emergency_ms, None);
        assert_eq!(tracker.deadlines().next_check_in_ms, 10_000 + 30 * 60_000);
    }
}
