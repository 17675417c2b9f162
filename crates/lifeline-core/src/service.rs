//! Async wrapper that drives the monitor's periodic evaluation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use uuid::Uuid;

use crate::contacts::{Contact, NewContact};
use crate::error::ValidationError;
use crate::monitor::{CheckInOutcome, MonitorSnapshot, SafetyMonitor};
use crate::sensors::LocationSample;
use crate::settings::EmergencySettings;

/// Period of the escalation evaluator.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns the monitor behind a single-writer lock and drives `tick()` once
/// per second. Ticks cannot overlap: one loop, one lock.
pub struct MonitorService {
    monitor: Arc<Mutex<SafetyMonitor>>,
    ticker: JoinHandle<()>,
}

impl MonitorService {
    /// Move the monitor behind the service and start the tick loop. Must
    /// be called within a tokio runtime.
    pub fn spawn(monitor: SafetyMonitor) -> Self {
        let monitor = Arc::new(Mutex::new(monitor));
        let ticker = tokio::spawn({
            let monitor = Arc::clone(&monitor);
            async move {
                let mut interval = tokio::time::interval(TICK_PERIOD);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    lock(&monitor).tick();
                }
            }
        });
        Self { monitor, ticker }
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn check_in(&self) -> CheckInOutcome {
        lock(&self.monitor).check_in()
    }

    pub fn trigger_sos(&self) {
        lock(&self.monitor).trigger_sos();
    }

    pub fn reset_with_auth(&self) -> bool {
        lock(&self.monitor).reset_with_auth()
    }

    pub fn update_settings(&self, settings: EmergencySettings) -> Result<(), ValidationError> {
        lock(&self.monitor).update_settings(settings)
    }

    pub fn add_contact(&self, new: NewContact) -> Uuid {
        lock(&self.monitor).add_contact(new)
    }

    pub fn edit_contact(&self, updated: Contact) -> Result<(), ValidationError> {
        lock(&self.monitor).edit_contact(updated)
    }

    pub fn remove_contact(&self, id: Uuid) -> Result<Contact, ValidationError> {
        lock(&self.monitor).remove_contact(id)
    }

    // ── Sensor pushes ────────────────────────────────────────────────

    pub fn on_location_sample(&self, sample: LocationSample) {
        lock(&self.monitor).on_location_sample(sample);
    }

    pub fn on_battery_level(&self, fraction: f64) {
        lock(&self.monitor).on_battery_level(fraction);
    }

    pub fn set_voice_note(&self, present: bool) {
        lock(&self.monitor).set_voice_note(present);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> MonitorSnapshot {
        lock(&self.monitor).snapshot()
    }

    /// Stop the evaluator and any live broadcast.
    pub fn shutdown(self) {
        self.ticker.abort();
        lock(&self.monitor).shutdown();
        debug!("monitor service stopped");
    }
}

impl Drop for MonitorService {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

fn lock(monitor: &Arc<Mutex<SafetyMonitor>>) -> MutexGuard<'_, SafetyMonitor> {
    monitor.lock().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::contacts::ContactBook;
    use crate::dispatch::InstantTransport;
    use crate::monitor::{Collaborators, SafetyState};
    use crate::settings::TimeUnit;

    fn test_settings() -> EmergencySettings {
        EmergencySettings {
            check_in_interval_value: 30,
            check_in_interval_unit: TimeUnit::Minutes,
            warning_grace_period_minutes: 60,
            auto_call_police: false,
            live_tracking_enabled: false,
            ..EmergencySettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn tick_loop_escalates_from_manual_clock() {
        let clock = Arc::new(ManualClock::new(0));
        let monitor = SafetyMonitor::new(
            test_settings(),
            ContactBook::new(),
            clock.clone(),
            Collaborators {
                transport: Arc::new(InstantTransport),
                ..Collaborators::default()
            },
        );
        let service = MonitorService::spawn(monitor);

        clock.set(31 * 60_000);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(service.snapshot().state, SafetyState::Warning);

        clock.set(92 * 60_000);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(service.snapshot().state, SafetyState::Emergency);

        service.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn intents_go_through_the_service() {
        let clock = Arc::new(ManualClock::new(0));
        let monitor = SafetyMonitor::new(
            test_settings(),
            ContactBook::new(),
            clock.clone(),
            Collaborators {
                transport: Arc::new(InstantTransport),
                ..Collaborators::default()
            },
        );
        let service = MonitorService::spawn(monitor);

        clock.set(60_000);
        assert_eq!(service.check_in(), CheckInOutcome::Confirmed);
        assert_eq!(
            service.snapshot().deadlines.next_check_in_ms,
            60_000 + 30 * 60_000
        );

        let id = service.add_contact(NewContact {
            name: "Mom".to_string(),
            phone: Some("555-0101".to_string()),
            notify_on_emergency: true,
            enable_sms: true,
            ..NewContact::default()
        });
        assert!(service.remove_contact(id).is_ok());

        service.shutdown();
    }
}
