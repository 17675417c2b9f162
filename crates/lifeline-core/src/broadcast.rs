//! Live-tracking broadcaster.
//!
//! While an emergency is active and tracking is enabled, the last known
//! location is broadcast immediately and then on a fixed period. Stopping
//! aborts the schedule before the cancelling transition completes, and at
//! most one schedule ever runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::log::ActivityLog;
use crate::monitor::SafetyState;
use crate::sensors::SensorHub;

/// Interval between location broadcasts.
pub const BROADCAST_PERIOD: Duration = Duration::from_secs(30);

/// Recurring location broadcast, active only during an emergency.
pub struct LiveTracker {
    sensors: Arc<SensorHub>,
    log: Arc<ActivityLog>,
    handle: Option<JoinHandle<()>>,
}

impl LiveTracker {
    pub fn new(sensors: Arc<SensorHub>, log: Arc<ActivityLog>) -> Self {
        Self {
            sensors,
            log,
            handle: None,
        }
    }

    /// Begin broadcasting: one emission now, then one per period. A running
    /// schedule is replaced, never duplicated. Must be called within a
    /// tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        let sensors = Arc::clone(&self.sensors);
        let log = Arc::clone(&self.log);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(BROADCAST_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                // No fix yet: skip this tick but stay armed.
                if let Some(location) = sensors.location() {
                    log.append(
                        SafetyState::Emergency,
                        format!(
                            "Live Location Sent: {:.5}, {:.5}",
                            location.latitude, location.longitude
                        ),
                    );
                }
            }
        }));
        debug!("live tracking started");
    }

    /// Cancel the schedule. No broadcast is observed after this returns.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("live tracking stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for LiveTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sensors::LocationSample;

    fn tracker() -> (LiveTracker, Arc<SensorHub>, Arc<ActivityLog>) {
        let sensors = Arc::new(SensorHub::new());
        let log = Arc::new(ActivityLog::new(Arc::new(ManualClock::new(0))));
        (
            LiveTracker::new(Arc::clone(&sensors), Arc::clone(&log)),
            sensors,
            log,
        )
    }

    fn broadcasts(log: &ActivityLog) -> usize {
        log.snapshot()
            .iter()
            .filter(|e| e.message.starts_with("Live Location Sent"))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn broadcasts_immediately_then_on_period() {
        let (mut tracker, sensors, log) = tracker();
        sensors.on_location_sample(LocationSample {
            latitude: 10.0,
            longitude: 20.0,
            accuracy: 5.0,
            sampled_at_ms: 0,
        });

        tracker.start();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(broadcasts(&log), 1);

        tokio::time::sleep(BROADCAST_PERIOD).await;
        assert_eq!(broadcasts(&log), 2);

        tracker.stop();
        tokio::time::sleep(BROADCAST_PERIOD * 2).await;
        assert_eq!(broadcasts(&log), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_location_skips_tick_but_stays_armed() {
        let (mut tracker, sensors, log) = tracker();
        tracker.start();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(broadcasts(&log), 0);

        sensors.on_location_sample(LocationSample {
            latitude: 1.0,
            longitude: 2.0,
            accuracy: 5.0,
            sampled_at_ms: 0,
        });
        tokio::time::sleep(BROADCAST_PERIOD).await;
        assert_eq!(broadcasts(&log), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_schedule() {
        let (mut tracker, sensors, log) = tracker();
        sensors.on_location_sample(LocationSample {
            latitude: 1.0,
            longitude: 2.0,
            accuracy: 5.0,
            sampled_at_ms: 0,
        });

        tracker.start();
        tokio::time::sleep(Duration::from_millis(5)).await;
        tracker.start();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(broadcasts(&log), 2);

        // Only the replacement schedule keeps ticking.
        tokio::time::sleep(BROADCAST_PERIOD).await;
        assert_eq!(broadcasts(&log), 3);
    }
}
