//! Escalation state machine.
//!
//! `SafetyMonitor` owns the authoritative state, the deadlines, and every
//! transition. Callers drive it through intent methods and the periodic
//! `tick()`; dispatch and broadcast tasks only ever write to the activity
//! log and the attempt registry, never back into the monitor.
//!
//! ## State Transitions
//!
//! ```text
//! Safe -> Warning -> Emergency -> Safe (authenticated reset only)
//!   \________ SOS _______/^
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{Authenticator, DenyAll};
use crate::broadcast::LiveTracker;
use crate::clock::Clock;
use crate::compose::{Composer, FallbackComposer};
use crate::contacts::{Contact, ContactBook, NewContact};
use crate::deadline::{DeadlineTracker, Deadlines};
use crate::dispatch::{
    AttemptRegistry, DispatchAttempt, DispatchEngine, SimulatedTransport, Transport,
};
use crate::error::ValidationError;
use crate::feedback::{Feedback, FeedbackKind, Notifier, NullFeedback, NullNotifier};
use crate::log::{ActivityLog, LogEntry};
use crate::sensors::{LocationSample, SensorHub};
use crate::settings::EmergencySettings;

/// Authoritative safety state. Exactly one value is current; the lock
/// screen of the presentation layer is not a core state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyState {
    Safe,
    Warning,
    Emergency,
}

impl fmt::Display for SafetyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyState::Safe => write!(f, "SAFE"),
            SafetyState::Warning => write!(f, "WARNING"),
            SafetyState::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

/// Outcome of a check-in intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// Deadline re-armed; state is SAFE.
    Confirmed,
    /// The monitor is in EMERGENCY; reset requires authentication.
    AuthenticationRequired,
}

/// External collaborators wired into the monitor.
pub struct Collaborators {
    pub composer: Arc<dyn Composer>,
    pub transport: Arc<dyn Transport>,
    pub feedback: Arc<dyn Feedback>,
    pub notifier: Arc<dyn Notifier>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            composer: Arc::new(FallbackComposer),
            transport: Arc::new(SimulatedTransport::new()),
            feedback: Arc::new(NullFeedback),
            notifier: Arc::new(NullNotifier),
            authenticator: Arc::new(DenyAll),
        }
    }
}

/// Read-only view for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub state: SafetyState,
    pub deadlines: Deadlines,
    /// Newest-first.
    pub logs: Vec<LogEntry>,
    pub attempts: Vec<DispatchAttempt>,
    pub location: Option<LocationSample>,
    pub battery: f64,
    pub live_tracking_active: bool,
}

pub struct SafetyMonitor {
    state: SafetyState,
    tracker: DeadlineTracker,
    settings: EmergencySettings,
    contacts: ContactBook,
    clock: Arc<dyn Clock>,
    log: Arc<ActivityLog>,
    sensors: Arc<SensorHub>,
    registry: Arc<AttemptRegistry>,
    dispatch: DispatchEngine,
    live: LiveTracker,
    feedback: Arc<dyn Feedback>,
    notifier: Arc<dyn Notifier>,
    authenticator: Arc<dyn Authenticator>,
}

impl SafetyMonitor {
    /// Start monitoring in SAFE with a freshly armed check-in deadline.
    pub fn new(
        settings: EmergencySettings,
        contacts: ContactBook,
        clock: Arc<dyn Clock>,
        collaborators: Collaborators,
    ) -> Self {
        let log = Arc::new(ActivityLog::new(Arc::clone(&clock)));
        let sensors = Arc::new(SensorHub::new());
        let registry = Arc::new(AttemptRegistry::new());
        let dispatch = DispatchEngine::new(
            Arc::clone(&registry),
            Arc::clone(&log),
            Arc::clone(&sensors),
            collaborators.transport,
            collaborators.composer,
            Arc::clone(&collaborators.feedback),
        );
        let live = LiveTracker::new(Arc::clone(&sensors), Arc::clone(&log));
        let tracker = DeadlineTracker::new(clock.now_ms(), &settings);
        Self {
            state: SafetyState::Safe,
            tracker,
            settings,
            contacts,
            clock,
            log,
            sensors,
            registry,
            dispatch,
            live,
            feedback: collaborators.feedback,
            notifier: collaborators.notifier,
            authenticator: collaborators.authenticator,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SafetyState {
        self.state
    }

    pub fn deadlines(&self) -> Deadlines {
        self.tracker.deadlines()
    }

    pub fn settings(&self) -> &EmergencySettings {
        &self.settings
    }

    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            state: self.state,
            deadlines: self.tracker.deadlines(),
            logs: self.log.snapshot(),
            attempts: self.registry.snapshot(),
            location: self.sensors.location(),
            battery: self.sensors.battery(),
            live_tracking_active: self.live.is_active(),
        }
    }

    // ── Periodic evaluation ──────────────────────────────────────────

    /// Evaluate deadlines against the clock. Comparisons are strict: a
    /// tick landing exactly on a deadline does not escalate. EMERGENCY is
    /// a sink for the tick; nothing re-triggers.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        match self.state {
            SafetyState::Safe => {
                if now > self.tracker.deadlines().next_check_in_ms {
                    self.enter_warning(now);
                }
            }
            SafetyState::Warning => {
                if let Some(deadline) = self.tracker.deadlines().emergency_ms {
                    if now > deadline {
                        self.enter_emergency();
                    }
                }
            }
            SafetyState::Emergency => {}
        }
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// User confirms they are safe. Allowed without authentication from
    /// SAFE and WARNING only.
    pub fn check_in(&mut self) -> CheckInOutcome {
        self.feedback.signal(FeedbackKind::Button);
        if self.state == SafetyState::Emergency {
            return CheckInOutcome::AuthenticationRequired;
        }
        self.perform_reset("Routine Check-in Confirmed");
        CheckInOutcome::Confirmed
    }

    /// EMERGENCY -> SAFE, gated on the authentication collaborator.
    /// Returns whether the reset happened.
    pub fn reset_with_auth(&mut self) -> bool {
        if self.state != SafetyState::Emergency {
            // Nothing to verify outside EMERGENCY; same as a check-in.
            self.check_in();
            return true;
        }
        if !self.authenticator.authenticate() {
            self.feedback.signal(FeedbackKind::Error);
            return false;
        }
        self.perform_reset("Emergency Reset: User marked Safe");
        true
    }

    /// User-initiated SOS: enters EMERGENCY from any state, bypassing all
    /// deadlines.
    pub fn trigger_sos(&mut self) {
        self.feedback.signal(FeedbackKind::Button);
        self.enter_emergency();
    }

    /// Replace the settings. Interval changes re-arm the check-in deadline
    /// while SAFE; an already armed emergency deadline stays frozen.
    pub fn update_settings(&mut self, settings: EmergencySettings) -> Result<(), ValidationError> {
        settings.validate()?;
        let interval_changed = settings.interval_ms() != self.settings.interval_ms();
        self.settings = settings;
        match self.state {
            SafetyState::Safe if interval_changed => {
                self.tracker.arm(self.clock.now_ms(), &self.settings);
            }
            SafetyState::Emergency => {
                // Broadcast activity follows the toggle immediately.
                if self.settings.live_tracking_enabled {
                    if !self.live.is_active() {
                        self.live.start();
                    }
                } else {
                    self.live.stop();
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn add_contact(&mut self, new: NewContact) -> Uuid {
        self.contacts.add(new)
    }

    pub fn edit_contact(&mut self, updated: Contact) -> Result<(), ValidationError> {
        self.contacts.edit(updated)
    }

    pub fn remove_contact(&mut self, id: Uuid) -> Result<Contact, ValidationError> {
        self.contacts.remove(id)
    }

    // ── Sensor pushes ────────────────────────────────────────────────

    pub fn on_location_sample(&self, sample: LocationSample) {
        self.sensors.on_location_sample(sample);
    }

    pub fn on_battery_level(&self, fraction: f64) {
        self.sensors.on_battery_level(fraction);
    }

    pub fn set_voice_note(&self, present: bool) {
        self.sensors.set_voice_note(present);
    }

    /// Stop background work. Called by the service on shutdown.
    pub fn shutdown(&mut self) {
        self.live.stop();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_warning(&mut self, now: u64) {
        self.state = SafetyState::Warning;
        let deadline = self.tracker.enter_warning(now, &self.settings);
        self.log.append(
            SafetyState::Warning,
            "Check-in deadline missed. Warning Phase started.",
        );
        self.notifier.push(
            "LifeLine Alert",
            "Please check in! Emergency contacts will be notified soon.",
        );
        self.feedback.signal(FeedbackKind::Warning);
        info!(deadline, "entered WARNING");
    }

    fn enter_emergency(&mut self) {
        self.state = SafetyState::Emergency;
        self.tracker.disarm_emergency();
        self.log.append(
            SafetyState::Emergency,
            "SOS Triggered. Emergency protocols initiated.",
        );
        self.feedback.signal(FeedbackKind::Sos);
        let attempts = self.dispatch.fire(&self.contacts, &self.settings);
        if self.settings.live_tracking_enabled {
            self.live.start();
        } else {
            self.live.stop();
        }
        info!(attempts, "entered EMERGENCY");
    }

    fn perform_reset(&mut self, message: &str) {
        let now = self.clock.now_ms();
        self.state = SafetyState::Safe;
        self.tracker.clear(now, &self.settings);
        self.live.stop();
        self.log.append(SafetyState::Safe, message);
        self.feedback.signal(FeedbackKind::Success);
        info!("reset to SAFE");
    }
}
