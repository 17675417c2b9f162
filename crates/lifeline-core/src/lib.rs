//! # LifeLine Core Library
//!
//! This library provides the core business logic for the LifeLine
//! dead-man's-switch safety monitor. A user must periodically confirm they
//! are safe; a missed check-in escalates through a warning grace period
//! into a multi-channel emergency fan-out, optionally followed by a
//! recurring live-location broadcast until an authenticated reset.
//!
//! ## Architecture
//!
//! - **Safety Monitor**: a wall-clock-based state machine
//!   (SAFE/WARNING/EMERGENCY) driven by a periodic `tick()`
//! - **Dispatch Engine**: concurrent per-channel alert fan-out with
//!   simulated carrier latency and partial-failure handling
//! - **Live Tracker**: recurring location broadcast active only during an
//!   emergency
//! - **Collaborator seams**: authentication, text composition, haptics,
//!   notifications, and transport are injected traits; the presentation
//!   layer consumes snapshots and issues intents
//!
//! ## Key Components
//!
//! - [`SafetyMonitor`]: the escalation state machine
//! - [`MonitorService`]: async wrapper driving the 1-second evaluator
//! - [`DispatchEngine`]: emergency alert fan-out
//! - [`ActivityLog`]: append-only record of transitions and dispatches

pub mod auth;
pub mod broadcast;
pub mod clock;
pub mod compose;
pub mod contacts;
pub mod deadline;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod log;
pub mod monitor;
pub mod sensors;
pub mod service;
pub mod settings;

pub use auth::{ApproveAll, Authenticator, DenyAll};
pub use broadcast::{LiveTracker, BROADCAST_PERIOD};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compose::{fallback_alert, Composer, FallbackComposer, HttpComposer, FALLBACK_SAFETY_TIP};
pub use contacts::{Contact, ContactBook, NewContact};
pub use deadline::{DeadlineTracker, Deadlines};
pub use dispatch::{
    AttemptRegistry, Channel, Delivery, DispatchAttempt, DispatchEngine, DispatchOutcome,
    InstantTransport, SimulatedTransport, Transport, TransportError, EMERGENCY_SERVICES,
};
pub use error::{ConfigError, CoreError, ValidationError};
pub use feedback::{Feedback, FeedbackKind, Notifier, NullFeedback, NullNotifier};
pub use log::{ActivityLog, LogEntry};
pub use monitor::{CheckInOutcome, Collaborators, MonitorSnapshot, SafetyMonitor, SafetyState};
pub use sensors::{LocationSample, SensorHub};
pub use service::{MonitorService, TICK_PERIOD};
pub use settings::{EmergencySettings, TimeUnit, MINUTE_MS};
