//! Haptic/notification collaborator seams.
//!
//! Both traits are fire-and-forget: implementations must never fail the
//! caller or block the escalation path.

use serde::{Deserialize, Serialize};

/// Haptic pattern categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Subtle tap, e.g. one dispatch completion.
    Tap,
    /// Medium feedback for important buttons.
    Button,
    /// Unlock or safe check-in.
    Success,
    /// Failed verification.
    Error,
    /// Grace period started.
    Warning,
    /// Emergency entry.
    Sos,
}

pub trait Feedback: Send + Sync {
    fn signal(&self, kind: FeedbackKind);
}

/// Discards all signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn signal(&self, _kind: FeedbackKind) {}
}

/// Local notification sink for the warning-phase alert.
pub trait Notifier: Send + Sync {
    fn push(&self, title: &str, body: &str);
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn push(&self, _title: &str, _body: &str) {}
}
