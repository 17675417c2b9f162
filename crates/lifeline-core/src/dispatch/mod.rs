//! Emergency dispatch fan-out.
//!
//! Entering EMERGENCY produces one fan-out: every eligible contact channel
//! plus, optionally, emergency services. Attempts are registered as pending
//! before `fire` returns, then complete concurrently after carrier latency.
//! Completions write only to the attempt registry and the activity log;
//! nothing here feeds back into escalation.

mod transport;

pub use transport::{
    InstantTransport, SimulatedTransport, Transport, TransportError, DEFAULT_LATENCY_MS,
};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::compose::Composer;
use crate::contacts::ContactBook;
use crate::feedback::{Feedback, FeedbackKind};
use crate::log::ActivityLog;
use crate::monitor::SafetyState;
use crate::sensors::SensorHub;
use crate::settings::EmergencySettings;

/// Fixed emergency-services address used by auto-call.
pub const EMERGENCY_SERVICES: &str = "911";

/// Body carried by a CALL attempt instead of the full alert text.
const CALL_SCRIPT: &str = "Automated alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Sms,
    Email,
    Call,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => write!(f, "SMS"),
            Channel::Email => write!(f, "EMAIL"),
            Channel::Call => write!(f, "CALL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOutcome {
    Pending,
    Sent,
    Failed,
}

/// One channel send to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchAttempt {
    pub id: Uuid,
    pub channel: Channel,
    pub recipient: String,
    pub has_attachment: bool,
    pub outcome: DispatchOutcome,
}

/// Body selection made at planning time, before the alert text exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    /// Full composed alert text.
    AlertText,
    /// Short automated-call marker.
    CallScript,
}

#[derive(Debug, Clone)]
struct PlannedAttempt {
    id: Uuid,
    channel: Channel,
    recipient: String,
    has_attachment: bool,
    payload: PayloadKind,
}

/// Resolved send handed to the transport.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: Uuid,
    pub channel: Channel,
    pub recipient: String,
    pub has_attachment: bool,
    pub message: String,
}

/// Shared record of every attempt's lifecycle. Terminal outcomes are
/// immutable.
#[derive(Default)]
pub struct AttemptRegistry {
    attempts: Mutex<Vec<DispatchAttempt>>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, planned: &[PlannedAttempt]) {
        let mut attempts = self.lock();
        for plan in planned {
            attempts.push(DispatchAttempt {
                id: plan.id,
                channel: plan.channel,
                recipient: plan.recipient.clone(),
                has_attachment: plan.has_attachment,
                outcome: DispatchOutcome::Pending,
            });
        }
    }

    fn complete(&self, id: Uuid, outcome: DispatchOutcome) {
        let mut attempts = self.lock();
        if let Some(attempt) = attempts.iter_mut().find(|a| a.id == id) {
            if attempt.outcome == DispatchOutcome::Pending {
                attempt.outcome = outcome;
            }
        }
    }

    pub fn snapshot(&self) -> Vec<DispatchAttempt> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DispatchAttempt>> {
        self.attempts.lock().unwrap_or_else(|err| err.into_inner())
    }
}

fn present(field: &Option<String>) -> Option<&String> {
    field.as_ref().filter(|value| !value.is_empty())
}

/// Build the attempt list for one emergency entry.
fn plan_fanout(
    contacts: &ContactBook,
    auto_call_police: bool,
    voice_attached: bool,
) -> Vec<PlannedAttempt> {
    let mut planned = Vec::new();
    for contact in contacts.contacts() {
        if !contact.notify_on_emergency {
            continue;
        }
        if contact.enable_sms {
            if let Some(phone) = present(&contact.phone) {
                planned.push(PlannedAttempt {
                    id: Uuid::new_v4(),
                    channel: Channel::Sms,
                    recipient: phone.clone(),
                    has_attachment: voice_attached,
                    payload: PayloadKind::AlertText,
                });
            }
        }
        if contact.enable_email {
            if let Some(email) = present(&contact.email) {
                planned.push(PlannedAttempt {
                    id: Uuid::new_v4(),
                    channel: Channel::Email,
                    recipient: email.clone(),
                    has_attachment: voice_attached,
                    payload: PayloadKind::AlertText,
                });
            }
        }
        // A reachable phone always gets the automated call, independent of
        // the SMS/email opt-ins.
        if let Some(phone) = present(&contact.phone) {
            planned.push(PlannedAttempt {
                id: Uuid::new_v4(),
                channel: Channel::Call,
                recipient: phone.clone(),
                has_attachment: voice_attached,
                payload: PayloadKind::CallScript,
            });
        }
    }
    if auto_call_police {
        planned.push(PlannedAttempt {
            id: Uuid::new_v4(),
            channel: Channel::Call,
            recipient: EMERGENCY_SERVICES.to_string(),
            has_attachment: voice_attached,
            payload: PayloadKind::CallScript,
        });
        planned.push(PlannedAttempt {
            id: Uuid::new_v4(),
            channel: Channel::Sms,
            recipient: EMERGENCY_SERVICES.to_string(),
            has_attachment: false,
            payload: PayloadKind::AlertText,
        });
    }
    planned
}

/// Fans out one emergency alert across channels and reports outcomes.
pub struct DispatchEngine {
    registry: Arc<AttemptRegistry>,
    log: Arc<ActivityLog>,
    sensors: Arc<SensorHub>,
    transport: Arc<dyn Transport>,
    composer: Arc<dyn Composer>,
    feedback: Arc<dyn Feedback>,
}

impl DispatchEngine {
    pub fn new(
        registry: Arc<AttemptRegistry>,
        log: Arc<ActivityLog>,
        sensors: Arc<SensorHub>,
        transport: Arc<dyn Transport>,
        composer: Arc<dyn Composer>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        Self {
            registry,
            log,
            sensors,
            transport,
            composer,
            feedback,
        }
    }

    /// Fire the fan-out for one EMERGENCY entry, returning the number of
    /// attempts planned.
    ///
    /// Attempts are visible as pending before this returns; composition and
    /// delivery run on spawned tasks. Must be called within a tokio runtime.
    pub fn fire(&self, contacts: &ContactBook, settings: &EmergencySettings) -> usize {
        let planned = plan_fanout(
            contacts,
            settings.auto_call_police,
            self.sensors.voice_note(),
        );
        if planned.is_empty() {
            self.log.append(
                SafetyState::Emergency,
                "No active contacts or channels configured for dispatch.",
            );
            return 0;
        }
        self.registry.register(&planned);
        let count = planned.len();
        debug!(attempts = count, "dispatch fan-out planned");

        let registry = Arc::clone(&self.registry);
        let log = Arc::clone(&self.log);
        let transport = Arc::clone(&self.transport);
        let composer = Arc::clone(&self.composer);
        let feedback = Arc::clone(&self.feedback);
        let custom_message = settings.custom_safety_message.clone();
        let location = self.sensors.location();
        let battery = self.sensors.battery();

        tokio::spawn(async move {
            let alert_text = composer
                .compose_alert(&custom_message, location.as_ref(), battery)
                .await;
            for plan in planned {
                let message = match plan.payload {
                    PayloadKind::AlertText => alert_text.clone(),
                    PayloadKind::CallScript => CALL_SCRIPT.to_string(),
                };
                let delivery = Delivery {
                    id: plan.id,
                    channel: plan.channel,
                    recipient: plan.recipient,
                    has_attachment: plan.has_attachment,
                    message,
                };
                tokio::spawn(deliver_one(
                    Arc::clone(&registry),
                    Arc::clone(&log),
                    Arc::clone(&transport),
                    Arc::clone(&feedback),
                    delivery,
                ));
            }
        });
        count
    }
}

async fn deliver_one(
    registry: Arc<AttemptRegistry>,
    log: Arc<ActivityLog>,
    transport: Arc<dyn Transport>,
    feedback: Arc<dyn Feedback>,
    delivery: Delivery,
) {
    let (outcome, line) = match transport.deliver(&delivery).await {
        Ok(()) => (DispatchOutcome::Sent, describe_sent(&delivery)),
        Err(err) => (
            DispatchOutcome::Failed,
            format!(
                "[{}] Send to {} failed: {err}",
                delivery.channel, delivery.recipient
            ),
        ),
    };
    registry.complete(delivery.id, outcome);
    log.append(SafetyState::Emergency, line);
    feedback.signal(FeedbackKind::Tap);
}

fn describe_sent(delivery: &Delivery) -> String {
    let mut line = match delivery.channel {
        Channel::Call => format!(
            "[CALL] Dialing {}... playing automated message.",
            delivery.recipient
        ),
        _ => format!("[{}] Sent to {}", delivery.channel, delivery.recipient),
    };
    if delivery.has_attachment {
        line.push_str(" (voice attached)");
    }
    line
}
