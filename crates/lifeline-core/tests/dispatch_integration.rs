//! Integration tests for emergency dispatch fan-out.
//!
//! Tokio's paused clock drives the simulated carrier latency, so every
//! attempt reaches a terminal outcome deterministically.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lifeline_core::{
    Channel, Collaborators, ContactBook, Delivery, DispatchOutcome, EmergencySettings,
    ManualClock, NewContact, SafetyMonitor, SafetyState, SimulatedTransport, TimeUnit, Transport,
    TransportError, EMERGENCY_SERVICES,
};

fn test_settings(auto_call_police: bool) -> EmergencySettings {
    EmergencySettings {
        check_in_interval_value: 30,
        check_in_interval_unit: TimeUnit::Minutes,
        warning_grace_period_minutes: 60,
        auto_call_police,
        live_tracking_enabled: false,
        ..EmergencySettings::default()
    }
}

fn scenario_contact() -> ContactBook {
    let mut book = ContactBook::new();
    book.add(NewContact {
        name: "Mom".to_string(),
        phone: Some("555-0101".to_string()),
        email: Some("a@b.com".to_string()),
        notify_on_emergency: true,
        enable_sms: true,
        enable_email: true,
        ..NewContact::default()
    });
    book
}

fn monitor_with(
    contacts: ContactBook,
    settings: EmergencySettings,
    transport: Arc<dyn Transport>,
) -> SafetyMonitor {
    SafetyMonitor::new(
        settings,
        contacts,
        Arc::new(ManualClock::new(0)),
        Collaborators {
            transport,
            ..Collaborators::default()
        },
    )
}

fn dispatch_lines(monitor: &SafetyMonitor) -> Vec<String> {
    monitor
        .snapshot()
        .logs
        .iter()
        .filter(|e| e.message.starts_with('['))
        .map(|e| e.message.clone())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn scenario_b_single_contact_three_attempts() {
    let mut monitor = monitor_with(
        scenario_contact(),
        test_settings(false),
        Arc::new(SimulatedTransport::with_seed(7)),
    );

    monitor.trigger_sos();

    // Registered synchronously as pending before any latency elapses.
    let attempts = monitor.snapshot().attempts;
    assert_eq!(attempts.len(), 3);
    assert!(attempts
        .iter()
        .all(|a| a.outcome == DispatchOutcome::Pending));

    // Worst-case simulated latency is 2.5s; everything is terminal after 3.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let attempts = monitor.snapshot().attempts;
    assert_eq!(attempts.len(), 3);
    assert!(attempts.iter().all(|a| a.outcome == DispatchOutcome::Sent));
    let mut channels: Vec<Channel> = attempts.iter().map(|a| a.channel).collect();
    channels.sort_by_key(|c| format!("{c}"));
    assert_eq!(channels, vec![Channel::Call, Channel::Email, Channel::Sms]);

    let lines = dispatch_lines(&monitor);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().any(|l| l == "[SMS] Sent to 555-0101"));
    assert!(lines.iter().any(|l| l == "[EMAIL] Sent to a@b.com"));
    assert!(lines
        .iter()
        .any(|l| l == "[CALL] Dialing 555-0101... playing automated message."));
}

#[tokio::test(start_paused = true)]
async fn scenario_c_zero_contacts_informational_entry() {
    let mut monitor = monitor_with(
        ContactBook::new(),
        test_settings(false),
        Arc::new(SimulatedTransport::with_seed(7)),
    );

    monitor.trigger_sos();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(monitor.snapshot().attempts.is_empty());
    let informational = monitor
        .snapshot()
        .logs
        .iter()
        .filter(|e| e.message == "No active contacts or channels configured for dispatch.")
        .count();
    assert_eq!(informational, 1);
    // Not an error: the monitor stays in EMERGENCY as usual.
    assert_eq!(monitor.state(), SafetyState::Emergency);
}

#[tokio::test(start_paused = true)]
async fn auto_call_police_adds_two_attempts() {
    let mut monitor = monitor_with(
        scenario_contact(),
        test_settings(true),
        Arc::new(SimulatedTransport::with_seed(7)),
    );

    monitor.trigger_sos();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let attempts = monitor.snapshot().attempts;
    assert_eq!(attempts.len(), 5);
    let police: Vec<_> = attempts
        .iter()
        .filter(|a| a.recipient == EMERGENCY_SERVICES)
        .collect();
    assert_eq!(police.len(), 2);
    assert!(police.iter().any(|a| a.channel == Channel::Call));
    assert!(police.iter().any(|a| a.channel == Channel::Sms));
    assert!(attempts.iter().all(|a| a.outcome == DispatchOutcome::Sent));
}

#[tokio::test(start_paused = true)]
async fn voice_note_marks_attempts_and_log_lines() {
    let mut monitor = monitor_with(
        scenario_contact(),
        test_settings(false),
        Arc::new(SimulatedTransport::with_seed(7)),
    );
    monitor.set_voice_note(true);

    monitor.trigger_sos();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let attempts = monitor.snapshot().attempts;
    assert!(attempts.iter().all(|a| a.has_attachment));
    let lines = dispatch_lines(&monitor);
    assert!(lines.iter().all(|l| l.ends_with("(voice attached)")));
}

struct FailEmail;

#[async_trait]
impl Transport for FailEmail {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), TransportError> {
        if delivery.channel == Channel::Email {
            return Err(TransportError::Rejected("mailbox unavailable".to_string()));
        }
        tokio::time::sleep(Duration::from_millis(800)).await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn one_failed_attempt_leaves_others_untouched() {
    let mut monitor = monitor_with(scenario_contact(), test_settings(false), Arc::new(FailEmail));

    monitor.trigger_sos();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let attempts = monitor.snapshot().attempts;
    assert_eq!(attempts.len(), 3);
    for attempt in &attempts {
        let expected = if attempt.channel == Channel::Email {
            DispatchOutcome::Failed
        } else {
            DispatchOutcome::Sent
        };
        assert_eq!(attempt.outcome, expected);
    }

    let lines = dispatch_lines(&monitor);
    assert!(lines
        .iter()
        .any(|l| l.contains("failed") && l.contains("mailbox unavailable")));
    // The failure never surfaces beyond the log and the attempt record.
    assert_eq!(monitor.state(), SafetyState::Emergency);
}

#[tokio::test(start_paused = true)]
async fn latency_of_one_attempt_does_not_block_another() {
    struct SlowCall;

    #[async_trait]
    impl Transport for SlowCall {
        async fn deliver(&self, delivery: &Delivery) -> Result<(), TransportError> {
            let delay = match delivery.channel {
                Channel::Call => Duration::from_secs(60),
                _ => Duration::from_millis(100),
            };
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }

    let mut monitor = monitor_with(scenario_contact(), test_settings(false), Arc::new(SlowCall));
    monitor.trigger_sos();

    tokio::time::sleep(Duration::from_secs(1)).await;
    let attempts = monitor.snapshot().attempts;
    for attempt in &attempts {
        let expected = if attempt.channel == Channel::Call {
            DispatchOutcome::Pending
        } else {
            DispatchOutcome::Sent
        };
        assert_eq!(attempt.outcome, expected);
    }

    // The straggler still runs to its terminal outcome.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(monitor
        .snapshot()
        .attempts
        .iter()
        .all(|a| a.outcome == DispatchOutcome::Sent));
}
