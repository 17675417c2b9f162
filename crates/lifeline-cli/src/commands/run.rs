//! Interactive monitoring session.
//!
//! Spawns the monitor service, mirrors new activity-log entries to the
//! terminal, and turns single-letter commands into intents: `c` check in,
//! `s` SOS, `r` authenticated reset, `q` quit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use lifeline_core::{
    Authenticator, CheckInOutcome, Clock, Collaborators, Composer, ContactBook, CoreError,
    FallbackComposer, HttpComposer, LocationSample, MonitorService, Notifier, SafetyMonitor,
    SimulatedTransport, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::store::CliConfig;

#[derive(Args)]
pub struct RunArgs {
    /// Seed latitude for the location sensor
    #[arg(long)]
    lat: Option<f64>,
    /// Seed longitude for the location sensor
    #[arg(long)]
    lon: Option<f64>,
    /// Battery fraction 0.0-1.0
    #[arg(long, default_value_t = 1.0)]
    battery: f64,
    /// Mark a voice note as attached to dispatches
    #[arg(long)]
    voice_note: bool,
}

/// Prints warning notifications inline.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn push(&self, title: &str, body: &str) {
        println!("!! {title}: {body}");
    }
}

/// Approves a reset only while the session holds a fresh confirmation.
struct SessionAuthenticator {
    verdict: Arc<AtomicBool>,
}

impl Authenticator for SessionAuthenticator {
    fn authenticate(&self) -> bool {
        self.verdict.load(Ordering::SeqCst)
    }
}

pub async fn run(args: RunArgs) -> Result<(), CoreError> {
    let config = CliConfig::load()?;
    let contacts = ContactBook::from_contacts(config.contacts.clone())?;
    let verdict = Arc::new(AtomicBool::new(false));
    let composer: Arc<dyn Composer> = match &config.compose_endpoint {
        Some(endpoint) => Arc::new(HttpComposer::new(endpoint.clone())),
        None => Arc::new(FallbackComposer),
    };
    let collaborators = Collaborators {
        composer,
        transport: Arc::new(SimulatedTransport::new()),
        notifier: Arc::new(TerminalNotifier),
        authenticator: Arc::new(SessionAuthenticator {
            verdict: Arc::clone(&verdict),
        }),
        ..Collaborators::default()
    };

    let clock = SystemClock;
    let monitor = SafetyMonitor::new(config.settings.clone(), contacts, Arc::new(clock), collaborators);
    if let (Some(latitude), Some(longitude)) = (args.lat, args.lon) {
        monitor.on_location_sample(LocationSample {
            latitude,
            longitude,
            accuracy: 10.0,
            sampled_at_ms: clock.now_ms(),
        });
    }
    monitor.on_battery_level(args.battery);
    monitor.set_voice_note(args.voice_note);

    let service = MonitorService::spawn(monitor);
    println!("LifeLine monitoring started. Commands: c = check in, s = SOS, r = reset, q = quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(500));
    let mut printed = 0usize;
    let mut last_state = service.snapshot().state;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let snapshot = service.snapshot();
                if snapshot.state != last_state {
                    println!("-- state: {} --", snapshot.state);
                    last_state = snapshot.state;
                }
                let total = snapshot.logs.len();
                if total > printed {
                    // Snapshot is newest-first; print the new tail oldest-first.
                    for entry in snapshot.logs.iter().take(total - printed).rev() {
                        println!(
                            "[{}] {} {}",
                            entry.timestamp().format("%H:%M:%S"),
                            entry.state,
                            entry.message
                        );
                    }
                    printed = total;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "c" => {
                        if service.check_in() == CheckInOutcome::AuthenticationRequired {
                            println!("In EMERGENCY: use 'r' to verify and reset.");
                        }
                    }
                    "s" => service.trigger_sos(),
                    "r" => {
                        println!("Verify identity to disable emergency. Type 'yes' to confirm:");
                        let answer = lines.next_line().await?.unwrap_or_default();
                        verdict.store(answer.trim().eq_ignore_ascii_case("yes"), Ordering::SeqCst);
                        if service.reset_with_auth() {
                            println!("Reset confirmed. You are marked safe.");
                        } else {
                            println!("Verification failed; still in EMERGENCY.");
                        }
                        verdict.store(false, Ordering::SeqCst);
                    }
                    "q" => break,
                    "" => {}
                    other => println!("Unknown command '{other}'."),
                }
            }
        }
    }

    service.shutdown();
    Ok(())
}
