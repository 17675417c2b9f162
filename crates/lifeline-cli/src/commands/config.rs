use clap::Subcommand;
use lifeline_core::{CoreError, TimeUnit};

use crate::store::CliConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print current settings as JSON
    Show,
    /// Update settings fields
    Set {
        /// Check-in interval value
        #[arg(long)]
        interval_value: Option<u64>,
        /// Check-in interval unit (minutes|hours|days|months|years)
        #[arg(long)]
        interval_unit: Option<String>,
        /// Warning grace period in minutes
        #[arg(long)]
        grace_minutes: Option<u64>,
        /// Custom safety message embedded in alerts
        #[arg(long)]
        message: Option<String>,
        /// Dispatch to emergency services on emergency entry
        #[arg(long)]
        auto_call_police: Option<bool>,
        /// Broadcast live location during an emergency
        #[arg(long)]
        live_tracking: Option<bool>,
        /// Remote composer endpoint ("" clears it)
        #[arg(long)]
        compose_endpoint: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), CoreError> {
    match action {
        ConfigAction::Show => {
            let config = CliConfig::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Set {
            interval_value,
            interval_unit,
            grace_minutes,
            message,
            auto_call_police,
            live_tracking,
            compose_endpoint,
        } => {
            let mut config = CliConfig::load()?;
            if let Some(value) = interval_value {
                config.settings.check_in_interval_value = value;
            }
            if let Some(unit) = interval_unit {
                config.settings.check_in_interval_unit = unit.parse::<TimeUnit>()?;
            }
            if let Some(grace) = grace_minutes {
                config.settings.warning_grace_period_minutes = grace;
            }
            if let Some(message) = message {
                config.settings.custom_safety_message = message;
            }
            if let Some(police) = auto_call_police {
                config.settings.auto_call_police = police;
            }
            if let Some(tracking) = live_tracking {
                config.settings.live_tracking_enabled = tracking;
            }
            if let Some(endpoint) = compose_endpoint {
                config.compose_endpoint = if endpoint.is_empty() {
                    None
                } else {
                    Some(endpoint)
                };
            }
            config.settings.validate()?;
            config.save()?;
            println!("Settings updated.");
        }
    }
    Ok(())
}
