//! Emergency protocol settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Milliseconds in one minute.
pub const MINUTE_MS: u64 = 60_000;

/// Unit of the check-in interval.
///
/// Month and year conversions use fixed 30-day and 365-day factors. This is
/// an intentional approximation; no calendar arithmetic is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl TimeUnit {
    /// Convert `value` of this unit to milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn to_ms(self, value: u64) -> u64 {
        let factor = match self {
            TimeUnit::Minutes => MINUTE_MS,
            TimeUnit::Hours => 60 * MINUTE_MS,
            TimeUnit::Days => 24 * 60 * MINUTE_MS,
            TimeUnit::Months => 30 * 24 * 60 * MINUTE_MS,
            TimeUnit::Years => 365 * 24 * 60 * MINUTE_MS,
        };
        value.saturating_mul(factor)
    }
}

impl FromStr for TimeUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            "month" | "months" => Ok(TimeUnit::Months),
            "year" | "years" => Ok(TimeUnit::Years),
            other => Err(ValidationError::InvalidValue {
                field: "check_in_interval_unit".to_string(),
                message: format!("unknown unit '{other}'"),
            }),
        }
    }
}

/// User-configurable monitoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySettings {
    #[serde(default = "default_interval_value")]
    pub check_in_interval_value: u64,
    #[serde(default = "default_interval_unit")]
    pub check_in_interval_unit: TimeUnit,
    #[serde(default = "default_grace_minutes")]
    pub warning_grace_period_minutes: u64,
    #[serde(default = "default_safety_message")]
    pub custom_safety_message: String,
    #[serde(default = "default_true")]
    pub auto_call_police: bool,
    #[serde(default = "default_true")]
    pub live_tracking_enabled: bool,
}

impl EmergencySettings {
    /// Check-in interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.check_in_interval_unit
            .to_ms(self.check_in_interval_value)
    }

    /// Warning grace period in milliseconds.
    pub fn grace_ms(&self) -> u64 {
        self.warning_grace_period_minutes.saturating_mul(MINUTE_MS)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.check_in_interval_value == 0 {
            return Err(ValidationError::InvalidValue {
                field: "check_in_interval_value".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.warning_grace_period_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "warning_grace_period_minutes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            check_in_interval_value: default_interval_value(),
            check_in_interval_unit: default_interval_unit(),
            warning_grace_period_minutes: default_grace_minutes(),
            custom_safety_message: default_safety_message(),
            auto_call_police: true,
            live_tracking_enabled: true,
        }
    }
}

fn default_interval_value() -> u64 {
    30
}

fn default_interval_unit() -> TimeUnit {
    TimeUnit::Minutes
}

fn default_grace_minutes() -> u64 {
    60
}

fn default_safety_message() -> String {
    "I haven't checked in. Please verify my safety.".to_string()
}

fn default_true() -> bool {
    true
}
