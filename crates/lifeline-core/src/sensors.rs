//! Last-known-value store for sensor pushes.
//!
//! Device sensors push samples in; the core never queries hardware. The
//! dispatch engine and broadcaster read whatever was seen most recently,
//! and "no location yet" is a valid state.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// One GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy in meters.
    pub accuracy: f64,
    pub sampled_at_ms: u64,
}

#[derive(Debug)]
struct SensorReadings {
    location: Option<LocationSample>,
    battery: f64,
    voice_note: bool,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            location: None,
            battery: 1.0,
            voice_note: false,
        }
    }
}

/// Shared sensor state, safe to read from dispatch and broadcast tasks.
#[derive(Debug, Default)]
pub struct SensorHub {
    inner: Mutex<SensorReadings>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_location_sample(&self, sample: LocationSample) {
        self.lock().location = Some(sample);
    }

    /// Battery charge as a 0.0-1.0 fraction; out-of-range pushes are clamped.
    pub fn on_battery_level(&self, fraction: f64) {
        self.lock().battery = fraction.clamp(0.0, 1.0);
    }

    /// Mark whether a recorded voice note is available as an attachment.
    pub fn set_voice_note(&self, present: bool) {
        self.lock().voice_note = present;
    }

    pub fn location(&self) -> Option<LocationSample> {
        self.lock().location
    }

    pub fn battery(&self) -> f64 {
        self.lock().battery
    }

    pub fn voice_note(&self) -> bool {
        self.lock().voice_note
    }

    fn lock(&self) -> MutexGuard<'_, SensorReadings> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }
}
