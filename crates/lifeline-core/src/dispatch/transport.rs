//! Delivery seam for alert channels.
//!
//! Real telephony/SMS/email transports live outside the core; this module
//! defines the contract and a simulated carrier with network-shaped latency.

use std::ops::Range;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use thiserror::Error;

use super::Delivery;

/// Terminal delivery failure. Recorded on the attempt and in the log; never
/// propagated further.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("carrier rejected the message: {0}")]
    Rejected(String),

    #[error("network unreachable")]
    Unreachable,
}

/// One channel send. Deliveries run independently: latency on one must not
/// block another.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), TransportError>;
}

/// Default simulated latency bounds in milliseconds.
pub const DEFAULT_LATENCY_MS: Range<u64> = 500..2500;

/// Stand-in carrier: waits a uniformly random delay, then reports success.
pub struct SimulatedTransport {
    latency_ms: Range<u64>,
    rng: Mutex<Pcg64Mcg>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Seeded variant for reproducible latencies.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_latency(DEFAULT_LATENCY_MS, seed)
    }

    /// `latency_ms` must be a non-empty range.
    pub fn with_latency(latency_ms: Range<u64>, seed: u64) -> Self {
        Self {
            latency_ms,
            rng: Mutex::new(Pcg64Mcg::seed_from_u64(seed)),
        }
    }

    fn sample_latency(&self) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(|err| err.into_inner());
        Duration::from_millis(rng.gen_range(self.latency_ms.clone()))
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn deliver(&self, _delivery: &Delivery) -> Result<(), TransportError> {
        tokio::time::sleep(self.sample_latency()).await;
        Ok(())
    }
}

/// Zero-latency transport for tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransport;

#[async_trait]
impl Transport for InstantTransport {
    async fn deliver(&self, _delivery: &Delivery) -> Result<(), TransportError> {
        Ok(())
    }
}
