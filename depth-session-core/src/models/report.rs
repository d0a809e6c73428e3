use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use super::frame::CaptureCounters;

/// How a capture run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaptureOutcome {
    /// The frame target or the safety ceiling was passed.
    Completed,
    /// The cancellation token was tripped.
    Cancelled,
    /// A fault was raised while stepping.
    Aborted { reason: String },
}

impl CaptureOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Summary of one capture loop run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureReport {
    pub id: String,
    pub created_at: String,
    pub outcome: CaptureOutcome,
    pub counters: CaptureCounters,
    pub empty_bundles: u64,
    pub resets: u64,
    pub elapsed_secs: f64,
    /// The fault behind an `Aborted` outcome. Not persisted.
    #[serde(skip)]
    pub fault: Option<SessionError>,
}

impl CaptureReport {
    pub fn new(
        outcome: CaptureOutcome,
        counters: CaptureCounters,
        empty_bundles: u64,
        resets: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            outcome,
            counters,
            empty_bundles,
            resets,
            elapsed_secs: elapsed.as_secs_f64(),
            fault: None,
        }
    }

    /// Build an aborted report that keeps the originating fault.
    pub fn aborted(
        fault: SessionError,
        counters: CaptureCounters,
        empty_bundles: u64,
        resets: u64,
        elapsed: Duration,
    ) -> Self {
        let mut report = Self::new(
            CaptureOutcome::Aborted {
                reason: fault.to_string(),
            },
            counters,
            empty_bundles,
            resets,
            elapsed,
        );
        report.fault = Some(fault);
        report
    }

    /// Convert an aborted run into its fault.
    pub fn into_result(self) -> Result<Self, SessionError> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self),
        }
    }
}

/// Latency summary of repeated init/stop cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub id: String,
    pub created_at: String,
    pub iterations: u32,
    pub mean_cycle_ms: f64,
    pub min_cycle_ms: f64,
    pub max_cycle_ms: f64,
}

impl BenchmarkReport {
    pub fn from_cycles(cycles: &[Duration]) -> Self {
        let to_ms = |d: &Duration| d.as_secs_f64() * 1000.0;
        let min = cycles.iter().map(to_ms).fold(f64::INFINITY, f64::min);
        let max = cycles.iter().map(to_ms).fold(0.0, f64::max);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            iterations: cycles.len() as u32,
            mean_cycle_ms: mean_latency(cycles).as_secs_f64() * 1000.0,
            min_cycle_ms: if cycles.is_empty() { 0.0 } else { min },
            max_cycle_ms: max,
        }
    }

    pub fn mean_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.mean_cycle_ms / 1000.0)
    }
}

/// Arithmetic mean of the cycle durations; zero for no cycles.
pub fn mean_latency(cycles: &[Duration]) -> Duration {
    if cycles.is_empty() {
        return Duration::ZERO;
    }
    let total: Duration = cycles.iter().sum();
    total / cycles.len() as u32
}
