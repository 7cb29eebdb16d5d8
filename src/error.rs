//! Error types for metric collection.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single metric series or sample field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
    Network,
    Temperature,
    BootTime,
}

impl Metric {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "Memory",
            Metric::Disk => "Disk",
            Metric::Network => "Network",
            Metric::Temperature => "Temperature",
            Metric::BootTime => "Boot time",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur while sampling or deriving metrics.
///
/// None of these are fatal: a tick that hits one still produces the rest
/// of its sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// The metric cannot be read on this host.
    #[error("{metric} unavailable: {reason}")]
    MetricUnavailable { metric: Metric, reason: String },

    /// The process exited between enumeration and detail read.
    #[error("process {pid} vanished")]
    ProcessVanished { pid: u32 },

    /// A rate was requested on samples that are not in chronological order.
    #[error("samples out of order: current is not later than previous")]
    InvalidOrdering,

    /// The caller may not change this process.
    #[error("permission denied for process {pid}")]
    PermissionDenied { pid: u32 },

    #[error("cannot change priority of process {pid}: {reason}")]
    PriorityFailed { pid: u32, reason: String },

    /// Priority changes are not implemented on this platform.
    #[error("process priority cannot be changed on this platform")]
    Unsupported,
}

impl MetricError {
    /// Shorthand for [`MetricError::MetricUnavailable`].
    pub fn unavailable(metric: Metric, reason: impl Into<String>) -> Self {
        MetricError::MetricUnavailable {
            metric,
            reason: reason.into(),
        }
    }
}
