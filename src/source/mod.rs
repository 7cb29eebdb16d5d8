//! Metric inputs and the channel that feeds the UI.
//!
//! Two seams live here:
//!
//! - [`MetricsProvider`] is how the sampler reaches the operating system.
//!   [`SystemProvider`] implements it on `sysinfo`; tests script their own.
//! - [`DataSource`] is how the UI receives finished [`Dashboard`] values.
//!   [`ChannelSource`] is fed by the background loop from [`spawn_monitor`].

mod channel;
mod driver;
mod system;

pub use channel::ChannelSource;
pub use driver::spawn_monitor;
pub use system::{SystemControl, SystemProvider};

use std::fmt::Debug;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::data::{Dashboard, ProcessSnapshot};
use crate::error::MetricError;

/// Cumulative byte counters summed over every interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkTotals {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Access to the host's counters.
///
/// [`refresh`](MetricsProvider::refresh) updates every counter at once and
/// may block while CPU utilization is measured; the getters then read the
/// refreshed values without further I/O.
pub trait MetricsProvider: Send + Debug {
    /// Refresh all counters. May block for the CPU measurement window.
    fn refresh(&mut self);

    /// Global CPU utilization, 0-100.
    fn cpu_percent(&self) -> Result<f32, MetricError>;

    /// Used physical memory, 0-100.
    fn memory_percent(&self) -> Result<f32, MetricError>;

    /// Used space on the monitored filesystem, 0-100.
    fn disk_percent(&self) -> Result<f32, MetricError>;

    fn network_totals(&self) -> Result<NetworkTotals, MetricError>;

    /// CPU temperature in degrees Celsius.
    fn temperature(&self) -> Result<f32, MetricError>;

    /// Boot time in seconds since the unix epoch.
    fn boot_time(&self) -> Result<u64, MetricError>;

    /// Pids of all processes seen by the last refresh, in enumeration order.
    fn process_ids(&self) -> Vec<u32>;

    /// Details for one pid. Fails with [`MetricError::ProcessVanished`] if
    /// the process exited after enumeration.
    fn process(&self, pid: u32) -> Result<ProcessSnapshot, MetricError>;

    /// Wall-clock time used to stamp samples.
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    /// Returns a human-readable description of the provider.
    fn description(&self) -> &str;
}

/// Changes to running processes requested from the UI.
///
/// Kept apart from [`MetricsProvider`] because the provider lives on the
/// sampling task while these calls come from the UI thread.
pub trait ProcessControl: Debug {
    /// Shift the nice value of `pid` by `delta`, clamped to
    /// [`NICE_MIN`](crate::data::process::NICE_MIN)..=[`NICE_MAX`](crate::data::process::NICE_MAX).
    ///
    /// Returns the nice value in effect afterwards. A negative delta raises
    /// the priority.
    fn renice(&mut self, pid: u32, delta: i32) -> Result<i32, MetricError>;
}

/// Trait for receiving dashboards from the sampling loop.
pub trait DataSource: Send + Debug {
    /// Poll for the latest dashboard.
    ///
    /// Returns `Some(dashboard)` if a new one is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Dashboard>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the source has stopped producing data.
    fn error(&self) -> Option<&str>;
}
