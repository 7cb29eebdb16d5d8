//! Point-in-time metric samples and network rate derivation.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::{Metric, MetricError};

/// One reading of the host's instantaneous counters.
///
/// Fields listed in `unavailable` could not be read this tick; their value
/// is zero (or `None` for optional fields) and should be shown as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: SystemTime,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    /// Cumulative bytes sent across all interfaces.
    pub net_bytes_sent: u64,
    /// Cumulative bytes received across all interfaces.
    pub net_bytes_recv: u64,
    pub temperature_celsius: Option<f32>,
    /// Boot time in seconds since the unix epoch.
    pub boot_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<Metric>,
}

impl Sample {
    /// An empty sample at the given time, every field zeroed.
    pub fn empty(timestamp: SystemTime) -> Self {
        Self {
            timestamp,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            disk_percent: 0.0,
            net_bytes_sent: 0,
            net_bytes_recv: 0,
            temperature_celsius: None,
            boot_time: None,
            unavailable: Vec::new(),
        }
    }

    /// Whether the given metric was read successfully.
    pub fn has(&self, metric: Metric) -> bool {
        !self.unavailable.contains(&metric)
    }

    /// Time since boot as of this sample, if boot time is known.
    pub fn uptime(&self) -> Option<Duration> {
        let boot = SystemTime::UNIX_EPOCH + Duration::from_secs(self.boot_time?);
        self.timestamp.duration_since(boot).ok()
    }
}

/// Network throughput derived from two consecutive samples, in bytes/second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateSample {
    pub upload_rate: f64,
    pub download_rate: f64,
    /// Seconds between the two samples.
    pub elapsed_secs: f64,
}

impl RateSample {
    /// Rate reported when there is no previous sample to compare against.
    pub const ZERO: RateSample = RateSample {
        upload_rate: 0.0,
        download_rate: 0.0,
        elapsed_secs: 0.0,
    };
}

/// Compute per-second throughput between two samples.
///
/// Counters that went backwards (interface reset, wraparound) yield a zero
/// rate for that direction rather than a negative one.
pub fn rate(previous: &Sample, current: &Sample) -> Result<RateSample, MetricError> {
    let elapsed = current
        .timestamp
        .duration_since(previous.timestamp)
        .map_err(|_| MetricError::InvalidOrdering)?;
    if elapsed.is_zero() {
        return Err(MetricError::InvalidOrdering);
    }

    let secs = elapsed.as_secs_f64();
    let sent = current.net_bytes_sent.saturating_sub(previous.net_bytes_sent);
    let recv = current.net_bytes_recv.saturating_sub(previous.net_bytes_recv);

    Ok(RateSample {
        upload_rate: sent as f64 / secs,
        download_rate: recv as f64 / secs,
        elapsed_secs: secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64, sent: u64, recv: u64) -> Sample {
        let mut sample = Sample::empty(SystemTime::UNIX_EPOCH + Duration::from_secs(secs));
        sample.net_bytes_sent = sent;
        sample.net_bytes_recv = recv;
        sample
    }

    #[test]
    fn test_rate_bytes_per_second() {
        let previous = at(0, 1000, 0);
        let current = at(1, 1500, 0);

        let r = rate(&previous, &current).unwrap();
        assert_eq!(r.upload_rate, 500.0);
        assert_eq!(r.download_rate, 0.0);
    }

    #[test]
    fn test_rate_divides_by_elapsed() {
        let previous = at(10, 0, 1_000);
        let current = at(14, 4_000, 9_000);

        let r = rate(&previous, &current).unwrap();
        assert_eq!(r.upload_rate, 1_000.0);
        assert_eq!(r.download_rate, 2_000.0);
        assert_eq!(r.elapsed_secs, 4.0);
    }

    #[test]
    fn test_rate_counter_reset_clamps_to_zero() {
        let previous = at(0, 5_000, 5_000);
        let current = at(2, 100, 7_000);

        let r = rate(&previous, &current).unwrap();
        assert_eq!(r.upload_rate, 0.0);
        assert_eq!(r.download_rate, 1_000.0);
    }

    #[test]
    fn test_rate_rejects_out_of_order() {
        let previous = at(5, 0, 0);
        let current = at(4, 10, 10);
        assert_eq!(rate(&previous, &current), Err(MetricError::InvalidOrdering));
    }

    #[test]
    fn test_rate_rejects_same_timestamp() {
        let previous = at(5, 0, 0);
        let current = at(5, 10, 10);
        assert_eq!(rate(&previous, &current), Err(MetricError::InvalidOrdering));
    }

    #[test]
    fn test_uptime_from_boot_time() {
        let mut sample = at(1_000, 0, 0);
        sample.boot_time = Some(400);
        assert_eq!(sample.uptime(), Some(Duration::from_secs(600)));

        sample.boot_time = None;
        assert_eq!(sample.uptime(), None);
    }

    #[test]
    fn test_has_metric() {
        let mut sample = at(0, 0, 0);
        sample.unavailable.push(Metric::Temperature);
        assert!(sample.has(Metric::Cpu));
        assert!(!sample.has(Metric::Temperature));
    }
}
