//! Threshold alerts with a shared cooldown.
//!
//! The evaluator has two effective states. While quiet, the first monitored
//! metric above the threshold emits an [`Alert`] and starts the cooldown.
//! While cooling down nothing is emitted, whatever the readings. Once the
//! cooldown has elapsed the evaluator re-arms, even if the metric never
//! dropped below the threshold in between.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::sample::Sample;
use crate::error::Metric;

pub const DEFAULT_THRESHOLD: f32 = 90.0;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// An emitted threshold breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub metric: Metric,
    pub value: f32,
    pub threshold: f32,
    pub timestamp: SystemTime,
}

impl Alert {
    /// One-line message, e.g. "High CPU usage: 95.0%".
    pub fn message(&self) -> String {
        format!("High {} usage: {:.1}%", self.metric.label(), self.value)
    }
}

/// Effective evaluator state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    Quiet,
    CoolingDown { remaining: Duration },
}

/// Mutable alert state, owned by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    pub threshold: f32,
    pub last_alert_time: Option<SystemTime>,
}

#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    state: AlertState,
    cooldown: Duration,
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

impl AlertEvaluator {
    pub fn new(threshold: f32, cooldown: Duration) -> Self {
        Self {
            state: AlertState {
                threshold,
                last_alert_time: None,
            },
            cooldown,
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// State as seen at `now`.
    ///
    /// A clock that has gone backwards past the last alert counts as still
    /// cooling down for the full window.
    pub fn phase(&self, now: SystemTime) -> AlertPhase {
        let Some(last) = self.state.last_alert_time else {
            return AlertPhase::Quiet;
        };
        let elapsed = now.duration_since(last).unwrap_or(Duration::ZERO);
        if elapsed < self.cooldown {
            AlertPhase::CoolingDown {
                remaining: self.cooldown - elapsed,
            }
        } else {
            AlertPhase::Quiet
        }
    }

    /// Check a sample's CPU and memory, CPU first.
    pub fn evaluate(&mut self, sample: &Sample) -> Option<Alert> {
        let readings = [
            (Metric::Cpu, sample.cpu_percent),
            (Metric::Memory, sample.memory_percent),
        ];
        let readings = readings.into_iter().filter(|(metric, _)| sample.has(*metric));
        self.evaluate_readings(readings, sample.timestamp)
    }

    /// Check arbitrary readings in priority order; at most one alert fires.
    pub fn evaluate_readings(
        &mut self,
        readings: impl IntoIterator<Item = (Metric, f32)>,
        now: SystemTime,
    ) -> Option<Alert> {
        if let AlertPhase::CoolingDown { .. } = self.phase(now) {
            return None;
        }

        let threshold = self.state.threshold;
        let (metric, value) = readings.into_iter().find(|(_, value)| *value > threshold)?;

        self.state.last_alert_time = Some(now);
        Some(Alert {
            metric,
            value,
            threshold,
            timestamp: now,
        })
    }
}
