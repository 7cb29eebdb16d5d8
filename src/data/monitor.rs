//! The sampling timeline and the dashboard it produces.
//!
//! [`Monitor::tick`] runs one pass of Sampler → rate → history → ranking →
//! alerts and returns a [`Dashboard`] that the render layer can own.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::alert::{Alert, AlertEvaluator, AlertPhase, DEFAULT_COOLDOWN, DEFAULT_THRESHOLD};
use super::history::{History, DEFAULT_CAPACITY};
use super::process::{top_n, ProcessSnapshot, RankKey};
use super::sample::{rate, RateSample, Sample};
use super::sampler::Sampler;
use crate::source::MetricsProvider;

/// Number of past alerts kept for the alert log.
pub const ALERT_LOG_SIZE: usize = 50;

/// Default length of the process view.
pub const DEFAULT_TOP_N: usize = 10;

/// Percentages at which the UI colors a reading.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Percentage that triggers a warning color.
    pub warning: f32,
    /// Percentage that triggers critical color and alerts.
    pub critical: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 75.0,
            critical: DEFAULT_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Classify a percentage reading.
    pub fn status(&self, percent: f32) -> HealthStatus {
        if percent > self.critical {
            HealthStatus::Critical
        } else if percent > self.warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Health status for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Tunables for [`Monitor`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub history_capacity: usize,
    pub top_n: usize,
    pub rank_key: RankKey,
    pub alert_threshold: f32,
    pub alert_cooldown: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            top_n: DEFAULT_TOP_N,
            rank_key: RankKey::default(),
            alert_threshold: DEFAULT_THRESHOLD,
            alert_cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Everything the render layer needs from one tick.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Monotonic tick counter, starting at 1.
    pub sequence: u64,
    pub sample: Sample,
    pub rate: RateSample,
    pub history: History,
    /// Every readable process, in enumeration order.
    pub processes: Vec<ProcessSnapshot>,
    /// The top of `processes` under `rank_key`.
    pub top: Vec<ProcessSnapshot>,
    pub rank_key: RankKey,
    pub top_n: usize,
    /// Alert emitted on this tick, if any.
    pub alert: Option<Alert>,
    /// Recent alerts, newest last.
    pub recent_alerts: Vec<Alert>,
    /// Time left before another alert may fire.
    pub cooldown_remaining: Option<Duration>,
    pub source: String,
}

impl Dashboard {
    /// The top processes under `key`, re-ranking if it differs from the
    /// key this dashboard was built with.
    pub fn top_by(&self, key: RankKey) -> Vec<ProcessSnapshot> {
        if key == self.rank_key {
            self.top.clone()
        } else {
            top_n(&self.processes, self.top_n, key)
        }
    }
}

/// Owns the single sampling timeline.
///
/// History and alert state are only ever touched from `tick`, so a
/// `Monitor` needs no locking as long as one task owns it.
#[derive(Debug)]
pub struct Monitor<P> {
    sampler: Sampler<P>,
    previous: Option<Sample>,
    history: History,
    alerts: AlertEvaluator,
    alert_log: VecDeque<Alert>,
    top_n: usize,
    rank_key: RankKey,
    sequence: u64,
}

impl<P: MetricsProvider> Monitor<P> {
    pub fn new(provider: P, config: MonitorConfig) -> Self {
        Self {
            sampler: Sampler::new(provider),
            previous: None,
            history: History::new(config.history_capacity),
            alerts: AlertEvaluator::new(config.alert_threshold, config.alert_cooldown),
            alert_log: VecDeque::with_capacity(ALERT_LOG_SIZE),
            top_n: config.top_n,
            rank_key: config.rank_key,
            sequence: 0,
        }
    }

    pub fn description(&self) -> &str {
        self.sampler.description()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    #[cfg(test)]
    pub(crate) fn provider_mut(&mut self) -> &mut P {
        self.sampler.provider_mut()
    }

    /// Run one full sampling pass. Blocks for the provider's CPU window.
    pub fn tick(&mut self) -> Dashboard {
        let sample = self.sampler.sample();
        let processes = self.sampler.processes();

        let rate = match self.previous.as_ref() {
            Some(previous) => rate(previous, &sample).unwrap_or_else(|e| {
                warn!(error = %e, "cannot derive network rate");
                RateSample::ZERO
            }),
            None => RateSample::ZERO,
        };

        self.history.record(&sample, &rate);

        let top = top_n(&processes, self.top_n, self.rank_key);

        let alert = self.alerts.evaluate(&sample);
        if let Some(ref alert) = alert {
            info!(metric = %alert.metric, value = alert.value, "threshold exceeded");
            if self.alert_log.len() == ALERT_LOG_SIZE {
                self.alert_log.pop_front();
            }
            self.alert_log.push_back(alert.clone());
        }
        let cooldown_remaining = match self.alerts.phase(sample.timestamp) {
            AlertPhase::CoolingDown { remaining } => Some(remaining),
            AlertPhase::Quiet => None,
        };

        self.sequence += 1;
        debug!(
            sequence = self.sequence,
            cpu = sample.cpu_percent,
            memory = sample.memory_percent,
            processes = processes.len(),
            "tick"
        );

        self.previous = Some(sample.clone());

        Dashboard {
            sequence: self.sequence,
            sample,
            rate,
            history: self.history.clone(),
            processes,
            top,
            rank_key: self.rank_key,
            top_n: self.top_n,
            alert,
            recent_alerts: self.alert_log.iter().cloned().collect(),
            cooldown_remaining,
            source: self.sampler.description().to_string(),
        }
    }
}
