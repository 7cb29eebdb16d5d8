//! Layered settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `perfwatch.toml` in the working directory (optional), or the file
//!    given with `--config` (required)
//! 3. `PERFWATCH_*` environment variables, e.g. `PERFWATCH_THRESHOLD=95`
//! 4. command-line flags
//!
//! ```toml
//! interval = "2s"
//! cpu_window = "1s"
//! top = 10
//! rank = "cpu+memory"
//! threshold = 90.0
//! warning = 75.0
//! cooldown = "60s"
//! disk = "/"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::monitor::{MonitorConfig, Thresholds};
use crate::data::RankKey;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "perfwatch";

/// Warning level used when none is configured, capped at the threshold.
pub const DEFAULT_WARNING: f32 = 75.0;

/// Settings exactly as read from the config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSettings {
    pub interval: String,
    pub cpu_window: String,
    pub history: usize,
    pub top: usize,
    pub rank: String,
    pub threshold: f32,
    pub warning: Option<f32>,
    pub cooldown: String,
    pub disk: PathBuf,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; `None` leaves lower layers in effect.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<String>,
    pub cpu_window: Option<String>,
    pub top: Option<usize>,
    pub rank: Option<String>,
    pub threshold: Option<f32>,
    pub warning: Option<f32>,
    pub cooldown: Option<String>,
    pub disk: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Validated, typed settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval: Duration,
    pub cpu_window: Duration,
    pub history_capacity: usize,
    pub top_n: usize,
    pub rank_key: RankKey,
    pub alert_threshold: f32,
    pub warning_threshold: f32,
    pub alert_cooldown: Duration,
    pub disk_mount: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from every layer and validate them.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let raw = load_raw(config_path, overrides, Environment::with_prefix("PERFWATCH"))?;
        Self::from_raw(raw)
    }

    /// Convert and validate raw settings.
    pub fn from_raw(raw: RawSettings) -> Result<Self> {
        let interval = parse_duration(&raw.interval)
            .with_context(|| format!("invalid interval: {}", raw.interval))?;
        let cpu_window = parse_duration(&raw.cpu_window)
            .with_context(|| format!("invalid cpu_window: {}", raw.cpu_window))?;
        let alert_cooldown = parse_duration(&raw.cooldown)
            .with_context(|| format!("invalid cooldown: {}", raw.cooldown))?;
        let rank_key: RankKey = raw.rank.parse().map_err(anyhow::Error::msg)?;

        if interval.is_zero() {
            bail!("interval must be greater than zero");
        }
        if raw.top == 0 {
            bail!("top must be at least 1");
        }
        if raw.history == 0 {
            bail!("history must be at least 1");
        }
        if !(raw.threshold > 0.0 && raw.threshold <= 100.0) {
            bail!("threshold must be in (0, 100], got {}", raw.threshold);
        }
        let warning = raw.warning.unwrap_or(DEFAULT_WARNING.min(raw.threshold));
        if !(warning > 0.0 && warning <= raw.threshold) {
            bail!(
                "warning must be in (0, threshold], got {} with threshold {}",
                warning,
                raw.threshold
            );
        }

        Ok(Self {
            interval,
            cpu_window,
            history_capacity: raw.history,
            top_n: raw.top,
            rank_key,
            alert_threshold: raw.threshold,
            warning_threshold: warning,
            alert_cooldown,
            disk_mount: raw.disk,
            log_file: raw.log_file,
        })
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            history_capacity: self.history_capacity,
            top_n: self.top_n,
            rank_key: self.rank_key,
            alert_threshold: self.alert_threshold,
            alert_cooldown: self.alert_cooldown,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            warning: self.warning_threshold,
            critical: self.alert_threshold,
        }
    }
}

fn load_raw(
    config_path: Option<&Path>,
    overrides: &Overrides,
    environment: Environment,
) -> Result<RawSettings> {
    let builder = Config::builder()
        .set_default("interval", "1s")?
        .set_default("cpu_window", "1s")?
        .set_default("history", 30_i64)?
        .set_default("top", 10_i64)?
        .set_default("rank", "cpu")?
        .set_default("threshold", 90.0_f64)?
        .set_default("cooldown", "60s")?
        .set_default("disk", "/")?;

    let builder = match config_path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let config = builder
        .add_source(environment)
        .set_override_option("interval", overrides.interval.clone())?
        .set_override_option("cpu_window", overrides.cpu_window.clone())?
        .set_override_option("top", overrides.top.map(|n| n as i64))?
        .set_override_option("rank", overrides.rank.clone())?
        .set_override_option("threshold", overrides.threshold.map(f64::from))?
        .set_override_option("warning", overrides.warning.map(f64::from))?
        .set_override_option("cooldown", overrides.cooldown.clone())?
        .set_override_option("disk", overrides.disk.as_ref().map(|p| p.display().to_string()))?
        .set_override_option(
            "log_file",
            overrides.log_file.as_ref().map(|p| p.display().to_string()),
        )?
        .build()
        .context("failed to load configuration")?;

    Ok(config.try_deserialize()?)
}
