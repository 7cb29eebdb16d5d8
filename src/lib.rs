// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # perfwatch
//!
//! A terminal dashboard and library for watching live system performance.
//!
//! perfwatch samples CPU, memory, disk, network and temperature at a fixed
//! interval, keeps a short history of each series, ranks the busiest
//! processes and raises rate-limited alerts when CPU or memory crosses a
//! threshold. Everything it shows is also available as a library.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(Dashboard)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ poll                                                │
//! │       ▼                                                     │
//! │  ┌─────────┐   watch   ┌──────────────┐   ┌──────────────┐ │
//! │  │ Channel │◀──────────│ spawn_monitor│──▶│MetricsProvider│ │
//! │  │ Source  │           │   (tokio)    │   │  (sysinfo)   │ │
//! │  └─────────┘           └──────────────┘   └──────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`MetricsProvider`] seam over the OS, the
//!   sysinfo-backed [`SystemProvider`], and the sampling loop that publishes
//!   each tick to a [`ChannelSource`]
//! - **[`data`]**: samples, rates, bounded history, process ranking and
//!   alerting, tied together by [`Monitor::tick`]
//! - **[`app`]**: view navigation and selection state
//! - **[`ui`]**: ratatui rendering
//! - **[`config`]** and **[`logging`]**: layered settings and the tracing
//!   subscriber
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard, sampling every 2 seconds
//! perfwatch --interval 2s
//!
//! # Rank by CPU and memory, alert above 80%
//! perfwatch --rank cpu+memory --threshold 80
//!
//! # Sample once and write a JSON report
//! perfwatch --export report.json
//! ```
//!
//! ### As a library, one tick at a time
//!
//! ```no_run
//! use std::time::Duration;
//! use perfwatch::{Monitor, MonitorConfig, SystemProvider};
//!
//! let provider = SystemProvider::new(Duration::from_millis(500), "/");
//! let mut monitor = Monitor::new(provider, MonitorConfig::default());
//!
//! let dashboard = monitor.tick();
//! println!("cpu {:.1}%", dashboard.sample.cpu_percent);
//! for process in &dashboard.top {
//!     println!("{:>7} {}", process.pid, process.name);
//! }
//! ```
//!
//! ### As a library with a background sampling loop
//!
//! ```no_run
//! use std::time::Duration;
//! use perfwatch::{spawn_monitor, App, Monitor, MonitorConfig, RankKey, SystemProvider, Thresholds};
//!
//! # tokio_test::block_on(async {
//! let provider = SystemProvider::new(Duration::from_secs(1), "/");
//! let monitor = Monitor::new(provider, MonitorConfig::default());
//! let (source, handle) = spawn_monitor(monitor, Duration::from_secs(2));
//!
//! let app = App::new(Box::new(source), Thresholds::default(), RankKey::Cpu);
//! # handle.abort();
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::{Overrides, Settings};
pub use data::{
    Alert, AlertEvaluator, Dashboard, HealthStatus, History, HistoryWindow, Monitor,
    MonitorConfig, ProcessSnapshot, RankKey, RateSample, Sample, Thresholds,
};
pub use error::{Metric, MetricError};
pub use source::{
    spawn_monitor, ChannelSource, DataSource, MetricsProvider, ProcessControl, SystemControl,
    SystemProvider,
};
