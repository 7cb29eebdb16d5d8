//! Metric models and the per-tick processing pipeline.
//!
//! ## Submodules
//!
//! - [`sample`]: [`Sample`] readings and network [`rate`] derivation
//! - [`sampler`]: [`Sampler`], which turns provider reads into samples
//! - [`history`]: bounded [`HistoryWindow`]s for sparklines
//! - [`process`]: [`ProcessSnapshot`] and the [`top_n`] ranker
//! - [`alert`]: [`AlertEvaluator`] with threshold and cooldown
//! - [`monitor`]: [`Monitor`], which ties the above into one tick
//! - [`export`]: JSON export of a [`Dashboard`]
//! - [`duration`]: parsing and formatting of duration strings
//!
//! ## Data Flow
//!
//! ```text
//! MetricsProvider::refresh()
//!        │
//!        ▼
//! Sampler::sample() ──▶ rate(previous, current)
//!        │                      │
//!        ▼                      ▼
//! Sampler::processes()    History::record()
//!        │
//!        ├──▶ top_n()
//!        └──▶ AlertEvaluator::evaluate()
//!                     │
//!                     ▼
//!                 Dashboard
//! ```

pub mod alert;
pub mod duration;
pub mod export;
pub mod history;
pub mod monitor;
pub mod process;
pub mod sample;
pub mod sampler;

pub use alert::{Alert, AlertEvaluator, AlertPhase, AlertState};
pub use history::{History, HistoryWindow};
pub use monitor::{Dashboard, HealthStatus, Monitor, MonitorConfig, Thresholds};
pub use process::{top_n, ProcessSnapshot, ProcessStatus, RankKey};
pub use sample::{rate, RateSample, Sample};
pub use sampler::Sampler;
