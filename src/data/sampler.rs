//! Per-tick sampling on top of a [`MetricsProvider`].

use tracing::{trace, warn};

use super::process::ProcessSnapshot;
use super::sample::Sample;
use crate::error::{Metric, MetricError};
use crate::source::MetricsProvider;

/// Turns provider reads into [`Sample`]s.
///
/// A metric that fails to read is recorded in `Sample::unavailable` and
/// left at zero; it never aborts the sample. [`Sampler::sample`] blocks for
/// the provider's CPU window and takes `&mut self`, so it cannot run
/// concurrently with itself.
#[derive(Debug)]
pub struct Sampler<P> {
    provider: P,
}

impl<P: MetricsProvider> Sampler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn description(&self) -> &str {
        self.provider.description()
    }

    /// Refresh the provider and read every host-level metric.
    pub fn sample(&mut self) -> Sample {
        self.provider.refresh();

        let mut sample = Sample::empty(self.provider.now());

        if let Some(cpu) = read(self.provider.cpu_percent(), Metric::Cpu, &mut sample) {
            sample.cpu_percent = cpu;
        }
        if let Some(memory) = read(self.provider.memory_percent(), Metric::Memory, &mut sample) {
            sample.memory_percent = memory;
        }
        if let Some(disk) = read(self.provider.disk_percent(), Metric::Disk, &mut sample) {
            sample.disk_percent = disk;
        }
        if let Some(net) = read(self.provider.network_totals(), Metric::Network, &mut sample) {
            sample.net_bytes_sent = net.bytes_sent;
            sample.net_bytes_recv = net.bytes_recv;
        }
        sample.temperature_celsius =
            read(self.provider.temperature(), Metric::Temperature, &mut sample);
        sample.boot_time = read(self.provider.boot_time(), Metric::BootTime, &mut sample);

        sample
    }

    /// Enumerate processes as of the last refresh.
    ///
    /// Processes that exit between enumeration and the detail read are
    /// skipped.
    pub fn processes(&self) -> Vec<ProcessSnapshot> {
        self.provider
            .process_ids()
            .into_iter()
            .filter_map(|pid| match self.provider.process(pid) {
                Ok(snapshot) => Some(snapshot),
                Err(MetricError::ProcessVanished { pid }) => {
                    trace!(pid, "process exited before it could be read");
                    None
                }
                Err(e) => {
                    trace!(pid, error = %e, "skipping unreadable process");
                    None
                }
            })
            .collect()
    }
}

fn read<T>(result: Result<T, MetricError>, metric: Metric, sample: &mut Sample) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            // Temperature is missing on most virtual machines; keep it quiet.
            if metric == Metric::Temperature {
                trace!(error = %e, "metric unavailable");
            } else {
                warn!(error = %e, "metric unavailable");
            }
            sample.unavailable.push(metric);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::data::process::{next_nice, ProcessStatus};
    use crate::source::{NetworkTotals, ProcessControl};

    /// Provider whose readings are set directly by the test.
    #[derive(Debug, Clone)]
    pub(crate) struct ScriptedProvider {
        pub now: SystemTime,
        pub step: Duration,
        pub cpu: Result<f32, MetricError>,
        pub memory: Result<f32, MetricError>,
        pub disk: Result<f32, MetricError>,
        pub network: Result<NetworkTotals, MetricError>,
        pub temperature: Result<f32, MetricError>,
        pub boot_time: Result<u64, MetricError>,
        pub processes: BTreeMap<u32, ProcessSnapshot>,
        /// Pids that are enumerated but gone by the time they are read.
        pub vanished: BTreeSet<u32>,
        pub refreshes: usize,
        /// Nice values set through `renice`; unlisted pids start at 0.
        pub nice: BTreeMap<u32, i32>,
        /// Pids whose priority the caller may not change.
        pub protected: BTreeSet<u32>,
    }

    impl Default for ScriptedProvider {
        fn default() -> Self {
            Self {
                now: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000),
                step: Duration::from_secs(1),
                cpu: Ok(10.0),
                memory: Ok(20.0),
                disk: Ok(30.0),
                network: Ok(NetworkTotals::default()),
                temperature: Ok(45.0),
                boot_time: Ok(400),
                processes: BTreeMap::new(),
                vanished: BTreeSet::new(),
                refreshes: 0,
                nice: BTreeMap::new(),
                protected: BTreeSet::new(),
            }
        }
    }

    impl ScriptedProvider {
        pub fn with_process(mut self, pid: u32, cpu: f32, memory: f32) -> Self {
            self.processes.insert(
                pid,
                ProcessSnapshot {
                    pid,
                    name: format!("proc{pid}"),
                    cpu_percent: cpu,
                    memory_percent: memory,
                    status: ProcessStatus::Running,
                },
            );
            self
        }
    }

    impl ProcessControl for ScriptedProvider {
        fn renice(&mut self, pid: u32, delta: i32) -> Result<i32, MetricError> {
            if !self.processes.contains_key(&pid) || self.vanished.contains(&pid) {
                return Err(MetricError::ProcessVanished { pid });
            }
            if self.protected.contains(&pid) {
                return Err(MetricError::PermissionDenied { pid });
            }
            let nice = self.nice.entry(pid).or_insert(0);
            *nice = next_nice(*nice, delta);
            Ok(*nice)
        }
    }

    impl MetricsProvider for ScriptedProvider {
        fn refresh(&mut self) {
            if self.refreshes > 0 {
                self.now += self.step;
            }
            self.refreshes += 1;
        }

        fn cpu_percent(&self) -> Result<f32, MetricError> {
            self.cpu.clone()
        }

        fn memory_percent(&self) -> Result<f32, MetricError> {
            self.memory.clone()
        }

        fn disk_percent(&self) -> Result<f32, MetricError> {
            self.disk.clone()
        }

        fn network_totals(&self) -> Result<NetworkTotals, MetricError> {
            self.network.clone()
        }

        fn temperature(&self) -> Result<f32, MetricError> {
            self.temperature.clone()
        }

        fn boot_time(&self) -> Result<u64, MetricError> {
            self.boot_time.clone()
        }

        fn process_ids(&self) -> Vec<u32> {
            self.processes.keys().chain(self.vanished.iter()).copied().collect()
        }

        fn process(&self, pid: u32) -> Result<ProcessSnapshot, MetricError> {
            self.processes.get(&pid).cloned().ok_or(MetricError::ProcessVanished { pid })
        }

        fn now(&self) -> SystemTime {
            self.now
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_sample_reads_all_metrics() {
        let provider = ScriptedProvider {
            network: Ok(NetworkTotals {
                bytes_sent: 100,
                bytes_recv: 200,
            }),
            ..Default::default()
        };
        let mut sampler = Sampler::new(provider);

        let sample = sampler.sample();
        assert_eq!(sample.cpu_percent, 10.0);
        assert_eq!(sample.memory_percent, 20.0);
        assert_eq!(sample.disk_percent, 30.0);
        assert_eq!(sample.net_bytes_sent, 100);
        assert_eq!(sample.net_bytes_recv, 200);
        assert_eq!(sample.temperature_celsius, Some(45.0));
        assert_eq!(sample.boot_time, Some(400));
        assert!(sample.unavailable.is_empty());
        assert_eq!(sampler.provider().refreshes, 1);
    }

    #[test]
    fn test_unavailable_metric_is_omitted_not_fatal() {
        let provider = ScriptedProvider {
            temperature: Err(MetricError::unavailable(Metric::Temperature, "no sensors")),
            disk: Err(MetricError::unavailable(Metric::Disk, "no disk")),
            ..Default::default()
        };
        let mut sampler = Sampler::new(provider);

        let sample = sampler.sample();
        assert_eq!(sample.temperature_celsius, None);
        assert_eq!(sample.disk_percent, 0.0);
        assert_eq!(sample.cpu_percent, 10.0);
        assert_eq!(sample.unavailable, vec![Metric::Disk, Metric::Temperature]);
    }

    #[test]
    fn test_timestamps_advance_per_sample() {
        let mut sampler = Sampler::new(ScriptedProvider::default());
        let first = sampler.sample();
        let second = sampler.sample();
        assert_eq!(
            second.timestamp.duration_since(first.timestamp).unwrap(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_vanished_processes_are_skipped() {
        let mut provider =
            ScriptedProvider::default().with_process(1, 5.0, 1.0).with_process(2, 1.0, 1.0);
        provider.vanished.insert(3);
        let sampler = Sampler::new(provider);

        let pids: Vec<u32> = sampler.processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 2]);
    }
}
