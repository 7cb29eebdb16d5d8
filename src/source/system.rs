//! `sysinfo`-backed metrics provider.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use sysinfo::{Components, Disks, Networks, Pid, ProcessesToUpdate, System};
use tracing::trace;

use super::{MetricsProvider, NetworkTotals, ProcessControl};
use crate::data::process::next_nice;
use crate::data::ProcessSnapshot;
use crate::error::{Metric, MetricError};

/// Sensor labels that usually carry the CPU package temperature.
const CPU_SENSOR_HINTS: &[&str] = &["coretemp", "package", "cpu", "tctl", "k10temp"];

/// Reads metrics from the local host.
///
/// The `sysinfo` handles are kept across ticks so CPU and per-process
/// utilization can be computed from the difference between refreshes.
#[derive(Debug)]
pub struct SystemProvider {
    sys: System,
    disks: Disks,
    networks: Networks,
    components: Components,
    cpu_window: Duration,
    disk_mount: PathBuf,
    description: String,
}

impl SystemProvider {
    /// Create a provider that measures CPU over `cpu_window` and reports
    /// disk usage for the filesystem mounted at `disk_mount`.
    pub fn new<P: AsRef<Path>>(cpu_window: Duration, disk_mount: P) -> Self {
        let mut sys = System::new();
        // Prime the CPU counters, host-wide and per process, so the first
        // refresh has a baseline.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let host = System::host_name().unwrap_or_else(|| "localhost".into());
        let disk_mount = disk_mount.as_ref().to_path_buf();
        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            cpu_window: cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            disk_mount,
            description: format!("host: {}", host),
        }
    }

    pub fn cpu_window(&self) -> Duration {
        self.cpu_window
    }
}

impl MetricsProvider for SystemProvider {
    fn refresh(&mut self) {
        self.sys.refresh_cpu_usage();
        thread::sleep(self.cpu_window);
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        let updated = self.sys.refresh_processes(ProcessesToUpdate::All, true);
        trace!(updated, "refreshed processes");

        self.disks = Disks::new_with_refreshed_list();
        self.networks = Networks::new_with_refreshed_list();
        self.components = Components::new_with_refreshed_list();
    }

    fn cpu_percent(&self) -> Result<f32, MetricError> {
        if self.sys.cpus().is_empty() {
            return Err(MetricError::unavailable(Metric::Cpu, "no CPUs reported"));
        }
        Ok(self.sys.global_cpu_usage().clamp(0.0, 100.0))
    }

    fn memory_percent(&self) -> Result<f32, MetricError> {
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(MetricError::unavailable(Metric::Memory, "total memory is zero"));
        }
        Ok((self.sys.used_memory() as f64 / total as f64 * 100.0) as f32)
    }

    fn disk_percent(&self) -> Result<f32, MetricError> {
        let mounted = self.disks.iter().find(|d| d.mount_point() == self.disk_mount);

        let (total, available) = match mounted {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => self.disks.iter().fold((0u64, 0u64), |(t, a), d| {
                (t.saturating_add(d.total_space()), a.saturating_add(d.available_space()))
            }),
        };

        if total == 0 {
            return Err(MetricError::unavailable(
                Metric::Disk,
                format!("no disk found for {}", self.disk_mount.display()),
            ));
        }
        let used = total.saturating_sub(available);
        Ok((used as f64 / total as f64 * 100.0) as f32)
    }

    fn network_totals(&self) -> Result<NetworkTotals, MetricError> {
        let mut totals = NetworkTotals::default();
        let mut interfaces = 0usize;
        for (_, data) in &self.networks {
            interfaces += 1;
            totals.bytes_sent = totals.bytes_sent.saturating_add(data.total_transmitted());
            totals.bytes_recv = totals.bytes_recv.saturating_add(data.total_received());
        }
        if interfaces == 0 {
            return Err(MetricError::unavailable(Metric::Network, "no interfaces"));
        }
        Ok(totals)
    }

    fn temperature(&self) -> Result<f32, MetricError> {
        let readings: Vec<(String, f32)> = self
            .components
            .iter()
            .filter_map(|c| Some((c.label().to_lowercase(), c.temperature()?)))
            .filter(|(_, t)| t.is_finite())
            .collect();

        readings
            .iter()
            .find(|(label, _)| CPU_SENSOR_HINTS.iter().any(|hint| label.contains(hint)))
            .or_else(|| readings.first())
            .map(|(_, t)| *t)
            .ok_or_else(|| MetricError::unavailable(Metric::Temperature, "no sensors"))
    }

    fn boot_time(&self) -> Result<u64, MetricError> {
        match System::boot_time() {
            0 => Err(MetricError::unavailable(Metric::BootTime, "not reported")),
            secs => Ok(secs),
        }
    }

    fn process_ids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self
            .sys
            .processes()
            .iter()
            .filter(|(_, p)| p.thread_kind().is_none())
            .map(|(pid, _)| pid.as_u32())
            .collect();
        pids.sort_unstable();
        pids
    }

    fn process(&self, pid: u32) -> Result<ProcessSnapshot, MetricError> {
        let process = self
            .sys
            .process(Pid::from_u32(pid))
            .ok_or(MetricError::ProcessVanished { pid })?;

        let total = self.sys.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            (process.memory() as f64 / total as f64 * 100.0) as f32
        };

        Ok(ProcessSnapshot {
            pid,
            name: process.name().to_string_lossy().into_owned(),
            cpu_percent: process.cpu_usage(),
            memory_percent,
            status: process.status().into(),
        })
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Changes process priority on the local host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemControl;

impl ProcessControl for SystemControl {
    fn renice(&mut self, pid: u32, delta: i32) -> Result<i32, MetricError> {
        // pid 0 means "the calling process" to getpriority
        if pid == 0 {
            return Err(MetricError::ProcessVanished { pid });
        }
        priority::renice(pid, delta)
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
))]
mod priority {
    use std::io;

    use super::next_nice;
    use crate::error::MetricError;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn clear_errno() {
        unsafe { *libc::__errno_location() = 0 };
    }

    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
    fn clear_errno() {
        unsafe { *libc::__error() = 0 };
    }

    fn os_error(pid: u32, err: io::Error) -> MetricError {
        match err.raw_os_error() {
            Some(libc::ESRCH) => MetricError::ProcessVanished { pid },
            Some(libc::EPERM) | Some(libc::EACCES) => MetricError::PermissionDenied { pid },
            _ => MetricError::PriorityFailed {
                pid,
                reason: err.to_string(),
            },
        }
    }

    pub(super) fn renice(pid: u32, delta: i32) -> Result<i32, MetricError> {
        let who = pid as libc::id_t;

        // -1 is both a valid nice value and the error return; errno decides.
        clear_errno();
        let current = unsafe { libc::getpriority(libc::PRIO_PROCESS, who) };
        if current == -1 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(0) {
                return Err(os_error(pid, err));
            }
        }

        let target = next_nice(current, delta);
        if target == current {
            return Ok(current);
        }
        if unsafe { libc::setpriority(libc::PRIO_PROCESS, who, target) } == -1 {
            return Err(os_error(pid, io::Error::last_os_error()));
        }
        Ok(target)
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
mod priority {
    use crate::error::MetricError;

    pub(super) fn renice(_pid: u32, _delta: i32) -> Result<i32, MetricError> {
        Err(MetricError::Unsupported)
    }
}
