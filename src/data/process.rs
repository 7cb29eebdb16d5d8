//! Per-process snapshots and top-N ranking.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scheduler state of a process, collapsed to the states worth showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Dead,
    Unknown,
}

impl ProcessStatus {
    /// Returns a short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "run",
            ProcessStatus::Sleeping => "sleep",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Stopped => "stop",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::Unknown => "?",
        }
    }
}

impl From<sysinfo::ProcessStatus> for ProcessStatus {
    fn from(status: sysinfo::ProcessStatus) -> Self {
        use sysinfo::ProcessStatus as Os;
        match status {
            Os::Run => ProcessStatus::Running,
            Os::Sleep | Os::UninterruptibleDiskSleep | Os::Waking | Os::Wakekill => {
                ProcessStatus::Sleeping
            }
            Os::Idle | Os::Parked => ProcessStatus::Idle,
            Os::Stop | Os::Tracing => ProcessStatus::Stopped,
            Os::Zombie => ProcessStatus::Zombie,
            Os::Dead => ProcessStatus::Dead,
            _ => ProcessStatus::Unknown,
        }
    }
}

/// Highest scheduling priority (lowest nice value).
pub const NICE_MIN: i32 = -20;
/// Lowest scheduling priority (highest nice value).
pub const NICE_MAX: i32 = 19;

/// The nice value after applying `delta` to `current`, kept in range.
pub fn next_nice(current: i32, delta: i32) -> i32 {
    current.saturating_add(delta).clamp(NICE_MIN, NICE_MAX)
}

/// Resource usage of one process at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    /// Percent of one core; may exceed 100 on multi-core hosts.
    pub cpu_percent: f32,
    /// Percent of total physical memory.
    pub memory_percent: f32,
    pub status: ProcessStatus,
}

/// Key used to rank processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankKey {
    /// CPU percent alone.
    #[default]
    #[serde(rename = "cpu")]
    Cpu,
    /// CPU percent plus memory percent.
    #[serde(rename = "cpu+memory")]
    CpuMemory,
}

impl RankKey {
    /// The value a process is ranked by under this key.
    pub fn score(&self, process: &ProcessSnapshot) -> f32 {
        match self {
            RankKey::Cpu => process.cpu_percent,
            RankKey::CpuMemory => process.cpu_percent + process.memory_percent,
        }
    }

    /// Toggle between the two keys.
    pub fn next(self) -> Self {
        match self {
            RankKey::Cpu => RankKey::CpuMemory,
            RankKey::CpuMemory => RankKey::Cpu,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankKey::Cpu => "cpu",
            RankKey::CpuMemory => "cpu+memory",
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RankKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(RankKey::Cpu),
            "cpu+memory" | "cpu+mem" | "combined" => Ok(RankKey::CpuMemory),
            other => Err(format!("unknown rank key: {other} (expected cpu or cpu+memory)")),
        }
    }
}

/// Return at most `n` processes, highest `key` score first.
///
/// The sort is stable, so equal scores keep their enumeration order and
/// rows do not swap places between identical ticks.
pub fn top_n(processes: &[ProcessSnapshot], n: usize, key: RankKey) -> Vec<ProcessSnapshot> {
    let mut ranked: Vec<&ProcessSnapshot> = processes.iter().collect();
    ranked.sort_by(|a, b| compare_desc(key.score(a), key.score(b)));
    ranked.into_iter().take(n).cloned().collect()
}

fn compare_desc(a: f32, b: f32) -> Ordering {
    // NaN scores sink to the bottom.
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, cpu: f32, mem: f32) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            name: format!("proc{pid}"),
            cpu_percent: cpu,
            memory_percent: mem,
            status: ProcessStatus::Running,
        }
    }

    fn pids(list: &[ProcessSnapshot]) -> Vec<u32> {
        list.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_top_n_sorts_descending_by_cpu() {
        let list = vec![proc(1, 5.0, 0.0), proc(2, 50.0, 0.0), proc(3, 20.0, 0.0)];
        let top = top_n(&list, 10, RankKey::Cpu);
        assert_eq!(pids(&top), vec![2, 3, 1]);
    }

    #[test]
    fn test_top_n_truncates() {
        let list: Vec<_> = (0..20).map(|i| proc(i, i as f32, 0.0)).collect();
        let top = top_n(&list, 5, RankKey::Cpu);
        assert_eq!(pids(&top), vec![19, 18, 17, 16, 15]);
    }

    #[test]
    fn test_top_n_ties_keep_enumeration_order() {
        let list = vec![
            proc(7, 1.0, 0.0),
            proc(3, 2.0, 0.0),
            proc(9, 1.0, 0.0),
            proc(1, 1.0, 0.0),
        ];
        let top = top_n(&list, 4, RankKey::Cpu);
        assert_eq!(pids(&top), vec![3, 7, 9, 1]);
    }

    #[test]
    fn test_top_n_combined_key() {
        let list = vec![proc(1, 10.0, 1.0), proc(2, 5.0, 30.0), proc(3, 12.0, 0.0)];
        assert_eq!(pids(&top_n(&list, 3, RankKey::Cpu)), vec![3, 1, 2]);
        assert_eq!(pids(&top_n(&list, 3, RankKey::CpuMemory)), vec![2, 3, 1]);
    }

    #[test]
    fn test_top_n_idempotent() {
        let list = vec![
            proc(4, 3.0, 1.0),
            proc(5, 3.0, 1.0),
            proc(6, 9.0, 0.5),
            proc(8, 0.0, 0.0),
        ];
        let first = top_n(&list, 3, RankKey::CpuMemory);
        let second = top_n(&list, 3, RankKey::CpuMemory);
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_n_nan_sinks() {
        let list = vec![proc(1, f32::NAN, 0.0), proc(2, 1.0, 0.0)];
        assert_eq!(pids(&top_n(&list, 2, RankKey::Cpu)), vec![2, 1]);
    }

    #[test]
    fn test_top_n_empty_and_zero() {
        assert!(top_n(&[], 5, RankKey::Cpu).is_empty());
        assert!(top_n(&[proc(1, 1.0, 1.0)], 0, RankKey::Cpu).is_empty());
    }

    #[test]
    fn test_rank_key_parse() {
        assert_eq!("cpu".parse::<RankKey>(), Ok(RankKey::Cpu));
        assert_eq!("CPU+Memory".parse::<RankKey>(), Ok(RankKey::CpuMemory));
        assert!("disk".parse::<RankKey>().is_err());
        assert_eq!(RankKey::Cpu.next(), RankKey::CpuMemory);
    }

    #[test]
    fn test_next_nice_clamps() {
        assert_eq!(next_nice(0, -1), -1);
        assert_eq!(next_nice(0, 1), 1);
        assert_eq!(next_nice(NICE_MIN, -1), NICE_MIN);
        assert_eq!(next_nice(NICE_MAX, 1), NICE_MAX);
        assert_eq!(next_nice(10, 100), NICE_MAX);
    }
}
