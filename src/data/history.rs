//! Rolling history windows for charts and sparklines.

use std::collections::VecDeque;
use std::time::SystemTime;

use serde::Serialize;

use super::sample::{RateSample, Sample};

/// Number of points kept per series.
pub const DEFAULT_CAPACITY: usize = 30;

/// A bounded, chronologically ordered window of values.
///
/// Once full, every push evicts the oldest value first, so the window
/// always holds the most recent `capacity` values, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryWindow<T> {
    #[serde(skip)]
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> HistoryWindow<T> {
    /// Create an empty window. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }
}

impl<T: Clone> HistoryWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

impl HistoryWindow<f64> {
    /// Largest value in the window, or 0 when empty.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Normalize values to 0-7 for 8 bar levels.
    ///
    /// `ceiling` fixes the top of the scale (e.g. 100 for percentages);
    /// `None` scales against the window's own maximum.
    pub fn sparkline(&self, ceiling: Option<f64>) -> Vec<u8> {
        let top = ceiling.unwrap_or_else(|| self.max());
        if top <= 0.0 {
            return vec![0; self.values.len()];
        }

        self.values
            .iter()
            .map(|&v| {
                let normalized = (v.max(0.0) / top * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }
}

/// Independent windows for every charted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    pub cpu: HistoryWindow<f64>,
    pub memory: HistoryWindow<f64>,
    /// Upload throughput in bytes/second.
    pub upload: HistoryWindow<f64>,
    /// Download throughput in bytes/second.
    pub download: HistoryWindow<f64>,
    pub timestamps: HistoryWindow<SystemTime>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu: HistoryWindow::new(capacity),
            memory: HistoryWindow::new(capacity),
            upload: HistoryWindow::new(capacity),
            download: HistoryWindow::new(capacity),
            timestamps: HistoryWindow::new(capacity),
        }
    }

    /// Record one tick across all series.
    pub fn record(&mut self, sample: &Sample, rate: &RateSample) {
        self.cpu.push(f64::from(sample.cpu_percent));
        self.memory.push(f64::from(sample.memory_percent));
        self.upload.push(rate.upload_rate);
        self.download.push(rate.download_rate);
        self.timestamps.push(sample.timestamp);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = HistoryWindow::new(30);
        for v in (10..=310).step_by(10) {
            window.push(v);
        }

        assert_eq!(window.len(), 30);
        let expected: Vec<i32> = (20..=310).step_by(10).collect();
        assert_eq!(window.to_vec(), expected);
        assert_eq!(window.latest(), Some(&310));
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        for capacity in [1, 2, 5, 30] {
            let mut window = HistoryWindow::new(capacity);
            for v in 0..(capacity * 3 + 1) {
                window.push(v);
                assert!(window.len() <= capacity);
            }
            assert_eq!(window.len(), capacity);
            let expected: Vec<usize> = (capacity * 2 + 1..capacity * 3 + 1).collect();
            assert_eq!(window.to_vec(), expected);
        }
    }

    #[test]
    fn test_window_below_capacity_keeps_everything() {
        let mut window = HistoryWindow::new(30);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.to_vec(), vec![1.0, 2.0]);
        assert_eq!(window.capacity(), 30);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut window = HistoryWindow::new(0);
        window.push('a');
        window.push('b');
        assert_eq!(window.to_vec(), vec!['b']);
    }

    #[test]
    fn test_sparkline_fixed_ceiling() {
        let mut window = HistoryWindow::new(4);
        for v in [0.0, 50.0, 100.0, 150.0] {
            window.push(v);
        }
        assert_eq!(window.sparkline(Some(100.0)), vec![0, 4, 7, 7]);
    }

    #[test]
    fn test_sparkline_self_scaled() {
        let mut window = HistoryWindow::new(3);
        for v in [0.0, 0.0, 0.0] {
            window.push(v);
        }
        assert_eq!(window.sparkline(None), vec![0, 0, 0]);

        window.push(10.0);
        assert_eq!(window.sparkline(None), vec![0, 0, 7]);
    }

    #[test]
    fn test_history_windows_are_independent() {
        let mut history = History::new(2);
        let mut sample = Sample::empty(SystemTime::UNIX_EPOCH);
        sample.cpu_percent = 10.0;
        sample.memory_percent = 40.0;
        let rate = RateSample {
            upload_rate: 5.0,
            download_rate: 7.0,
            elapsed_secs: 1.0,
        };
        history.record(&sample, &rate);

        sample.timestamp += Duration::from_secs(1);
        sample.cpu_percent = 20.0;
        history.record(&sample, &RateSample::ZERO);

        assert_eq!(history.cpu.to_vec(), vec![10.0, 20.0]);
        assert_eq!(history.memory.to_vec(), vec![40.0, 40.0]);
        assert_eq!(history.upload.to_vec(), vec![5.0, 0.0]);
        assert_eq!(history.download.to_vec(), vec![7.0, 0.0]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_mean_and_max() {
        let mut window = HistoryWindow::new(3);
        assert_eq!(window.mean(), None);
        assert_eq!(window.max(), 0.0);
        window.push(1.0);
        window.push(5.0);
        assert_eq!(window.mean(), Some(3.0));
        assert_eq!(window.max(), 5.0);
    }
}
