//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::data::export::write_export;
use crate::data::{top_n, Alert, Dashboard, ProcessSnapshot, RankKey, Thresholds};
use crate::source::{DataSource, ProcessControl};
use crate::ui::Theme;

/// How long a new alert stays in the banner.
const ALERT_BANNER_TTL: Duration = Duration::from_secs(10);

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Process detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Gauges and trends for the host-level metrics.
    Overview,
    /// Top processes by resource usage.
    Processes,
    /// Log of threshold alerts.
    Alerts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Processes,
            View::Processes => View::Alerts,
            View::Alerts => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Alerts,
            View::Processes => View::Overview,
            View::Alerts => View::Processes,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Processes => "Processes",
            View::Alerts => "Alerts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    control: Option<Box<dyn ProcessControl>>,
    pub data: Option<Dashboard>,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,

    // Process selection, tracked by pid so it survives re-ranking
    pub selected_index: usize,
    pub selected_pid: Option<u32>,
    pub rank_key: RankKey,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Temporary feedback
    pub status_message: Option<(String, Instant)>,
    pub alert_banner: Option<(Alert, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds, rank_key: RankKey) -> Self {
        Self::with_theme(source, thresholds, rank_key, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (skips terminal detection).
    pub fn with_theme(
        source: Box<dyn DataSource>,
        thresholds: Thresholds,
        rank_key: RankKey,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            source,
            control: None,
            data: None,
            last_updated: None,
            load_error: None,
            thresholds,
            selected_index: 0,
            selected_pid: None,
            rank_key,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
            alert_banner: None,
        }
    }

    /// Allow the selected process's priority to be changed through `control`.
    pub fn with_control(mut self, control: Box<dyn ProcessControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// The most recent alert, while it is still fresh.
    pub fn active_alert(&self) -> Option<&Alert> {
        match &self.alert_banner {
            Some((alert, time)) if time.elapsed() < ALERT_BANNER_TTL => Some(alert),
            _ => None,
        }
    }

    /// Poll the data source for a new dashboard.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) otherwise.
    pub fn reload_data(&mut self) -> Result<bool> {
        let Some(dashboard) = self.source.poll() else {
            if let Some(err) = self.source.error() {
                self.load_error = Some(err.to_string());
            }
            return Ok(false);
        };

        if let Some(ref alert) = dashboard.alert {
            self.alert_banner = Some((alert.clone(), Instant::now()));
        }
        self.data = Some(dashboard);
        self.last_updated = Some(Instant::now());
        self.load_error = None;
        self.restore_selection();
        Ok(true)
    }

    /// Processes shown in the Processes view.
    ///
    /// Without a filter this is the dashboard's top N. With one, the
    /// filter runs over every process first, so a match outside the top N
    /// still shows up.
    pub fn visible_processes(&self) -> Vec<ProcessSnapshot> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        if self.filter_text.is_empty() {
            return data.top_by(self.rank_key);
        }
        let matching: Vec<ProcessSnapshot> = data
            .processes
            .iter()
            .filter(|p| self.matches_filter(p))
            .cloned()
            .collect();
        top_n(&matching, data.top_n, self.rank_key)
    }

    /// The currently selected process, if any.
    pub fn selected_process(&self) -> Option<ProcessSnapshot> {
        self.visible_processes().into_iter().nth(self.selected_index)
    }

    /// Keep the same pid selected across ticks, falling back to clamping.
    fn restore_selection(&mut self) {
        let visible = self.visible_processes();
        if let Some(pid) = self.selected_pid {
            if let Some(index) = visible.iter().position(|p| p.pid == pid) {
                self.selected_index = index;
                return;
            }
        }
        self.selected_index = self.selected_index.min(visible.len().saturating_sub(1));
        self.selected_pid = visible.get(self.selected_index).map(|p| p.pid);
    }

    /// Select the item at `index`, clamped to the visible list.
    pub fn select_index(&mut self, index: usize) {
        let visible = self.visible_processes();
        self.selected_index = index.min(visible.len().saturating_sub(1));
        self.selected_pid = visible.get(self.selected_index).map(|p| p.pid);
    }

    /// Switch to the next view (cycles through Overview → Processes → Alerts).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        self.select_index(self.selected_index.saturating_add(n));
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.select_index(self.selected_index.saturating_sub(n));
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.select_index(0);
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.select_index(usize::MAX);
    }

    /// Open the detail overlay for the selected process.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Processes && self.selected_process().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to Overview.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        self.current_view = View::Overview;
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Switch between ranking by CPU and by CPU+memory.
    pub fn cycle_rank_key(&mut self) {
        self.rank_key = self.rank_key.next();
        self.restore_selection();
    }

    /// Change the selected process's nice value by `delta`.
    ///
    /// A negative delta raises priority. The outcome goes to the status bar.
    pub fn adjust_priority(&mut self, delta: i32) {
        let Some(process) = self.selected_process() else {
            self.set_status_message("Select a process first".to_string());
            return;
        };
        let Some(ref mut control) = self.control else {
            self.set_status_message("Priority changes unavailable".to_string());
            return;
        };

        match control.renice(process.pid, delta) {
            Ok(nice) => {
                info!(pid = process.pid, name = %process.name, nice, "changed priority");
                self.set_status_message(format!(
                    "{} ({}): nice {}",
                    process.name, process.pid, nice
                ));
            }
            Err(e) => {
                warn!(pid = process.pid, error = %e, "priority change failed");
                self.set_status_message(format!("Cannot change priority: {e}"));
            }
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.restore_selection();
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.restore_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.restore_selection();
    }

    /// Check if a process matches the current filter (name or pid).
    pub fn matches_filter(&self, process: &ProcessSnapshot) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        process.name.to_lowercase().contains(&search) || process.pid.to_string().contains(&search)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current dashboard to a file, ranked the way it is shown.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        let mut shown = data.clone();
        shown.top = data.top_by(self.rank_key);
        shown.rank_key = self.rank_key;
        write_export(&shown, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sampler::tests::ScriptedProvider;
    use crate::data::{Monitor, MonitorConfig};
    use crate::source::ChannelSource;

    fn app_with(monitor: &mut Monitor<ScriptedProvider>) -> (tokio::sync::watch::Sender<Option<Dashboard>>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Some(monitor.tick())).unwrap();
        let mut app = App::with_theme(
            Box::new(source),
            Thresholds::default(),
            RankKey::Cpu,
            Theme::dark(),
        );
        assert!(app.reload_data().unwrap());
        (tx, app)
    }

    fn provider() -> ScriptedProvider {
        ScriptedProvider::default()
            .with_process(1, 50.0, 1.0)
            .with_process(2, 30.0, 60.0)
            .with_process(3, 10.0, 2.0)
    }

    #[test]
    fn test_selection_follows_pid_across_ticks() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (tx, mut app) = app_with(&mut monitor);

        app.select_next();
        assert_eq!(app.selected_process().map(|p| p.pid), Some(2));

        // pid 2 jumps to the top of the ranking
        monitor
            .provider_mut()
            .processes
            .get_mut(&2)
            .unwrap()
            .cpu_percent = 90.0;
        tx.send(Some(monitor.tick())).unwrap();
        assert!(app.reload_data().unwrap());

        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_process().map(|p| p.pid), Some(2));
    }

    #[test]
    fn test_rank_key_toggle_reorders() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);

        let pids: Vec<u32> = app.visible_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 2, 3]);

        app.cycle_rank_key();
        let pids: Vec<u32> = app.visible_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 1, 3]);
    }

    #[test]
    fn test_filter_by_name_and_pid() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);

        app.filter_push('3');
        let pids: Vec<u32> = app.visible_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![3]);
        assert_eq!(app.selected_index, 0);

        app.clear_filter();
        assert_eq!(app.visible_processes().len(), 3);
    }

    #[test]
    fn test_selection_clamps() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);

        app.select_last();
        assert_eq!(app.selected_index, 2);
        app.select_next_n(10);
        assert_eq!(app.selected_index, 2);
        app.select_prev_n(10);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_alert_banner_set_on_alert() {
        let mut monitor = Monitor::new(
            ScriptedProvider {
                memory: Ok(99.0),
                ..Default::default()
            },
            MonitorConfig::default(),
        );
        let (_tx, app) = app_with(&mut monitor);
        assert_eq!(
            app.active_alert().map(|a| a.metric),
            Some(crate::error::Metric::Memory)
        );
    }

    #[test]
    fn test_detail_only_in_processes_view() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);

        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.set_view(View::Processes);
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Processes);
        app.go_back();
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_filter_reaches_beyond_top_n() {
        // Twelve busy processes push pid 99 out of the default top 10
        let mut provider = ScriptedProvider::default().with_process(99, 0.5, 0.1);
        for pid in 1..=12 {
            provider = provider.with_process(pid, 10.0 + pid as f32, 1.0);
        }
        let mut monitor = Monitor::new(provider, MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);
        assert_eq!(app.visible_processes().len(), 10);
        assert!(app.visible_processes().iter().all(|p| p.pid != 99));

        for c in "proc99".chars() {
            app.filter_push(c);
        }
        let pids: Vec<u32> = app.visible_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![99]);
        assert_eq!(app.selected_pid, Some(99));

        // "1" matches pids 1 and 10..=12; still capped and ranked
        app.clear_filter();
        app.filter_push('1');
        let pids: Vec<u32> = app.visible_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![12, 11, 10, 1]);
    }

    #[test]
    fn test_export_uses_shown_ranking() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);
        app.cycle_rank_key();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        app.export_state(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["rank_key"], "cpu+memory");
        let pids: Vec<u64> = value["processes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["pid"].as_u64().unwrap())
            .collect();
        assert_eq!(pids, vec![2, 1, 3]);
    }

    fn app_with_control(provider: ScriptedProvider) -> App {
        let mut monitor = Monitor::new(provider.clone(), MonitorConfig::default());
        let (_tx, app) = app_with(&mut monitor);
        app.with_control(Box::new(provider))
    }

    #[test]
    fn test_adjust_priority_reports_nice() {
        let mut app = app_with_control(provider());
        app.set_view(View::Processes);

        app.adjust_priority(-1);
        assert_eq!(app.get_status_message(), Some("proc1 (1): nice -1"));
        app.adjust_priority(1);
        app.adjust_priority(1);
        assert_eq!(app.get_status_message(), Some("proc1 (1): nice 1"));

        for _ in 0..40 {
            app.adjust_priority(1);
        }
        assert_eq!(app.get_status_message(), Some("proc1 (1): nice 19"));
    }

    #[test]
    fn test_adjust_priority_errors() {
        let mut provider = provider();
        provider.protected.insert(2);
        let mut app = app_with_control(provider);

        app.select_index(1);
        app.adjust_priority(-1);
        assert_eq!(
            app.get_status_message(),
            Some("Cannot change priority: permission denied for process 2")
        );

        // pid 1 exits between the last tick and the key press
        let mut gone = ScriptedProvider::default().with_process(1, 50.0, 1.0);
        gone.processes.remove(&1);
        app.control = Some(Box::new(gone));
        app.select_index(0);
        app.adjust_priority(1);
        assert_eq!(
            app.get_status_message(),
            Some("Cannot change priority: process 1 vanished")
        );
    }

    #[test]
    fn test_adjust_priority_without_control() {
        let mut monitor = Monitor::new(provider(), MonitorConfig::default());
        let (_tx, mut app) = app_with(&mut monitor);
        app.adjust_priority(-1);
        assert_eq!(app.get_status_message(), Some("Priority changes unavailable"));
    }

    #[test]
    fn test_export_without_data_fails() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::with_theme(
            Box::new(source),
            Thresholds::default(),
            RankKey::Cpu,
            Theme::dark(),
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("out.json")).is_err());
    }
}
