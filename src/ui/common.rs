//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_uptime;
use crate::data::HealthStatus;

/// Render the header bar with the host's overall state.
///
/// Displays: status indicator, source, CPU and memory, uptime, and the
/// latest alert while it is fresh.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" PERFWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Sampling..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let sample = &data.sample;
    let worst = [sample.cpu_percent, sample.memory_percent, sample.disk_percent]
        .into_iter()
        .map(|p| app.thresholds.status(p))
        .max()
        .unwrap_or(HealthStatus::Healthy);

    let mut spans = vec![
        Span::styled(" ● ", app.theme.level_style(worst)),
        Span::styled("PERFWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("│ {} │ ", data.source)),
        Span::raw("CPU "),
        Span::styled(
            format!("{:.1}%", sample.cpu_percent),
            app.theme.percent_style(&app.thresholds, sample.cpu_percent),
        ),
        Span::raw(" MEM "),
        Span::styled(
            format!("{:.1}%", sample.memory_percent),
            app.theme.percent_style(&app.thresholds, sample.memory_percent),
        ),
    ];
    if let Some(uptime) = sample.uptime() {
        spans.push(Span::raw(format!(" │ up {}", format_uptime(uptime))));
    }
    if let Some(alert) = app.active_alert() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("⚠ {}", alert.message()),
            Style::default().fg(app.theme.crit).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let alert_count = app.data.as_ref().map_or(0, |d| d.recent_alerts.len());
    let titles: Vec<Line> = vec![
        Line::from(" 1:Overview "),
        Line::from(" 2:Processes "),
        Line::from(format!(" 3:Alerts ({}) ", alert_count)),
    ];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Processes => 1,
        View::Alerts => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the view, time since last update, and the controls that apply.
/// Temporary status messages and errors take its place.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit", err)
    } else if let Some(updated) = app.last_updated {
        let controls = match app.current_view {
            View::Processes if app.filter_active => "Type to search | Enter:apply Esc:cancel",
            View::Processes => "/:search s:rank +/-:priority Enter:detail ?:help q:quit",
            View::Overview | View::Alerts => "Tab:switch s:rank e:export ?:help q:quit",
        };
        format!(
            " {} | Updated {:.1}s ago | {}",
            app.current_view.label(),
            updated.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        " Sampling... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1/2/3       Overview/Processes/Alerts"),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Process detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Processes"),
        Line::from("  /         Filter by name or pid"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Toggle CPU / CPU+memory rank"),
        Line::from("  +         Raise priority (nice -1)"),
        Line::from("  -         Lower priority (nice +1)"),
        Line::from(""),
        section(" General"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = app.theme.overlay().title(" Help ");

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
