//! Overview view rendering.
//!
//! Gauges for the current CPU, memory and disk readings, a stats panel,
//! and text sparklines for the recent history of each charted series.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::{format_duration, format_uptime};
use crate::data::HistoryWindow;
use crate::error::Metric;
use crate::ui::{format_rate, render_sparkline};

/// Render the Overview view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let [gauges_area, lower] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(4)]).areas(area);
    let [stats_area, trends_area] =
        Layout::horizontal([Constraint::Length(36), Constraint::Min(20)]).areas(lower);

    let gauge_rows = Layout::vertical([Constraint::Length(3); 3]).split(gauges_area);
    let sample = &data.sample;
    render_gauge(frame, app, gauge_rows[0], "CPU", sample.cpu_percent, sample.has(Metric::Cpu));
    render_gauge(
        frame,
        app,
        gauge_rows[1],
        "Memory",
        sample.memory_percent,
        sample.has(Metric::Memory),
    );
    render_gauge(
        frame,
        app,
        gauge_rows[2],
        "Disk",
        sample.disk_percent,
        sample.has(Metric::Disk),
    );

    render_stats(frame, app, stats_area);
    render_trends(frame, app, trends_area);
}

fn render_gauge(frame: &mut Frame, app: &App, area: Rect, title: &str, percent: f32, ok: bool) {
    let block = app.theme.panel().title(format!(" {} ", title));

    if !ok {
        let text = Paragraph::new(" unavailable")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(app.theme.gauge_style(&app.thresholds, percent))
        .ratio(f64::from(percent.clamp(0.0, 100.0)) / 100.0)
        .label(format!("{:.1}%", percent));
    frame.render_widget(gauge, area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let sample = &data.sample;
    let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::BOLD));

    let temperature = match sample.temperature_celsius {
        Some(t) => format!("{:.1}°C", t),
        None => "n/a".to_string(),
    };
    let uptime = sample.uptime().map(format_uptime).unwrap_or_else(|| "n/a".to_string());
    let alerts = match data.cooldown_remaining {
        Some(remaining) => format!("cooling down ({})", format_duration(remaining)),
        None => "armed".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![
            label(" Upload    "),
            Span::styled(format_rate(data.rate.upload_rate), Style::default().fg(app.theme.upload)),
        ]),
        Line::from(vec![
            label(" Download  "),
            Span::styled(
                format_rate(data.rate.download_rate),
                Style::default().fg(app.theme.download),
            ),
        ]),
        Line::from(vec![label(" Temp      "), Span::raw(temperature)]),
        Line::from(vec![label(" Uptime    "), Span::raw(uptime)]),
        Line::from(vec![label(" Processes "), Span::raw(data.processes.len().to_string())]),
        Line::from(vec![label(" Alerts    "), Span::raw(alerts)]),
    ];
    if !sample.unavailable.is_empty() {
        let missing: Vec<&str> = sample.unavailable.iter().map(|m| m.label()).collect();
        lines.push(Line::from(Span::styled(
            format!(" Missing: {}", missing.join(", ")),
            Style::default().fg(app.theme.warn),
        )));
    }

    let block = app.theme.panel().title(" Stats ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_trends(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let history = &data.history;

    // Borders plus the label column
    let width = (area.width as usize).saturating_sub(2 + 12).max(1);

    let percent_line = |name: &'static str, window: &HistoryWindow<f64>| {
        let latest = window.latest().copied().unwrap_or(0.0);
        Line::from(vec![
            Span::styled(format!(" {:<10} ", name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                render_sparkline(&window.sparkline(Some(100.0)), width),
                app.theme.percent_style(&app.thresholds, latest as f32),
            ),
        ])
    };
    let rate_line = |name: &'static str, window: &HistoryWindow<f64>, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {:<10} ", name), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                render_sparkline(&window.sparkline(None), width),
                Style::default().fg(color),
            ),
        ])
    };

    let lines = vec![
        percent_line("CPU", &history.cpu),
        percent_line("Memory", &history.memory),
        rate_line("Upload", &history.upload, app.theme.upload),
        rate_line("Download", &history.download, app.theme.download),
        Line::from(Span::styled(
            format!(
                " peak up {} / down {}",
                format_rate(history.upload.max()),
                format_rate(history.download.max())
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = app.theme.panel().title(format!(" Trends (last {}) ", history.len()));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
