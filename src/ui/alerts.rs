//! Alerts view rendering.

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::data::HealthStatus;

/// Render the alert log, newest first.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let cooldown = match data.cooldown_remaining {
        Some(remaining) => format!("next alert in {}", format_duration(remaining)),
        None => "armed".to_string(),
    };
    let block = app.theme.panel()
        .title(format!(
            " Alerts ({}) | threshold {:.0}% | {} ",
            data.recent_alerts.len(),
            app.thresholds.critical,
            cooldown
        ));

    if data.recent_alerts.is_empty() {
        render_quiet_message(frame, app, area, block);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Metric"),
        Cell::from("Value"),
        Cell::from("Message"),
    ])
    .height(1)
    .style(app.theme.header);

    let critical = app.theme.level_style(HealthStatus::Critical);
    let rows: Vec<Row> = data
        .recent_alerts
        .iter()
        .rev()
        .map(|alert| {
            Row::new(vec![
                Cell::from(
                    DateTime::<Local>::from(alert.timestamp)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                ),
                Cell::from(alert.metric.label()),
                Cell::from(format!("{:.1}%", alert.value)).style(critical),
                Cell::from(alert.message()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_quiet_message(frame: &mut Frame, app: &App, area: Rect, block: Block) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  ✓ No alerts",
            Style::default().fg(app.theme.ok).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "  CPU and memory have stayed at or below {:.0}%",
                app.thresholds.critical
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
