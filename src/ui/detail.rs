//! Detail overlay rendering.
//!
//! Displays a modal overlay with the selected process and how it compares
//! to the rest of the host.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::RankKey;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 40;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the process detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };
    let Some(process) = app.selected_process() else {
        return;
    };

    let overlay_width = (area.width * 60 / 100).clamp(MIN_OVERLAY_WIDTH, 70);
    let overlay_height = MIN_OVERLAY_HEIGHT;
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    // Share of the host's load this process accounts for
    let cpu_share = if data.sample.cpu_percent > 0.0 {
        format!("{:.0}% of host CPU", process.cpu_percent / data.sample.cpu_percent * 100.0)
    } else {
        "-".to_string()
    };
    let rank = |key: RankKey| {
        data.top_by(key)
            .iter()
            .position(|p| p.pid == process.pid)
            .map(|i| format!("#{}", i + 1))
            .unwrap_or_else(|| "-".to_string())
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled(format!(" {} ", process.name), bold)),
        Line::from(""),
        Line::from(vec![Span::raw(" PID:     "), Span::styled(process.pid.to_string(), bold)]),
        Line::from(vec![Span::raw(" Status:  "), Span::raw(process.status.label())]),
        Line::from(vec![
            Span::raw(" CPU:     "),
            Span::styled(
                format!("{:.1}%", process.cpu_percent),
                app.theme.percent_style(&app.thresholds, process.cpu_percent),
            ),
            Span::styled(format!("  ({})", cpu_share), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(vec![
            Span::raw(" Memory:  "),
            Span::styled(
                format!("{:.1}%", process.memory_percent),
                app.theme.percent_style(&app.thresholds, process.memory_percent),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Rank:    "),
            Span::raw(format!(
                "{} by CPU, {} by CPU+memory",
                rank(RankKey::Cpu),
                rank(RankKey::CpuMemory)
            )),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " ↑/↓:next process  +/-:priority  Esc:close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = app.theme.overlay().title(" Process Detail ");

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}
