//! Processes view rendering.
//!
//! Displays the top processes under the current rank key, with the
//! filter and selection from the app state.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::RankKey;

/// Render the Processes view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let processes = app.visible_processes();

    let block = app.theme.panel();

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    if processes.is_empty() {
        let message = if app.filter_text.is_empty() {
            " No readable processes"
        } else {
            " No processes match the filter"
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(format!(" Processes{} ", filter_info)));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("PID"),
        Cell::from("Name"),
        Cell::from(rank_header("CPU%", RankKey::Cpu, app.rank_key)),
        Cell::from(rank_header("MEM%", RankKey::CpuMemory, app.rank_key)),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = processes
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(p.name.clone()),
                Cell::from(format!("{:.1}", p.cpu_percent))
                    .style(app.theme.percent_style(&app.thresholds, p.cpu_percent)),
                Cell::from(format!("{:.1}", p.memory_percent))
                    .style(app.theme.percent_style(&app.thresholds, p.memory_percent)),
                Cell::from(p.status.label()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(3),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(10),
    ];

    let selected = app.selected_index.min(processes.len().saturating_sub(1));
    let title = format!(
        " Top {} of {} by {}{} [{}/{}] ",
        processes.len(),
        data.processes.len(),
        app.rank_key.label(),
        filter_info,
        selected + 1,
        processes.len(),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Mark the column that drives the ranking.
fn rank_header(name: &str, column: RankKey, current: RankKey) -> String {
    let ranked = match current {
        RankKey::Cpu => column == RankKey::Cpu,
        RankKey::CpuMemory => true,
    };
    if ranked {
        format!("{}↓", name)
    } else {
        name.to_string()
    }
}
