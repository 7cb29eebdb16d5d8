//! Terminal rendering.
//!
//! Every view renders from the [`App`](crate::app::App) state alone; nothing
//! here touches the sampling side.

pub mod alerts;
pub mod common;
pub mod detail;
pub mod overview;
pub mod processes;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Row where the Processes table header lands (header bar, tabs, border).
pub const CONTENT_START_ROW: u16 = 3;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the newest `width` levels as a text sparkline, right-aligned.
pub fn render_sparkline(levels: &[u8], width: usize) -> String {
    let shown = &levels[levels.len().saturating_sub(width)..];
    let mut line = " ".repeat(width - shown.len());
    line.extend(shown.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]));
    line
}

/// Draw one full frame: header, tabs, the current view, status bar and
/// any overlays.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
            .intersection(area);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Overview => overview::render(frame, app, chunks[2]),
        View::Processes => processes::render(frame, app, chunks[2]),
        View::Alerts => alerts::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}

/// Format a byte count with binary units, e.g. `1.5 KiB`.
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Format a rate in bytes per second.
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    use super::*;
    use crate::data::sampler::tests::ScriptedProvider;
    use crate::data::{Monitor, MonitorConfig, RankKey, Thresholds};
    use crate::source::ChannelSource;

    fn app() -> App {
        let provider = ScriptedProvider {
            cpu: Ok(95.0),
            ..Default::default()
        }
        .with_process(42, 70.0, 3.0)
        .with_process(7, 20.0, 9.0);
        let mut monitor = Monitor::new(provider, MonitorConfig::default());
        let (tx, source) = ChannelSource::create("test");
        tx.send(Some(monitor.tick())).unwrap();
        let mut app = App::with_theme(
            Box::new(source),
            Thresholds::default(),
            RankKey::Cpu,
            Theme::dark(),
        );
        app.reload_data().unwrap();
        app
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_draw_each_view() {
        let mut app = app();

        let overview = screen(&app, 100, 30);
        assert!(overview.contains("PERFWATCH"));
        assert!(overview.contains("Trends"));
        assert!(overview.contains("High CPU usage: 95.0%"));

        app.set_view(View::Processes);
        let processes = screen(&app, 100, 30);
        assert!(processes.contains("proc42"));
        assert!(processes.contains("proc7"));

        app.set_view(View::Alerts);
        let alerts = screen(&app, 100, 30);
        assert!(alerts.contains("Alerts (1)"));
    }

    #[test]
    fn test_draw_overlays() {
        let mut app = app();
        app.set_view(View::Processes);
        app.enter_detail();
        assert!(screen(&app, 100, 30).contains("Process Detail"));

        app.close_overlay();
        app.toggle_help();
        let help = screen(&app, 100, 30);
        assert!(help.contains("Keyboard Shortcuts"));
        assert!(help.contains("Lower priority (nice +1)"));
    }

    #[test]
    fn test_draw_too_small() {
        let app = app();
        assert!(screen(&app, 40, 10).contains("Terminal too small"));
    }

    #[test]
    fn test_render_sparkline_pads_and_truncates() {
        assert_eq!(render_sparkline(&[0, 7], 4), "  ▁█");
        assert_eq!(render_sparkline(&[0, 1, 2, 3, 4, 5], 3), "▄▅▆");
        assert_eq!(render_sparkline(&[], 2), "  ");
        assert_eq!(render_sparkline(&[12], 1), "█");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.5 KiB");
        assert_eq!(format_bytes(3.0 * 1024.0 * 1024.0), "3.0 MiB");
        assert_eq!(format_rate(500.0), "500 B/s");
    }
}
