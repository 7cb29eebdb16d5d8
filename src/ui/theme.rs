//! Dashboard palette.
//!
//! Load levels (ok, warn, crit) drive most of the color on screen: gauges,
//! percentages and the header dot all follow [`Thresholds`]. The rest of
//! the palette is chrome and the two network directions.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;
use ratatui::widgets::{Block, Borders};

use crate::data::{HealthStatus, Thresholds};

/// Terminal background luminance above which the light palette is used.
const LIGHT_BACKGROUND_LUMA: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Theme {
    /// Overlays, status messages and the active tab.
    pub accent: Color,
    /// Load below the warning level.
    pub ok: Color,
    /// Load above the warning level.
    pub warn: Color,
    /// Load above the alert threshold.
    pub crit: Color,
    /// Panel outlines.
    pub frame: Color,
    pub frame_type: BorderType,
    /// Unfilled part of a usage gauge.
    pub gauge_track: Color,
    pub upload: Color,
    pub download: Color,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
}

impl Theme {
    /// Palette for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self::with_chrome(Color::Cyan, Color::Gray, Color::DarkGray, Color::DarkGray)
    }

    /// Palette for light terminal backgrounds.
    pub fn light() -> Self {
        Self::with_chrome(Color::Blue, Color::DarkGray, Color::Gray, Color::LightBlue)
    }

    // Load and network colors are shared; only the chrome differs.
    fn with_chrome(accent: Color, muted: Color, track: Color, selection: Color) -> Self {
        Self {
            accent,
            ok: Color::Green,
            warn: Color::Yellow,
            crit: Color::Red,
            frame: muted,
            frame_type: BorderType::Rounded,
            gauge_track: track,
            upload: Color::Magenta,
            download: Color::LightCyan,
            header: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(selection).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(muted),
        }
    }

    /// Palette for a background of the given luminance (0 black, 1 white).
    pub fn for_luma(luma: f32) -> Self {
        if luma > LIGHT_BACKGROUND_LUMA {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Ask the terminal for its background; dark when it won't say.
    pub fn auto_detect() -> Self {
        terminal_light::luma()
            .map(Self::for_luma)
            .unwrap_or_else(|_| Self::dark())
    }

    pub fn level_style(&self, level: HealthStatus) -> Style {
        match level {
            HealthStatus::Healthy => Style::default().fg(self.ok),
            HealthStatus::Warning => Style::default().fg(self.warn),
            HealthStatus::Critical => Style::default().fg(self.crit).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a CPU or memory percentage.
    pub fn percent_style(&self, thresholds: &Thresholds, percent: f32) -> Style {
        self.level_style(thresholds.status(percent))
    }

    /// Gauge fill colored by load, over the track color.
    pub fn gauge_style(&self, thresholds: &Thresholds, percent: f32) -> Style {
        let fill = match thresholds.status(percent) {
            HealthStatus::Healthy => self.ok,
            HealthStatus::Warning => self.warn,
            HealthStatus::Critical => self.crit,
        };
        Style::default().fg(fill).bg(self.gauge_track)
    }

    /// Bordered block for a dashboard panel.
    pub fn panel(&self) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(self.frame_type)
            .border_style(Style::default().fg(self.frame))
    }

    /// Bordered block for a modal drawn over the dashboard.
    pub fn overlay(&self) -> Block<'static> {
        self.panel().border_style(Style::default().fg(self.accent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_colors_follow_thresholds() {
        let theme = Theme::dark();
        let thresholds = Thresholds::default();
        assert_eq!(theme.percent_style(&thresholds, 10.0).fg, Some(theme.ok));
        assert_eq!(theme.percent_style(&thresholds, 80.0).fg, Some(theme.warn));
        assert_eq!(theme.percent_style(&thresholds, 95.0).fg, Some(theme.crit));

        let gauge = theme.gauge_style(&thresholds, 95.0);
        assert_eq!(gauge.fg, Some(theme.crit));
        assert_eq!(gauge.bg, Some(theme.gauge_track));
    }

    #[test]
    fn test_palette_by_background() {
        assert_eq!(Theme::for_luma(0.9).accent, Theme::light().accent);
        assert_eq!(Theme::for_luma(0.1).accent, Theme::dark().accent);
        assert_ne!(Theme::dark().upload, Theme::dark().download);
    }
}
