use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// File written by the `e` key.
pub const EXPORT_FILE: &str = "perfwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Any key closes help
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Step through processes while the overlay stays open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_priority(-1),
            KeyCode::Char('-') => app.adjust_priority(1),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Processes),
        KeyCode::Char('3') => app.set_view(View::Alerts),

        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') => {
            app.cycle_rank_key();
            app.set_status_message(format!("Ranking by {}", app.rank_key.label()));
        }

        // Priority of the selected process; '=' is '+' without shift
        KeyCode::Char('+') | KeyCode::Char('=') if app.current_view == View::Processes => {
            app.adjust_priority(-1)
        }
        KeyCode::Char('-') if app.current_view == View::Processes => app.adjust_priority(1),

        KeyCode::Char('/') => {
            app.set_view(View::Processes);
            app.start_filter();
        }
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.cancel_filter(),
        KeyCode::Esc => app.cancel_filter(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }
        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.cancel_filter();
            }
        }
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

/// Handle mouse events.
///
/// `content_start_row` is the row of the table header in the Processes view.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let row = mouse.row;

            if app.current_view == View::Processes && row > content_start_row {
                app.select_index((row - content_start_row - 1) as usize);
            }

            // Tab bar sits on row 1: " 1:Overview | 2:Processes | 3:Alerts "
            if row == 1 {
                let col = mouse.column;
                if col < 13 {
                    app.set_view(View::Overview);
                } else if col < 28 {
                    app.set_view(View::Processes);
                } else if col < 39 {
                    app.set_view(View::Alerts);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}
