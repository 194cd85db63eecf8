use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use lynk_chat_core::ControllerEvent;
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: usize = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+Alt is how AltGr characters arrive on Windows; those are typed
    if key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('r') => app.fire(ControllerEvent::Reset),
            KeyCode::Char('y') => app.copy_latest_yaml(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.fire(ControllerEvent::EnterKey),

        // Log scrolling
        KeyCode::Up => app.log.scroll_up(1),
        KeyCode::Down => app.log.scroll_down(1),
        KeyCode::PageUp => {
            let page = app.scroll_page();
            app.log.scroll_up(page);
        }
        KeyCode::PageDown => {
            let page = app.scroll_page();
            app.log.scroll_down(page);
        }

        // Input editing
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.send_button.is_some_and(|r| point_in_rect(x, y, r)) {
                app.fire(ControllerEvent::Send);
            } else if app.reset_button.is_some_and(|r| point_in_rect(x, y, r)) {
                app.fire(ControllerEvent::Reset);
            }
        }
        MouseEventKind::ScrollUp => {
            if app.log_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.log.scroll_up(WHEEL_LINES);
            }
        }
        MouseEventKind::ScrollDown => {
            if app.log_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.log.scroll_down(WHEEL_LINES);
            }
        }
        _ => {}
    }
}
