mod keymap;

use std::io;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Pane};

/// Handle input and return true if the app should quit
pub fn handle_input(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    // Global keys: Esc quits, Tab cycles panes outside typing, F-keys toggle settings
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::BackTab => {
            app.cycle_pane_backward();
            return Ok(false);
        }
        KeyCode::Tab if app.focused_pane != Pane::Typing => {
            app.cycle_pane_forward();
            return Ok(false);
        }
        KeyCode::F(1) => {
            app.toggle_plus();
            return Ok(false);
        }
        KeyCode::F(2) => {
            app.toggle_geometry();
            return Ok(false);
        }
        KeyCode::F(3) => {
            app.clear_buffer();
            return Ok(false);
        }
        _ => {}
    }

    handle_pane_input(app, key);

    Ok(false)
}

fn handle_pane_input(app: &mut App, key: KeyEvent) {
    match app.focused_pane {
        Pane::Typing => handle_typing_input(app, key),
        Pane::Keyboard => handle_keyboard_input(app, key),
        Pane::Activity => handle_activity_input(app, key),
    }
}

fn handle_typing_input(app: &mut App, key: KeyEvent) {
    match keymap::host_key(&key) {
        Some(host) => app.type_key(host),
        None => app.set_status(format!("No physical key for {:?}", key.code)),
    }
}

fn handle_keyboard_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.click_selected(),
        _ => {}
    }
}

fn handle_activity_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.activity_scroll = app.activity_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.activity_scroll + 1 < app.activity.len() {
                app.activity_scroll += 1;
            }
        }
        KeyCode::PageUp => {
            app.activity_scroll = app.activity_scroll.saturating_sub(10);
        }
        KeyCode::PageDown => {
            app.activity_scroll = (app.activity_scroll + 10).min(app.activity.len().saturating_sub(1));
        }
        KeyCode::Home => app.activity_scroll = 0,
        KeyCode::End => app.activity_scroll = app.activity.len().saturating_sub(1),
        _ => {}
    }
}
