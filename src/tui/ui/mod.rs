mod activity_panel;
mod footer;
mod header;
mod keyboard_panel;

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::tui::app::{App, Pane};
use crate::tui::theme::theme;

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Header
            Constraint::Min(12),    // Keyboard
            Constraint::Length(5),  // Buffer
            Constraint::Length(10), // Activity
            Constraint::Length(2),  // Footer
        ])
        .split(frame.area());

    header::render(frame, app, root[0]);
    keyboard_panel::render(frame, app, root[1]);
    render_buffer(frame, app, root[2]);
    activity_panel::render(frame, app, root[3]);
    footer::render(frame, app, root[4]);
}

fn render_buffer(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();
    let focused = app.focused_pane == Pane::Typing;

    let block = Block::default()
        .title(t.panel_title("BUFFER", focused))
        .borders(Borders::ALL)
        .border_style(t.panel_border(focused))
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buffer = app.emulation.buffer();
    let mut after = buffer.after_cursor().chars();
    let under_cursor = after.next().map_or(" ".to_string(), |c| c.to_string());

    let line = Line::from(vec![
        Span::styled(buffer.before_cursor().to_string(), t.text_primary()),
        Span::styled(under_cursor, t.cursor()),
        Span::styled(after.as_str().to_string(), t.text_primary()),
    ]);

    let text = Paragraph::new(line).wrap(Wrap { trim: false });
    frame.render_widget(text, inner);
}
