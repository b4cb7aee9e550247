use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::{App, Pane};
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();
    let focused = app.focused_pane == Pane::Activity;

    let block = Block::default()
        .title(t.panel_title("ACTIVITY", focused))
        .borders(Borders::ALL)
        .border_style(t.panel_border(focused))
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.activity.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "Type in the buffer or click keys to see what they do.",
            t.text_muted(),
        ));
        frame.render_widget(empty, inner);
        return;
    }

    // Keep the scrolled-to line on the last visible row
    let visible_height = inner.height as usize;
    let end = (app.activity_scroll + 1).min(app.activity.len());
    let start = end.saturating_sub(visible_height);

    let lines: Vec<Line> = app.activity[start..end]
        .iter()
        .map(|l| {
            if l.starts_with("layer ->") {
                Line::styled(l.clone(), t.activity_layer())
            } else if l.ends_with(": unmapped") || l.ends_with(": nothing on this layer") {
                Line::styled(l.clone(), t.activity_warning())
            } else {
                Line::styled(l.clone(), t.activity_text())
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
