use ratatui::prelude::*;
use ratatui::widgets::*;

use ergokey_core::{KeyCap, KeyboardView};

use crate::tui::app::{App, Pane};
use crate::tui::theme::theme;

/// Terminal cells per unit of key size
const CELLS_PER_UNIT: f32 = 5.0;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();
    let focused = app.focused_pane == Pane::Keyboard;

    let block = Block::default()
        .title(t.panel_title("KEYBOARD", focused))
        .borders(Borders::ALL)
        .border_style(t.panel_border(focused))
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = app.view() else {
        let empty = Paragraph::new(Line::styled("No layout document loaded.", t.text_muted()));
        frame.render_widget(empty, inner);
        return;
    };

    let selected = if focused {
        app.selected_key.as_deref()
    } else {
        None
    };
    let lines = key_rows(&view, selected);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn key_rows<'a>(view: &'a KeyboardView, selected: Option<&str>) -> Vec<Line<'a>> {
    let t = theme();
    let mut lines = Vec::new();

    for row in view.row_numbers() {
        let mut spans = Vec::new();
        let mut next_column: Option<u8> = None;
        for cap in view.row(row) {
            // Gap where the layout skips columns
            if let Some(expected) = next_column {
                if cap.column > expected {
                    let gap = usize::from(cap.column - expected) * CELLS_PER_UNIT as usize;
                    spans.push(Span::raw(" ".repeat(gap)));
                }
            }
            next_column = Some(cap.column.saturating_add(1));

            let is_selected = selected == Some(cap.key.as_str());
            spans.push(Span::styled(cap_text(cap), t.key_cap(cap, is_selected)));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Label centered in a cell as wide as the key
fn cap_text(cap: &KeyCap) -> String {
    let width = ((cap.size * CELLS_PER_UNIT).round() as usize).max(3);
    let label = cap.label.display();
    let label = if label.is_empty() { "·".to_string() } else { label };
    format!("{:^width$}", label, width = width - 1)
}
