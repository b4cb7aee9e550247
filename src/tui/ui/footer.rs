use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Pane};
use crate::tui::theme::{theme, Theme};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();

    let line1 = match app.focused_pane {
        Pane::Typing => Line::styled(format!("Status: {}", app.status), t.status_message()),
        Pane::Keyboard => match app.selected_key.as_deref() {
            Some(key) => Line::from(vec![
                Span::styled(format!("{} ", key), t.text_primary().add_modifier(Modifier::BOLD)),
                Span::styled("~ ", t.text_muted()),
                Span::styled("Enter", t.key_hint()),
                Span::styled(" to click  ", t.text_muted()),
                Span::styled(app.status.clone(), t.status_message()),
            ]),
            None => Line::styled(format!("Status: {}", app.status), t.status_message()),
        },
        Pane::Activity => Line::styled(
            format!("Activity ~ {} lines", app.activity.len()),
            t.text_muted(),
        ),
    };

    let footer = Paragraph::new(vec![line1, hints(app, t)]);
    frame.render_widget(footer, area);
}

fn hints(app: &App, t: &Theme) -> Line<'static> {
    let pane_style = |pane: Pane| {
        if app.focused_pane == pane {
            t.key_hint()
        } else {
            t.text_muted()
        }
    };
    let cycle = if app.focused_pane == Pane::Typing {
        "S-Tab"
    } else {
        "Tab"
    };

    Line::from(vec![
        Span::styled(cycle, t.key_hint()),
        Span::styled(":", t.text_muted()),
        Span::styled("Typing", pane_style(Pane::Typing)),
        Span::styled(" ", t.text_muted()),
        Span::styled("Keyboard", pane_style(Pane::Keyboard)),
        Span::styled(" ", t.text_muted()),
        Span::styled("Activity", pane_style(Pane::Activity)),
        Span::styled("  ", t.text_muted()),
        Span::styled("F1", t.key_hint()),
        Span::styled(":plus  ", t.text_muted()),
        Span::styled("F2", t.key_hint()),
        Span::styled(":geometry  ", t.text_muted()),
        Span::styled("F3", t.key_hint()),
        Span::styled(":clear  ", t.text_muted()),
        Span::styled("Esc", t.key_hint()),
        Span::styled(":quit", t.text_muted()),
    ])
}
