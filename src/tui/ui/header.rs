use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();
    let state = app.emulation.state();

    let name = app
        .emulation
        .document()
        .get()
        .map_or_else(|| "no layout".to_string(), |doc| doc.name().to_string());

    let layer_label = if state.plus {
        format!("[{} +] ", state.layer)
    } else {
        format!("[{}] ", state.layer)
    };

    let line = Line::from(vec![
        Span::styled("ergokey ", t.text_primary().add_modifier(Modifier::BOLD)),
        Span::styled(layer_label, t.layer_badge(state.plus)),
        Span::styled(format!("{} ", name), t.text_secondary()),
        Span::styled(format!("({}) ", state.geometry), t.text_muted()),
        Span::styled("Esc:quit", t.key_hint()),
    ]);

    let header = Paragraph::new(line).alignment(Alignment::Left);

    frame.render_widget(header, area);
}
