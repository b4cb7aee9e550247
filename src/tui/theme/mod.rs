mod palette;

use ratatui::prelude::*;

use ergokey_core::KeyCap;

pub use palette::Palette;

pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            palette: Palette::new(),
        }
    }

    // Panel border style
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.palette.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.border_default)
        }
    }

    // Layer badge in the header
    pub fn layer_badge(&self, plus: bool) -> Style {
        let bg = if plus {
            self.palette.key_plus
        } else {
            self.palette.accent_primary
        };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    // One keycap: selection wins over held, held over the key's own color
    pub fn key_cap(&self, cap: &KeyCap, selected: bool) -> Style {
        if selected {
            return Style::default()
                .fg(self.palette.selection_fg)
                .bg(self.palette.selection_bg)
                .add_modifier(Modifier::BOLD);
        }
        if cap.held {
            return Style::default()
                .fg(Color::Black)
                .bg(self.palette.key_held_bg)
                .add_modifier(Modifier::BOLD);
        }
        let fg = if cap.plus {
            self.palette.key_plus
        } else if cap.style.is_some() {
            self.palette.key_styled
        } else {
            match cap.kind.as_deref() {
                Some("ponctuation") => self.palette.key_punctuation,
                Some("special") => self.palette.key_special,
                _ => self.palette.key_letter,
            }
        };
        Style::default().fg(fg)
    }

    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.palette.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.palette.text_secondary)
    }

    // Muted text (hints, labels)
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    pub fn title_focused(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_unfocused(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    // Buffer cursor
    pub fn cursor(&self) -> Style {
        Style::default()
            .fg(self.palette.selection_fg)
            .bg(self.palette.accent_success)
    }

    // Activity lines about layers
    pub fn activity_layer(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn activity_text(&self) -> Style {
        Style::default().fg(self.palette.text_primary)
    }

    // Activity lines for keys that produced nothing
    pub fn activity_warning(&self) -> Style {
        Style::default().fg(self.palette.accent_danger)
    }

    // Key hint style (the key part like "Tab")
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_message(&self) -> Style {
        Style::default().fg(self.palette.accent_warning)
    }

    // Panel title with optional focus indicator
    pub fn panel_title(&self, title: &str, focused: bool) -> Line<'_> {
        if focused {
            Line::styled(format!(" {} ", title), self.title_focused())
        } else {
            Line::styled(format!(" {} ", title), self.title_unfocused())
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::new)
}
