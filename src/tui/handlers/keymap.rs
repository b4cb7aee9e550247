use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::HostKey;

/// Physical code and Shift state of a character typed on a US QWERTY host
fn qwerty_code(c: char) -> Option<(&'static str, bool)> {
    const LETTERS: [&str; 26] = [
        "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH", "KeyI", "KeyJ", "KeyK",
        "KeyL", "KeyM", "KeyN", "KeyO", "KeyP", "KeyQ", "KeyR", "KeyS", "KeyT", "KeyU", "KeyV",
        "KeyW", "KeyX", "KeyY", "KeyZ",
    ];
    const DIGITS: [&str; 10] = [
        "Digit0", "Digit1", "Digit2", "Digit3", "Digit4", "Digit5", "Digit6", "Digit7", "Digit8",
        "Digit9",
    ];

    if c.is_ascii_lowercase() {
        return Some((LETTERS[(c as u8 - b'a') as usize], false));
    }
    if c.is_ascii_uppercase() {
        return Some((LETTERS[(c as u8 - b'A') as usize], true));
    }
    if c.is_ascii_digit() {
        return Some((DIGITS[(c as u8 - b'0') as usize], false));
    }

    let mapped = match c {
        ' ' => ("Space", false),
        '`' => ("Backquote", false),
        '~' => ("Backquote", true),
        '!' => ("Digit1", true),
        '@' => ("Digit2", true),
        '#' => ("Digit3", true),
        '$' => ("Digit4", true),
        '%' => ("Digit5", true),
        '^' => ("Digit6", true),
        '&' => ("Digit7", true),
        '*' => ("Digit8", true),
        '(' => ("Digit9", true),
        ')' => ("Digit0", true),
        '-' => ("Minus", false),
        '_' => ("Minus", true),
        '=' => ("Equal", false),
        '+' => ("Equal", true),
        '[' => ("BracketLeft", false),
        '{' => ("BracketLeft", true),
        ']' => ("BracketRight", false),
        '}' => ("BracketRight", true),
        '\\' => ("Backslash", false),
        '|' => ("Backslash", true),
        ';' => ("Semicolon", false),
        ':' => ("Semicolon", true),
        '\'' => ("Quote", false),
        '"' => ("Quote", true),
        ',' => ("Comma", false),
        '<' => ("Comma", true),
        '.' => ("Period", false),
        '>' => ("Period", true),
        '/' => ("Slash", false),
        '?' => ("Slash", true),
        _ => return None,
    };
    Some(mapped)
}

/// Translate a terminal key event into the physical key it was typed with
pub fn host_key(event: &KeyEvent) -> Option<HostKey> {
    let (code, shift) = match event.code {
        KeyCode::Char(c) => qwerty_code(c)?,
        KeyCode::Backspace => ("Backspace", false),
        KeyCode::Delete => ("Delete", false),
        KeyCode::Enter => ("Enter", false),
        KeyCode::Tab => ("Tab", false),
        _ => return None,
    };
    Some(HostKey {
        code,
        shift: shift || event.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        altgr: event.modifiers.contains(KeyModifiers::ALT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_letters_and_shifted_symbols() {
        assert_eq!(qwerty_code('a'), Some(("KeyA", false)));
        assert_eq!(qwerty_code('Z'), Some(("KeyZ", true)));
        assert_eq!(qwerty_code('7'), Some(("Digit7", false)));
        assert_eq!(qwerty_code('?'), Some(("Slash", true)));
        assert_eq!(qwerty_code('é'), None);
    }

    #[test]
    fn test_host_key_modifiers() {
        let typed = host_key(&key(KeyCode::Char('w'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(typed.code, "KeyW");
        assert!(typed.ctrl);
        assert!(!typed.shift);

        let typed = host_key(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(typed.code, "KeyA");
        assert!(typed.shift);

        let typed = host_key(&key(KeyCode::Backspace, KeyModifiers::ALT)).unwrap();
        assert_eq!(typed.code, "Backspace");
        assert!(typed.altgr);

        assert!(host_key(&key(KeyCode::F(5), KeyModifiers::NONE)).is_none());
    }
}
