use std::cell::RefCell;
use std::rc::Rc;

use ergokey_core::{
    Geometry, KeyOutcome, KeyboardEmulation, KeyboardView, LayerChange, Settings,
};

const MAX_ACTIVITY_LINES: usize = 400;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pane {
    /// Typing goes through the emulator into the buffer
    Typing,
    /// Arrow keys select a key; Enter clicks it
    Keyboard,
    Activity,
}

/// One host keystroke translated to physical codes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostKey {
    pub code: &'static str,
    pub shift: bool,
    pub ctrl: bool,
    pub altgr: bool,
}

pub struct App {
    pub focused_pane: Pane,
    pub emulation: KeyboardEmulation,
    pub settings: Settings,
    /// Key name selected in the keyboard pane
    pub selected_key: Option<String>,
    pub status: String,
    pub activity: Vec<String>,
    pub activity_scroll: usize,
    layer_log: Rc<RefCell<Vec<String>>>,
}

impl App {
    pub fn new(mut emulation: KeyboardEmulation, settings: Settings) -> Self {
        let layer_log = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&layer_log);
        emulation.subscribe(move |view: &KeyboardView| {
            log.borrow_mut().push(format!("layer -> {}", view.layer));
        });

        let selected_key = emulation
            .view()
            .and_then(|view| view.keys.first().map(|cap| cap.key.clone()));

        Self {
            focused_pane: Pane::Typing,
            emulation,
            settings,
            selected_key,
            status: "Ready".to_string(),
            activity: vec![],
            activity_scroll: 0,
            layer_log,
        }
    }

    pub fn view(&self) -> Option<KeyboardView> {
        self.emulation.view()
    }

    pub fn set_status<S: Into<String>>(&mut self, msg: S) {
        self.status = msg.into();
    }

    pub fn push_activity<S: AsRef<str>>(&mut self, msg: S) {
        for line in msg.as_ref().lines() {
            self.activity.push(line.to_string());
        }
        if self.activity.len() > MAX_ACTIVITY_LINES {
            let overflow = self.activity.len() - MAX_ACTIVITY_LINES;
            self.activity.drain(0..overflow);
        }
        self.activity_scroll = self.activity.len().saturating_sub(1);
    }

    pub fn cycle_pane_forward(&mut self) {
        self.focused_pane = match self.focused_pane {
            Pane::Typing => Pane::Keyboard,
            Pane::Keyboard => Pane::Activity,
            Pane::Activity => Pane::Typing,
        };
    }

    pub fn cycle_pane_backward(&mut self) {
        self.focused_pane = match self.focused_pane {
            Pane::Typing => Pane::Activity,
            Pane::Keyboard => Pane::Typing,
            Pane::Activity => Pane::Keyboard,
        };
    }

    /// Play one host keystroke: hold the modifiers, tap the key, release
    pub fn type_key(&mut self, key: HostKey) {
        let mut held = Vec::new();
        if key.shift {
            held.push("ShiftLeft");
        }
        if key.ctrl {
            held.push("ControlLeft");
        }
        if key.altgr {
            held.push("AltRight");
        }
        for code in &held {
            self.emulation.key_down(code);
        }
        let outcome = self.emulation.key_down(key.code);
        self.emulation.key_up(key.code);
        for code in held.iter().rev() {
            self.emulation.key_up(code);
        }
        self.record(key.code, &outcome);
        self.drain_layer_log();
    }

    fn record(&mut self, code: &str, outcome: &KeyOutcome) {
        let line = match outcome {
            KeyOutcome::Inert => format!("{}: no layout loaded", code),
            KeyOutcome::Unmapped => format!("{}: unmapped", code),
            KeyOutcome::Passthrough => format!("{}: ctrl shortcut", code),
            KeyOutcome::Dropped => format!("{}: nothing on this layer", code),
            KeyOutcome::DeadKey { kind, .. } => format!("{}: dead key {:?}", code, kind),
            KeyOutcome::Modifier { flag, .. } => format!("{}: modifier {}", code, flag),
            KeyOutcome::Edited { token, report } => {
                let mut line = format!("{}: {:?}", code, token);
                if report.prefix_deleted > 0 {
                    line.push_str(&format!(" (replaced {} pending)", report.prefix_deleted));
                }
                if let Some(expansion) = &report.expansion {
                    line.push_str(&format!(" {:?}", expansion));
                }
                if report.autocorrections > 0 {
                    line.push_str(&format!(" +{} autocorrect", report.autocorrections));
                }
                line
            }
        };
        self.push_activity(line);
    }

    fn drain_layer_log(&mut self) {
        let lines: Vec<String> = self.layer_log.borrow_mut().drain(..).collect();
        for line in lines {
            self.push_activity(line);
        }
    }

    /// Click the selected key of the displayed keyboard
    pub fn click_selected(&mut self) {
        let Some(key) = self.selected_key.clone() else {
            return;
        };
        match self.emulation.click_key(&key) {
            LayerChange::Changed { to, .. } => self.set_status(format!("{} -> {}", key, to)),
            LayerChange::Unchanged => self.set_status(format!("{}: no layer change", key)),
        }
        self.drain_layer_log();
    }

    /// Move the keyboard selection by whole keys or rows
    pub fn move_selection(&mut self, columns: i32, rows: i32) {
        let Some(view) = self.view() else {
            return;
        };
        let row_numbers = view.row_numbers();
        let current = self
            .selected_key
            .as_deref()
            .and_then(|key| view.key(key))
            .or_else(|| view.keys.first());
        let Some(current) = current else {
            return;
        };
        let Some(row_index) = row_numbers.iter().position(|row| *row == current.row) else {
            return;
        };

        let target_row_index =
            (row_index as i32 + rows).clamp(0, row_numbers.len() as i32 - 1) as usize;
        let row = view.row(row_numbers[target_row_index]);
        let next = if rows == 0 {
            let index = row.iter().position(|cap| cap.key == current.key).unwrap_or(0);
            let target = (index as i32 + columns).clamp(0, row.len() as i32 - 1) as usize;
            row.get(target).copied()
        } else {
            row.iter()
                .min_by_key(|cap| (i32::from(cap.column) - i32::from(current.column)).abs())
                .copied()
        };
        if let Some(cap) = next {
            self.selected_key = Some(cap.key.clone());
        }
    }

    pub fn toggle_plus(&mut self) {
        let plus = !self.emulation.state().plus;
        self.emulation.set_plus(plus);
        self.settings.set_plus(plus);
        self.set_status(if plus { "Plus mode on" } else { "Plus mode off" });
        self.drain_layer_log();
    }

    pub fn toggle_geometry(&mut self) {
        let geometry = match self.emulation.state().geometry {
            Geometry::Iso => Geometry::Ergodox,
            Geometry::Ergodox => Geometry::Iso,
        };
        self.emulation.set_geometry(geometry);
        self.settings.set_geometry(geometry);
        if let Some(view) = self.view() {
            if self.selected_key.as_deref().and_then(|key| view.key(key)).is_none() {
                self.selected_key = view.keys.first().map(|cap| cap.key.clone());
            }
        }
        self.set_status(format!("Geometry: {}", geometry));
    }

    pub fn clear_buffer(&mut self) {
        self.emulation.buffer_mut().set("", 0);
        self.emulation.reset();
        self.drain_layer_log();
        self.set_status("Buffer cleared");
    }
}
