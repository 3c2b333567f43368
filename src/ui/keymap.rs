use super::input::{InputEvent, KeyCode};

/// A key, with or without modifiers, as written in keybindings.toml
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern {
    Char(char),
    Key(KeyCode),
    Ctrl(char),
    Alt(char),
    CtrlKey(KeyCode),
    ShiftKey(KeyCode),
}

impl KeyPattern {
    pub fn matches(&self, event: &InputEvent) -> bool {
        let m = event.modifiers;
        match (*self, event.key) {
            (KeyPattern::Char(c), KeyCode::Char(k)) => !m.ctrl && !m.alt && c == k,
            (KeyPattern::Key(code), key) => !m.ctrl && !m.alt && !m.shift && code == key,
            (KeyPattern::Ctrl(c), KeyCode::Char(k)) => m.ctrl && c.eq_ignore_ascii_case(&k),
            (KeyPattern::Alt(c), KeyCode::Char(k)) => m.alt && c == k,
            (KeyPattern::CtrlKey(code), key) => m.ctrl && code == key,
            (KeyPattern::ShiftKey(code), key) => m.shift && code == key,
            _ => false,
        }
    }

    /// Short notation for the help pane
    pub fn display(&self) -> String {
        match self {
            KeyPattern::Char(' ') => "Space".to_string(),
            KeyPattern::Char(c) => c.to_string(),
            KeyPattern::Key(code) => key_name(*code),
            KeyPattern::Ctrl(c) => format!("Ctrl+{}", c),
            KeyPattern::Alt(c) => format!("Alt+{}", c),
            KeyPattern::CtrlKey(code) => format!("Ctrl+{}", key_name(*code)),
            KeyPattern::ShiftKey(code) => format!("Shift+{}", key_name(*code)),
        }
    }
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Escape => "Esc".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::BackTab => "Shift+Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PgUp".into(),
        KeyCode::PageDown => "PgDn".into(),
        KeyCode::Insert => "Ins".into(),
        KeyCode::Delete => "Del".into(),
        KeyCode::F(n) => format!("F{}", n),
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub pattern: KeyPattern,
    pub action: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    /// First binding whose pattern matches
    pub fn lookup(&self, event: &InputEvent) -> Option<&'static str> {
        self.bindings.iter().find(|b| b.pattern.matches(event)).map(|b| b.action)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }
}
