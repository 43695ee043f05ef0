use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions available while the editor is not in insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Edit,
    Save,
    GoToday,
    PrevDay,
    NextDay,
}

impl Action {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quit" => Some(Self::Quit),
            "edit" => Some(Self::Edit),
            "save" => Some(Self::Save),
            "go_today" => Some(Self::GoToday),
            "prev_day" => Some(Self::PrevDay),
            "next_day" => Some(Self::NextDay),
            _ => None,
        }
    }

    pub fn hint_text(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::GoToday => "today",
            Self::PrevDay => "prev day",
            Self::NextDay => "next day",
        }
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
}

pub fn default_bindings() -> HashMap<KeyEvent, Action> {
    let mut m = HashMap::new();
    m.insert(key(KeyCode::Char('q')), Action::Quit);
    m.insert(ctrl(KeyCode::Char('c')), Action::Quit);
    m.insert(key(KeyCode::Char('i')), Action::Edit);
    m.insert(key(KeyCode::Enter), Action::Edit);
    m.insert(ctrl(KeyCode::Char('s')), Action::Save);
    m.insert(key(KeyCode::Char('t')), Action::GoToday);
    m.insert(key(KeyCode::Char('h')), Action::PrevDay);
    m.insert(key(KeyCode::Left), Action::PrevDay);
    m.insert(key(KeyCode::Char('l')), Action::NextDay);
    m.insert(key(KeyCode::Right), Action::NextDay);
    m
}
