use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use daynote::suggest::{FetchSettled, SuggestOptions};
use daynote::switcher::CalendarDate;

use crate::api::client::NotesClient;
use crate::api::types::Note;
use crate::keys::KeybindingMap;

use super::{handle_message, AppMessage, AppState, Request, StateContext};

pub fn date(year: i32, month: u32, day: u32) -> CalendarDate {
    CalendarDate::new(year, month, day).unwrap()
}

pub fn today() -> CalendarDate {
    date(2024, 6, 15)
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn keybindings() -> KeybindingMap {
    KeybindingMap::new(&HashMap::new()).unwrap()
}

pub fn make_note(id: i64, html: &str, year: i32, month: u32, day: u32) -> Note {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let utc = FixedOffset::east_opt(0).unwrap();
    Note {
        id,
        html_content: html.into(),
        note_date: utc.from_local_datetime(&naive).unwrap(),
    }
}

/// State on `path` with today fixed to 2024-06-15. The receiver must be kept
/// alive for lookups to report back.
pub fn test_state_at(path: &str) -> (AppState, mpsc::UnboundedReceiver<FetchSettled>) {
    let (suggest_tx, suggest_rx) = mpsc::unbounded_channel();
    let state = AppState::new(
        path,
        StateContext {
            today: today(),
            hotkey: ctrl('j'),
            trigger: '@',
            // Nothing listens here; debounced lookups never fire in these tests.
            source: NotesClient::new("http://127.0.0.1:9", ""),
            suggest_tx,
            suggest_options: SuggestOptions::default(),
            hints: vec![],
        },
    );
    (state, suggest_rx)
}

/// Today's route with an empty note already loaded.
pub fn test_state() -> AppState {
    let (mut state, _rx) = test_state_at("/");
    state.loading = false;
    state.status_message = None;
    state
}

pub fn press(state: &mut AppState, kb: &KeybindingMap, key: KeyEvent) -> Vec<Request> {
    handle_message(state, AppMessage::Key(key), kb)
}

pub fn type_text(state: &mut AppState, kb: &KeybindingMap, text: &str) {
    for c in text.chars() {
        press(state, kb, key(KeyCode::Char(c)));
    }
}
