mod input;
mod state;
mod tasks;
pub use state::*;

use input::handle_key;
use tasks::dispatch;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use daynote::mention::html_to_text;
use daynote::suggest::FetchSettled;
use daynote::switcher::{CalendarDate, Route};

use crate::api::client::NotesClient;
use crate::api::types::Note;
use crate::config::AppConfig;
use crate::edit_buffer::EditBuffer;
use crate::error::{ErrorInfo, ErrorPopup, Result};
use crate::keys::parser::parse_key;
use crate::keys::{format_key_event, KeybindingMap};

pub fn handle_note_loaded(state: &mut AppState, date: CalendarDate, note: Option<Note>) {
    if state.current_date() != Some(date) {
        tracing::debug!(%date, "dropping note for a route no longer shown");
        return;
    }
    state.buffer = match &note {
        Some(n) => EditBuffer::new(&html_to_text(&n.html_content, state.trigger)),
        None => EditBuffer::new_empty(),
    };
    state.note = note;
    state.dirty = false;
    state.loading = false;
    state.status_message = None;
}

pub fn handle_month_loaded(state: &mut AppState, year: i32, month: u32, days: Vec<u32>) {
    if state.month_key == Some((year, month)) {
        state.month_days = days;
    }
}

/// Edits typed while the save was in flight keep the buffer dirty.
pub fn handle_saved(state: &mut AppState, date: CalendarDate, text: &str, note: Note) {
    state.saving = false;
    state.status_message = Some("Saved".into());
    if state.route == Route::Today && state.current_date() == Some(date) {
        if state.buffer.text() == text {
            state.dirty = false;
        }
        state.note = Some(note);
    }

    let today = state.today;
    if state.month_key == Some((today.year(), today.month()))
        && !state.month_days.contains(&today.day())
    {
        state.month_days.push(today.day());
        state.month_days.sort_unstable();
    }
}

pub fn handle_note_load_failed(state: &mut AppState, date: CalendarDate, error: ErrorInfo) {
    if state.current_date() != Some(date) {
        tracing::debug!(%date, "dropping load error for a route no longer shown");
        return;
    }
    handle_api_error(state, error);
}

pub fn handle_api_error(state: &mut AppState, error: ErrorInfo) {
    state.loading = false;
    state.saving = false;
    state.status_message = None;
    state.error_popup = Some(ErrorPopup::from_error_info(&error));
}

/// Apply a finished suggestion lookup to the open session, if it is still
/// the one that asked.
pub fn handle_suggestions_settled(state: &mut AppState, settled: FetchSettled) -> bool {
    match state.suggestions.as_mut() {
        Some(session) => session.apply(settled),
        None => false,
    }
}

pub fn handle_message(
    state: &mut AppState,
    msg: AppMessage,
    keybindings: &KeybindingMap,
) -> Vec<Request> {
    match msg {
        AppMessage::Key(key) => return handle_key(state, &key, keybindings),
        AppMessage::NoteLoaded(date, note) => handle_note_loaded(state, date, note),
        AppMessage::MonthLoaded { year, month, days } => {
            handle_month_loaded(state, year, month, days)
        }
        AppMessage::Saved { date, text, note } => handle_saved(state, date, &text, note),
        AppMessage::NoteLoadFailed(date, err) => handle_note_load_failed(state, date, err),
        AppMessage::ApiError(err) => handle_api_error(state, err),
        AppMessage::Tick => state.tick = state.tick.wrapping_add(1),
    }
    Vec::new()
}

pub async fn run(
    config: &AppConfig,
    initial_path: &str,
    terminal: &mut DefaultTerminal,
) -> Result<()> {
    let keybindings = KeybindingMap::new(&config.keybindings)?;
    let hotkey = parse_key(&config.switcher.hotkey)?;
    let mut hints = keybindings.hints();
    hints.push((format_key_event(&hotkey), "go to date"));
    let client = NotesClient::new(&config.server.base_url, &config.server.api_token);

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();
    let (suggest_tx, mut suggest_rx) = mpsc::unbounded_channel::<FetchSettled>();

    let mut state = AppState::new(
        initial_path,
        StateContext {
            today: CalendarDate::today(),
            hotkey,
            trigger: config.editor.trigger,
            source: client.clone(),
            suggest_tx,
            suggest_options: config.editor.suggest_options(),
            hints,
        },
    );
    tracing::info!(route = %state.route.path(), "starting");

    for request in state.initial_requests() {
        dispatch(request, &client, &tx);
    }

    // Spawn event reader task
    let event_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if event_tx.send(AppMessage::Key(key)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
                _ => {}
            }
        }
    });

    // Spawn tick timer
    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(AppMessage::Tick).is_err() {
                break;
            }
        }
    });

    // Main loop
    loop {
        terminal.draw(|frame| crate::ui::render(frame, &state))?;

        tokio::select! {
            Some(msg) = rx.recv() => {
                for request in handle_message(&mut state, msg, &keybindings) {
                    dispatch(request, &client, &tx);
                }
            }
            Some(settled) = suggest_rx.recv() => {
                handle_suggestions_settled(&mut state, settled);
            }
            else => break,
        }

        if state.should_quit {
            break;
        }
    }

    tracing::info!("shutting down");
    Ok(())
}
