use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use daynote::suggest::{KeyOutcome, ResultCache, SuggestionSession};
use daynote::switcher::{QuickSwitcher, Route, SwitcherOutcome};

use crate::edit_buffer::EditBuffer;
use crate::keys::preset::Action;
use crate::keys::KeybindingMap;

use super::state::{AppState, InputMode, Request, SaveRequest};

pub(super) fn handle_key(
    state: &mut AppState,
    key: &KeyEvent,
    keybindings: &KeybindingMap,
) -> Vec<Request> {
    if state.error_popup.is_some() {
        state.error_popup = None;
        return Vec::new();
    }
    if !state.loading && !state.saving {
        state.status_message = None;
    }

    if let Some(requests) = handle_switcher_key(state, key) {
        return requests;
    }

    match state.input_mode {
        InputMode::Insert => handle_insert_key(state, key),
        InputMode::Normal => handle_normal_key(state, key, keybindings),
    }
}

// --- Quick switcher ---

fn handle_switcher_key(state: &mut AppState, key: &KeyEvent) -> Option<Vec<Request>> {
    match state.switcher.handle_key(key) {
        SwitcherOutcome::Ignored => None,
        SwitcherOutcome::Opened => {
            close_suggestions(state);
            Some(month_request(state).into_iter().collect())
        }
        SwitcherOutcome::Moved {
            month_changed: true,
            ..
        } => Some(month_request(state).into_iter().collect()),
        SwitcherOutcome::Moved { .. } | SwitcherOutcome::Consumed | SwitcherOutcome::Dismissed => {
            Some(Vec::new())
        }
        SwitcherOutcome::Selected(date) => {
            tracing::debug!(%date, "switcher selected date");
            let route = Route::for_date(date, state.today);
            Some(navigate(state, route))
        }
    }
}

/// Fetch note days for the switcher's month unless they are already shown.
fn month_request(state: &mut AppState) -> Option<Request> {
    let cursor = state.switcher.cursor().current();
    let key = (cursor.year(), cursor.month());
    if state.month_key == Some(key) {
        return None;
    }
    state.month_key = Some(key);
    state.month_days.clear();
    Some(Request::LoadMonth {
        year: key.0,
        month: key.1,
    })
}

pub(super) fn navigate(state: &mut AppState, route: Route) -> Vec<Request> {
    close_suggestions(state);
    if state.dirty {
        tracing::info!(from = %state.route.path(), "leaving note with unsaved edits");
    }
    state.input_mode = InputMode::Normal;
    state.switcher = QuickSwitcher::for_route(&route, state.today, state.hotkey);
    state.route = route;
    state.note = None;
    state.buffer = EditBuffer::new_empty();
    state.dirty = false;

    match state.current_date() {
        Some(date) => {
            state.loading = true;
            state.status_message = Some("Loading note...".into());
            vec![Request::LoadNote(date)]
        }
        None => {
            state.loading = false;
            Vec::new()
        }
    }
}

// --- Normal mode ---

fn handle_normal_key(
    state: &mut AppState,
    key: &KeyEvent,
    keybindings: &KeybindingMap,
) -> Vec<Request> {
    let Some(action) = keybindings.resolve(key) else {
        return Vec::new();
    };

    match action {
        Action::Quit => {
            close_suggestions(state);
            state.should_quit = true;
            Vec::new()
        }
        Action::Edit => {
            if state.is_editable() {
                state.input_mode = InputMode::Insert;
            } else if state.current_date().is_some() && !state.loading {
                state.status_message = Some("Past notes are read-only".into());
            }
            Vec::new()
        }
        Action::Save => save_request(state).into_iter().collect(),
        Action::GoToday => navigate(state, Route::Today),
        Action::PrevDay | Action::NextDay => {
            let Some(date) = state.current_date() else {
                return Vec::new();
            };
            let delta = if action == Action::PrevDay { -1 } else { 1 };
            let route = Route::for_date(date.add_days(delta), state.today);
            navigate(state, route)
        }
    }
}

pub(super) fn save_request(state: &mut AppState) -> Option<Request> {
    if !state.is_editable() {
        state.status_message = Some("Past notes are read-only".into());
        return None;
    }
    if state.saving {
        return None;
    }
    if !state.dirty {
        state.status_message = Some("Nothing to save".into());
        return None;
    }
    let date = state.current_date()?;
    state.saving = true;
    state.status_message = Some("Saving...".into());
    Some(Request::Save(SaveRequest {
        date,
        text: state.buffer.text(),
        trigger: state.trigger,
    }))
}

// --- Insert mode ---

fn handle_insert_key(state: &mut AppState, key: &KeyEvent) -> Vec<Request> {
    if route_to_suggestions(state, key) != KeyOutcome::Ignored {
        return Vec::new();
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            return save_request(state).into_iter().collect();
        }
        (KeyModifiers::NONE, KeyCode::Esc) => {
            close_suggestions(state);
            state.input_mode = InputMode::Normal;
            return Vec::new();
        }
        (KeyModifiers::NONE, KeyCode::Enter) => {
            state.buffer.insert_char('\n');
            state.dirty = true;
        }
        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            state.buffer.insert_char(c);
            state.dirty = true;
        }
        (KeyModifiers::NONE, KeyCode::Backspace) => {
            state.buffer.delete_back();
            state.dirty = true;
        }
        (KeyModifiers::NONE, KeyCode::Delete) => {
            state.buffer.delete_forward();
            state.dirty = true;
        }
        (KeyModifiers::NONE, KeyCode::Left) => state.buffer.move_left(),
        (KeyModifiers::NONE, KeyCode::Right) => state.buffer.move_right(),
        (KeyModifiers::NONE, KeyCode::Up) => state.buffer.move_up(),
        (KeyModifiers::NONE, KeyCode::Down) => state.buffer.move_down(),
        (KeyModifiers::NONE, KeyCode::Home) => state.buffer.move_home(),
        (KeyModifiers::NONE, KeyCode::End) => state.buffer.move_end(),
        _ => return Vec::new(),
    }

    sync_mention(state);
    Vec::new()
}

/// Give the open suggestion popup first look at `key`.
fn route_to_suggestions(state: &mut AppState, key: &KeyEvent) -> KeyOutcome {
    let Some(session) = state.suggestions.as_mut() else {
        return KeyOutcome::Ignored;
    };

    let mut committed: Option<String> = None;
    let outcome = session.on_key(key, |label| committed = Some(label.to_string()));

    if outcome == KeyOutcome::Closed {
        match committed {
            Some(label) => {
                if let Some(span) = state.buffer.mention_span(state.trigger) {
                    state.buffer.commit_mention(&span, state.trigger, &label);
                    state.dirty = true;
                }
            }
            None => state.dismissed_anchor = state.suggestion_anchor,
        }
        close_suggestions(state);
    }
    outcome
}

/// Open, update or close the suggestion session to match the trigger span
/// under the cursor.
pub(super) fn sync_mention(state: &mut AppState) {
    let Some(span) = state.buffer.mention_span(state.trigger) else {
        state.dismissed_anchor = None;
        close_suggestions(state);
        return;
    };
    if state.dismissed_anchor == Some(span.start) {
        return;
    }
    state.dismissed_anchor = None;

    let fresh = state.suggestion_anchor != Some(span.start);
    if fresh {
        close_suggestions(state);
        let cache = state
            .spare_cache
            .take()
            .unwrap_or_else(|| ResultCache::new(state.suggest_options.cache_capacity));
        state.suggestions = Some(SuggestionSession::with_cache(
            state.source.clone(),
            state.suggest_tx.clone(),
            state.suggest_options,
            cache,
        ));
        state.suggestion_anchor = Some(span.start);
    }

    if let Some(session) = state.suggestions.as_mut() {
        if fresh || session.query() != span.query {
            session.on_query_change(&span.query);
        }
    }
}

/// Tear down the open session, keeping its cache for the next one.
pub(super) fn close_suggestions(state: &mut AppState) {
    if let Some(session) = state.suggestions.take() {
        state.spare_cache = Some(session.into_cache());
    }
    state.suggestion_anchor = None;
}
