use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use daynote::suggest::{FetchSettled, ResultCache, SuggestOptions, SuggestionSession};
use daynote::switcher::{CalendarDate, QuickSwitcher, Route};

use crate::api::client::NotesClient;
use crate::api::types::Note;
use crate::edit_buffer::EditBuffer;
use crate::error::{ErrorInfo, ErrorPopup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Insert,
}

/// Everything the editor needs to save a note.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub date: CalendarDate,
    pub text: String,
    pub trigger: char,
}

/// Work the event loop hands to background tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadNote(CalendarDate),
    LoadMonth { year: i32, month: u32 },
    Save(SaveRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Key(KeyEvent),
    NoteLoaded(CalendarDate, Option<Note>),
    MonthLoaded { year: i32, month: u32, days: Vec<u32> },
    /// A finished save, with the text that was sent.
    Saved {
        date: CalendarDate,
        text: String,
        note: Note,
    },
    NoteLoadFailed(CalendarDate, ErrorInfo),
    ApiError(ErrorInfo),
    Tick,
}

pub struct AppState {
    pub today: CalendarDate,
    pub route: Route,
    pub switcher: QuickSwitcher,
    pub hotkey: KeyEvent,
    pub trigger: char,
    pub note: Option<Note>,
    pub buffer: EditBuffer,
    pub dirty: bool,
    pub input_mode: InputMode,
    pub suggestions: Option<SuggestionSession<NotesClient>>,
    /// Buffer offset of the trigger the open session belongs to.
    pub(super) suggestion_anchor: Option<usize>,
    /// Trigger whose popup was dismissed with Esc; it stays closed until the
    /// span goes away.
    pub(super) dismissed_anchor: Option<usize>,
    pub(super) spare_cache: Option<ResultCache>,
    pub(super) source: NotesClient,
    pub(super) suggest_tx: mpsc::UnboundedSender<FetchSettled>,
    pub(super) suggest_options: SuggestOptions,
    /// Year/month the highlighted days belong to.
    pub month_key: Option<(i32, u32)>,
    pub month_days: Vec<u32>,
    pub loading: bool,
    pub saving: bool,
    pub status_message: Option<String>,
    pub hints: Vec<(String, &'static str)>,
    pub error_popup: Option<ErrorPopup>,
    pub tick: u64,
    pub should_quit: bool,
}

/// Collaborators and settings an [`AppState`] is built from.
pub struct StateContext {
    pub today: CalendarDate,
    pub hotkey: KeyEvent,
    pub trigger: char,
    pub source: NotesClient,
    pub suggest_tx: mpsc::UnboundedSender<FetchSettled>,
    pub suggest_options: SuggestOptions,
    pub hints: Vec<(String, &'static str)>,
}

impl AppState {
    /// State for the host path `path`. An unparseable dated path opens on the
    /// 400 popup with nothing rendered behind it.
    pub fn new(path: &str, ctx: StateContext) -> Self {
        let (route, error_popup) = match Route::parse(path) {
            Ok(route) => (route.redirect_today(ctx.today), None),
            Err(e) => {
                tracing::warn!(path, error = %e, "rejected route");
                (
                    Route::Other(path.to_string()),
                    Some(ErrorPopup::from_error_info(&ErrorInfo::from_error(&e))),
                )
            }
        };

        Self {
            today: ctx.today,
            switcher: QuickSwitcher::for_route(&route, ctx.today, ctx.hotkey),
            route,
            hotkey: ctx.hotkey,
            trigger: ctx.trigger,
            note: None,
            buffer: EditBuffer::new_empty(),
            dirty: false,
            input_mode: InputMode::Normal,
            suggestions: None,
            suggestion_anchor: None,
            dismissed_anchor: None,
            spare_cache: Some(ResultCache::new(ctx.suggest_options.cache_capacity)),
            source: ctx.source,
            suggest_tx: ctx.suggest_tx,
            suggest_options: ctx.suggest_options,
            month_key: None,
            month_days: Vec::new(),
            loading: false,
            saving: false,
            status_message: None,
            hints: ctx.hints,
            error_popup,
            tick: 0,
            should_quit: false,
        }
    }

    /// Date of the note on screen, if the route has one.
    pub fn current_date(&self) -> Option<CalendarDate> {
        self.route.date(self.today)
    }

    /// Only today's note accepts edits.
    pub fn is_editable(&self) -> bool {
        self.route == Route::Today && !self.loading
    }

    /// Requests needed to show the initial route.
    pub fn initial_requests(&mut self) -> Vec<Request> {
        match self.current_date() {
            Some(date) => {
                self.loading = true;
                self.status_message = Some("Loading note...".into());
                vec![Request::LoadNote(date)]
            }
            None => Vec::new(),
        }
    }
}
