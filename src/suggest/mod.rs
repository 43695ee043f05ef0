pub mod cache;
pub mod debounce;
pub mod source;

pub use cache::{CachedLabels, ResultCache};
pub use debounce::Debouncer;
pub use source::SuggestionSource;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::error::{DaynoteError, Result};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestOptions {
    pub debounce: Duration,
    pub timeout: Duration,
    pub cache_capacity: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            timeout: DEFAULT_TIMEOUT,
            cache_capacity: cache::DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// A finished lookup, sent back to the event loop that owns the session.
/// `labels` is `None` when the source failed or timed out.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettled {
    pub session: SessionId,
    pub query: String,
    pub labels: Option<Vec<String>>,
}

/// Result of routing a key press through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a session key; the editor should process it.
    Ignored,
    Handled,
    /// Handled, and the session is now torn down.
    Closed,
}

/// State of one mention autocomplete popup.
///
/// Lives from the moment the trigger character is typed until a label is
/// committed, the popup is dismissed, or the trigger span goes away. Every
/// query change serves cached labels immediately and schedules a debounced
/// lookup; lookups report back through `tx` and are applied with
/// [`apply`](Self::apply) on the owner's event loop.
pub struct SuggestionSession<S: SuggestionSource> {
    id: SessionId,
    source: S,
    tx: mpsc::UnboundedSender<FetchSettled>,
    timeout: Duration,
    query: String,
    cache: ResultCache,
    results: Vec<String>,
    query_appended: bool,
    selected: usize,
    pending: bool,
    closed: bool,
    debouncer: Debouncer,
}

impl<S: SuggestionSource> SuggestionSession<S> {
    pub fn new(source: S, tx: mpsc::UnboundedSender<FetchSettled>, options: SuggestOptions) -> Self {
        let cache = ResultCache::new(options.cache_capacity);
        Self::with_cache(source, tx, options, cache)
    }

    /// Start a session that reuses the cache of an earlier one.
    pub fn with_cache(
        source: S,
        tx: mpsc::UnboundedSender<FetchSettled>,
        options: SuggestOptions,
        cache: ResultCache,
    ) -> Self {
        Self {
            id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
            source,
            tx,
            timeout: options.timeout,
            query: String::new(),
            cache,
            results: Vec::new(),
            query_appended: false,
            selected: 0,
            pending: false,
            closed: false,
            debouncer: Debouncer::new(options.debounce),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Index of the entry that is the query itself rather than a known
    /// label, offered so a new project can be created.
    pub fn new_label_index(&self) -> Option<usize> {
        if self.query_appended {
            self.results.len().checked_sub(1)
        } else {
            None
        }
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.results.get(self.selected).map(String::as_str)
    }

    /// Waiting on a lookup with nothing cached to show for the current query.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn on_query_change(&mut self, text: &str) {
        if self.closed {
            return;
        }
        self.query = text.to_string();

        match self.cache.get(text) {
            Some(hit) => {
                self.results = hit.labels.clone();
                self.query_appended = hit.query_appended;
                self.pending = false;
            }
            None => {
                self.results.clear();
                self.query_appended = false;
                self.pending = true;
            }
        }
        self.selected = 0;

        self.schedule_fetch(text.to_string());
    }

    fn schedule_fetch(&mut self, query: String) {
        let source = self.source.clone();
        let tx = self.tx.clone();
        let session = self.id;
        let timeout = self.timeout;

        self.debouncer.schedule(async move {
            let labels = match lookup(&source, query.clone(), timeout).await {
                Ok(labels) => Some(labels),
                Err(err) => {
                    tracing::warn!(?err, %query, "mention lookup failed");
                    None
                }
            };
            let _ = tx.send(FetchSettled {
                session,
                query,
                labels,
            });
        });
    }

    /// Apply a finished lookup. Returns true when the visible results changed.
    ///
    /// Results for a query other than the current one only feed the cache.
    /// Lookups from another session or arriving after teardown are dropped.
    pub fn apply(&mut self, settled: FetchSettled) -> bool {
        if self.closed || settled.session != self.id {
            return false;
        }
        let FetchSettled { query, labels, .. } = settled;
        let is_current = query == self.query;

        match labels {
            Some(mut labels) => {
                let query_appended = !query.is_empty() && !labels.contains(&query);
                if query_appended {
                    labels.push(query.clone());
                }
                self.cache.insert(
                    query.clone(),
                    CachedLabels {
                        labels: labels.clone(),
                        query_appended,
                    },
                );
                if !is_current {
                    tracing::debug!(%query, current = %self.query, "dropping stale mention results");
                    return false;
                }
                self.results = labels;
                self.query_appended = query_appended;
            }
            None => {
                // Keep cached labels on screen; otherwise show an empty list.
                if !is_current || !self.pending {
                    return false;
                }
                self.results.clear();
                self.query_appended = false;
            }
        }

        self.selected = 0;
        self.pending = false;
        true
    }

    /// Route a key press. On Enter with a selectable label, `commit` receives
    /// it before the session closes.
    pub fn on_key<F>(&mut self, key: &KeyEvent, commit: F) -> KeyOutcome
    where
        F: FnOnce(&str),
    {
        if self.closed {
            return KeyOutcome::Ignored;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.teardown();
                KeyOutcome::Closed
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                if !self.results.is_empty() {
                    self.selected = (self.selected + 1).min(self.results.len() - 1);
                }
                KeyOutcome::Handled
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.selected = self.selected.saturating_sub(1);
                KeyOutcome::Handled
            }
            (KeyModifiers::NONE, KeyCode::Enter) => match self.results.get(self.selected) {
                Some(label) => {
                    commit(label);
                    self.teardown();
                    KeyOutcome::Closed
                }
                None => KeyOutcome::Handled,
            },
            _ => KeyOutcome::Ignored,
        }
    }

    /// Stop all lookups and close the popup. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.pending = false;
        self.debouncer.cancel_all();
    }

    /// Tear down and hand back the cache for the next session.
    pub fn into_cache(mut self) -> ResultCache {
        self.teardown();
        let capacity = self.cache.capacity();
        std::mem::replace(&mut self.cache, ResultCache::new(capacity))
    }
}

/// One source call bounded by `timeout`.
async fn lookup<S: SuggestionSource>(
    source: &S,
    query: String,
    timeout: Duration,
) -> Result<Vec<String>> {
    tokio::time::timeout(timeout, source.suggest(query))
        .await
        .map_err(|_| DaynoteError::Timeout(timeout.as_millis() as u64))?
}
