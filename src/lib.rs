pub mod api;
pub mod error;
pub mod mention;
pub mod suggest;
pub mod switcher;

// Convenience re-exports
pub use api::client::NotesClient;
pub use api::types;
pub use error::{DaynoteError, Result};
pub use suggest::{KeyOutcome, SuggestionSession};
pub use switcher::{CalendarDate, DateCursor, QuickSwitcher, Route};
