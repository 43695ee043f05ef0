use crate::error::Result;

use super::date::CalendarDate;

const DATES_PREFIX: &str = "/dates/";

/// Host routes the quick switcher knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Today,
    Date(CalendarDate),
    Other(String),
}

impl Route {
    /// Parse a path such as `/`, `/dates/2024-6-15` or `/projects/x`.
    ///
    /// A `/dates/` path with a malformed date is an error; the host shows it
    /// as a bad request instead of rendering a dated view.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(Route::Today);
        }
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed.strip_prefix(DATES_PREFIX) {
            Some(raw) => Ok(Route::Date(CalendarDate::parse(raw)?)),
            None => Ok(Route::Other(trimmed.to_string())),
        }
    }

    /// Dated routes that point at `today` are redirected to the today route.
    pub fn redirect_today(self, today: CalendarDate) -> Self {
        match self {
            Route::Date(date) if date == today => Route::Today,
            other => other,
        }
    }

    /// Route to show after the switcher selects `date`.
    pub fn for_date(date: CalendarDate, today: CalendarDate) -> Self {
        Route::Date(date).redirect_today(today)
    }

    pub fn date(&self, today: CalendarDate) -> Option<CalendarDate> {
        match self {
            Route::Today => Some(today),
            Route::Date(date) => Some(*date),
            Route::Other(_) => None,
        }
    }

    pub fn is_switchable(&self) -> bool {
        !matches!(self, Route::Other(_))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Today => "/".into(),
            Route::Date(date) => format!("{}{}", DATES_PREFIX, date),
            Route::Other(path) => path.clone(),
        }
    }
}
