use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate};

use crate::error::{DaynoteError, Result};

/// A valid Gregorian calendar day. Displays in canonical `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today in the viewer's local time zone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parse a route date of the form `YYYY-M-D` through `YYYY-MM-DD`.
    ///
    /// The year must be exactly four digits and month and day one or two.
    /// Strings that have the right shape but name no real day (`2024-02-30`)
    /// are rejected as well.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || DaynoteError::InvalidDate(input.to_string());

        let segments: Vec<&str> = input.split('-').collect();
        if segments.len() != 3 {
            return Err(invalid());
        }
        let widths = [4..=4, 1..=2, 1..=2];
        for (segment, width) in segments.iter().zip(widths) {
            if !width.contains(&segment.len()) || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
        }

        let year: i32 = segments[0].parse().map_err(|_| invalid())?;
        let month: u32 = segments[1].parse().map_err(|_| invalid())?;
        let day: u32 = segments[2].parse().map_err(|_| invalid())?;
        Self::new(year, month, day).ok_or_else(invalid)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Shift by whole days with normal calendar rollover. Saturates at the
    /// ends of the representable range.
    pub fn add_days(self, delta: i64) -> Self {
        let days = Days::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            self.0.checked_add_days(days)
        } else {
            self.0.checked_sub_days(days)
        };
        shifted.map(Self).unwrap_or(self)
    }

    /// Shift by whole months. When the target month is shorter than the
    /// current day-of-month the result is clamped to the target month's last
    /// day: Jan 31 + 1 month is Feb 28 (Feb 29 in leap years).
    pub fn add_months(self, delta: i32) -> Self {
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            self.0.checked_add_months(months)
        } else {
            self.0.checked_sub_months(months)
        };
        shifted.map(Self).unwrap_or(self)
    }

    pub fn first_of_month(self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn days_in_month(self) -> u32 {
        let first = self.first_of_month();
        let next = first.add_months(1);
        if next == first {
            return 31;
        }
        next.add_days(-1).day()
    }

    pub fn same_month(self, other: Self) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = DaynoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// Cursor over calendar days for the quick switcher.
///
/// `current` moves under navigation; `initial` is where the cursor came from
/// and is restored whenever the switcher closes without a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCursor {
    current: CalendarDate,
    initial: CalendarDate,
    open: bool,
}

impl DateCursor {
    pub fn new(initial: CalendarDate) -> Self {
        Self {
            current: initial,
            initial,
            open: false,
        }
    }

    pub fn current(&self) -> CalendarDate {
        self.current
    }

    pub fn initial(&self) -> CalendarDate {
        self.initial
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and discard any navigation done while open.
    pub fn close(&mut self) {
        self.open = false;
        self.current = self.initial;
    }

    pub fn step_day(&mut self, delta: i64) {
        self.current = self.current.add_days(delta);
    }

    pub fn step_month(&mut self, delta: i32) {
        self.current = self.current.add_months(delta);
    }

    /// Close and keep the current date as the new baseline.
    pub fn select(&mut self) -> CalendarDate {
        self.open = false;
        self.initial = self.current;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    #[test]
    fn parse_accepts_short_and_padded_forms() {
        for (input, canonical) in [
            ("2024-6-5", "2024-06-05"),
            ("2024-06-05", "2024-06-05"),
            ("2024-12-31", "2024-12-31"),
            ("1999-1-09", "1999-01-09"),
            ("2024-02-29", "2024-02-29"),
        ] {
            let parsed = CalendarDate::parse(input).unwrap();
            assert_eq!(parsed.to_string(), canonical, "input {}", input);
        }
    }

    #[test]
    fn canonical_form_reparses_to_same_date() {
        let original = CalendarDate::parse("2024-6-5").unwrap();
        let reparsed = CalendarDate::parse(&original.to_string()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in [
            "",
            "2024",
            "2024-06",
            "2024-06-15-01",
            "24-06-15",
            "02024-06-15",
            "2024-006-15",
            "2024-06-015",
            "2024-ab-15",
            "2024-06-1x",
            "2024/06/15",
            " 2024-06-15",
            "2024--15",
            "+024-06-15",
        ] {
            let err = CalendarDate::parse(input).unwrap_err();
            assert!(
                matches!(err, DaynoteError::InvalidDate(ref s) if s == input),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn parse_rejects_impossible_days() {
        assert!(CalendarDate::parse("2023-02-29").is_err());
        assert!(CalendarDate::parse("2024-02-30").is_err());
        assert!(CalendarDate::parse("2024-13-01").is_err());
        assert!(CalendarDate::parse("2024-0-10").is_err());
        assert!(CalendarDate::parse("2024-04-31").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let d: CalendarDate = "2024-6-15".parse().unwrap();
        assert_eq!(d, date(2024, 6, 15));
    }

    #[test]
    fn add_days_rolls_over_month_and_year() {
        assert_eq!(date(2024, 1, 31).add_days(1), date(2024, 2, 1));
        assert_eq!(date(2024, 2, 28).add_days(1), date(2024, 2, 29));
        assert_eq!(date(2023, 2, 28).add_days(1), date(2023, 3, 1));
        assert_eq!(date(2024, 12, 31).add_days(1), date(2025, 1, 1));
        assert_eq!(date(2025, 1, 1).add_days(-1), date(2024, 12, 31));
        assert_eq!(date(2024, 3, 1).add_days(-1), date(2024, 2, 29));
    }

    #[test]
    fn add_days_inverse_law() {
        let mut d = date(2023, 12, 25);
        for _ in 0..800 {
            assert_eq!(d.add_days(1).add_days(-1), d);
            assert_eq!(d.add_days(-1).add_days(1), d);
            d = d.add_days(1);
        }
    }

    #[test]
    fn add_months_preserves_day_and_rolls_year() {
        assert_eq!(date(2024, 6, 15).add_months(1), date(2024, 7, 15));
        assert_eq!(date(2024, 12, 15).add_months(1), date(2025, 1, 15));
        assert_eq!(date(2024, 1, 15).add_months(-1), date(2023, 12, 15));
    }

    #[test]
    fn add_months_clamps_to_last_day() {
        assert_eq!(date(2024, 1, 31).add_months(1), date(2024, 2, 29));
        assert_eq!(date(2023, 1, 31).add_months(1), date(2023, 2, 28));
        assert_eq!(date(2024, 3, 31).add_months(-1), date(2024, 2, 29));
        assert_eq!(date(2024, 5, 31).add_months(1), date(2024, 6, 30));
    }

    #[test]
    fn month_round_trip_without_clamping() {
        let start = date(2024, 7, 31);
        let end = start.add_months(1).add_months(1).add_months(-1).add_months(-1);
        // September has 30 days, so passing through it clamps to the 30th.
        assert_eq!(start.add_months(1).add_months(-1), start);
        assert_eq!(end, date(2024, 7, 30));

        let safe = date(2024, 6, 15);
        let back = safe.add_months(1).add_months(1).add_months(-1).add_months(-1);
        assert_eq!(back, safe);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(date(2024, 2, 10).days_in_month(), 29);
        assert_eq!(date(2023, 2, 10).days_in_month(), 28);
        assert_eq!(date(2024, 4, 1).days_in_month(), 30);
        assert_eq!(date(2024, 12, 31).days_in_month(), 31);
    }

    #[test]
    fn cursor_steps_days() {
        let mut cursor = DateCursor::new(date(2024, 6, 15));
        cursor.step_day(1);
        assert_eq!(cursor.current(), date(2024, 6, 16));
        cursor.step_day(-1);
        cursor.step_day(-1);
        assert_eq!(cursor.current(), date(2024, 6, 14));
    }

    #[test]
    fn cursor_steps_months() {
        let mut cursor = DateCursor::new(date(2024, 6, 15));
        cursor.step_month(1);
        assert_eq!(cursor.current(), date(2024, 7, 15));
        cursor.step_month(-1);
        cursor.step_month(-1);
        assert_eq!(cursor.current(), date(2024, 5, 15));
    }

    #[test]
    fn close_restores_initial_after_navigation() {
        let mut cursor = DateCursor::new(date(2024, 6, 15));
        cursor.open();
        cursor.step_day(1);
        cursor.step_day(1);
        cursor.step_month(3);
        assert_eq!(cursor.current(), date(2024, 9, 17));

        cursor.close();
        assert!(!cursor.is_open());
        assert_eq!(cursor.current(), date(2024, 6, 15));
        assert_eq!(cursor.initial(), date(2024, 6, 15));
    }

    #[test]
    fn open_does_not_move_cursor() {
        let mut cursor = DateCursor::new(date(2024, 6, 15));
        cursor.open();
        assert!(cursor.is_open());
        assert_eq!(cursor.current(), date(2024, 6, 15));
    }

    #[test]
    fn select_commits_new_baseline() {
        let mut cursor = DateCursor::new(date(2024, 6, 15));
        cursor.open();
        cursor.step_day(2);
        assert_eq!(cursor.select(), date(2024, 6, 17));
        assert!(!cursor.is_open());
        assert_eq!(cursor.initial(), date(2024, 6, 17));

        cursor.open();
        cursor.step_day(5);
        cursor.close();
        assert_eq!(cursor.current(), date(2024, 6, 17));
    }
}
