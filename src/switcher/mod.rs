pub mod date;
pub mod route;

pub use date::{CalendarDate, DateCursor};
pub use route::Route;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to the quick switcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwitcherOutcome {
    /// Not a switcher key; the host should handle it.
    Ignored,
    Opened,
    /// Swallowed while open without changing anything.
    Consumed,
    Moved {
        date: CalendarDate,
        month_changed: bool,
    },
    /// Dismissed without a selection; the cursor is back at its baseline.
    Dismissed,
    Selected(CalendarDate),
}

/// Closed/Open state machine around a [`DateCursor`].
///
/// Closed: the hotkey opens. Open: the hotkey or Esc dismisses, Enter selects,
/// Left/Right step a day and Up/Down step a month.
#[derive(Debug, Clone)]
pub struct QuickSwitcher {
    cursor: DateCursor,
    hotkey: KeyEvent,
    switchable: bool,
}

impl QuickSwitcher {
    pub fn for_route(route: &Route, today: CalendarDate, hotkey: KeyEvent) -> Self {
        let initial = route.date(today).unwrap_or(today);
        Self {
            cursor: DateCursor::new(initial),
            hotkey,
            switchable: route.is_switchable(),
        }
    }

    pub fn cursor(&self) -> &DateCursor {
        &self.cursor
    }

    pub fn is_open(&self) -> bool {
        self.cursor.is_open()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> SwitcherOutcome {
        let is_hotkey = key.code == self.hotkey.code && key.modifiers == self.hotkey.modifiers;

        if !self.cursor.is_open() {
            if is_hotkey && self.switchable {
                self.cursor.open();
                return SwitcherOutcome::Opened;
            }
            return SwitcherOutcome::Ignored;
        }

        if is_hotkey {
            self.cursor.close();
            return SwitcherOutcome::Dismissed;
        }

        let before = self.cursor.current();
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.cursor.close();
                return SwitcherOutcome::Dismissed;
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                return SwitcherOutcome::Selected(self.cursor.select());
            }
            (KeyModifiers::NONE, KeyCode::Left) => self.cursor.step_day(-1),
            (KeyModifiers::NONE, KeyCode::Right) => self.cursor.step_day(1),
            (KeyModifiers::NONE, KeyCode::Up) => self.cursor.step_month(-1),
            (KeyModifiers::NONE, KeyCode::Down) => self.cursor.step_month(1),
            _ => return SwitcherOutcome::Consumed,
        }

        let date = self.cursor.current();
        SwitcherOutcome::Moved {
            date,
            month_changed: !date.same_month(before),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    fn hotkey() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn switcher_at(path: &str) -> QuickSwitcher {
        let route = Route::parse(path).unwrap();
        QuickSwitcher::for_route(&route, date(2024, 7, 1), hotkey())
    }

    #[test]
    fn starts_closed() {
        let sw = switcher_at("/dates/2024-06-15");
        assert!(!sw.is_open());
    }

    #[test]
    fn hotkey_opens_and_closes() {
        let mut sw = switcher_at("/dates/2024-06-15");
        assert_eq!(sw.handle_key(&hotkey()), SwitcherOutcome::Opened);
        assert!(sw.is_open());
        assert_eq!(sw.handle_key(&hotkey()), SwitcherOutcome::Dismissed);
        assert!(!sw.is_open());
    }

    #[test]
    fn escape_closes() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        assert_eq!(sw.handle_key(&key(KeyCode::Esc)), SwitcherOutcome::Dismissed);
        assert!(!sw.is_open());
    }

    #[test]
    fn default_date_follows_route() {
        assert_eq!(
            switcher_at("/dates/2024-06-15").cursor().current(),
            date(2024, 6, 15)
        );
        assert_eq!(switcher_at("/").cursor().current(), date(2024, 7, 1));
    }

    #[test]
    fn left_and_right_step_days() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        sw.handle_key(&key(KeyCode::Right));
        assert_eq!(sw.cursor().current(), date(2024, 6, 16));
        sw.handle_key(&key(KeyCode::Left));
        sw.handle_key(&key(KeyCode::Left));
        assert_eq!(sw.cursor().current(), date(2024, 6, 14));
    }

    #[test]
    fn down_and_up_step_months() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        let outcome = sw.handle_key(&key(KeyCode::Down));
        assert_eq!(
            outcome,
            SwitcherOutcome::Moved {
                date: date(2024, 7, 15),
                month_changed: true
            }
        );
        sw.handle_key(&key(KeyCode::Up));
        sw.handle_key(&key(KeyCode::Up));
        assert_eq!(sw.cursor().current(), date(2024, 5, 15));
    }

    #[test]
    fn day_step_within_month_reports_no_month_change() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        assert_eq!(
            sw.handle_key(&key(KeyCode::Right)),
            SwitcherOutcome::Moved {
                date: date(2024, 6, 16),
                month_changed: false
            }
        );
    }

    #[test]
    fn dismiss_resets_date_for_next_open() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        sw.handle_key(&key(KeyCode::Right));
        sw.handle_key(&key(KeyCode::Right));
        assert_eq!(sw.cursor().current(), date(2024, 6, 17));

        sw.handle_key(&key(KeyCode::Esc));
        sw.handle_key(&hotkey());
        assert_eq!(sw.cursor().current(), date(2024, 6, 15));
    }

    #[test]
    fn not_switchable_route_ignores_hotkey() {
        let mut sw = switcher_at("/other/123");
        assert_eq!(sw.handle_key(&hotkey()), SwitcherOutcome::Ignored);
        assert!(!sw.is_open());
    }

    #[test]
    fn enter_selects_current_date() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        assert_eq!(
            sw.handle_key(&key(KeyCode::Enter)),
            SwitcherOutcome::Selected(date(2024, 6, 15))
        );
        assert!(!sw.is_open());
    }

    #[test]
    fn selection_becomes_baseline() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        sw.handle_key(&key(KeyCode::Right));
        sw.handle_key(&key(KeyCode::Enter));
        sw.handle_key(&hotkey());
        assert_eq!(sw.cursor().current(), date(2024, 6, 16));
    }

    #[test]
    fn open_switcher_swallows_other_keys() {
        let mut sw = switcher_at("/dates/2024-06-15");
        sw.handle_key(&hotkey());
        assert_eq!(sw.handle_key(&key(KeyCode::Char('x'))), SwitcherOutcome::Consumed);
        assert!(sw.is_open());
    }

    #[test]
    fn closed_switcher_ignores_navigation_keys() {
        let mut sw = switcher_at("/dates/2024-06-15");
        assert_eq!(sw.handle_key(&key(KeyCode::Right)), SwitcherOutcome::Ignored);
        assert_eq!(sw.cursor().current(), date(2024, 6, 15));
    }
}
