use chrono::Datelike;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear, Widget};

use daynote::switcher::CalendarDate;

const WEEKDAYS: &str = "Mo Tu We Th Fr Sa Su";

/// Outer size of the popup: a 7-column grid, month title, weekday row, up
/// to six weeks and the selected date.
pub const POPUP_WIDTH: u16 = 24;
pub const POPUP_HEIGHT: u16 = 12;

/// Month grid around the switcher cursor.
pub struct SwitcherPopup<'a> {
    pub cursor: CalendarDate,
    pub today: CalendarDate,
    /// Days of the cursor's month that already have a note.
    pub note_days: &'a [u32],
}

impl Widget for SwitcherPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = WidgetBlock::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Go to date ");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut rows = vec![
            Line::from(Span::styled(
                self.cursor.naive().format("%B %Y").to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::styled(WEEKDAYS, Style::default().fg(Color::DarkGray)),
        ];
        rows.extend(self.week_rows());
        rows.push(Line::styled(
            self.cursor.to_string(),
            Style::default().fg(Color::Gray),
        ));

        for (i, row) in rows.into_iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let line_area = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
            row.render(line_area, buf);
        }
    }
}

impl SwitcherPopup<'_> {
    fn week_rows(&self) -> Vec<Line<'static>> {
        let first = self.cursor.first_of_month();
        let offset = first.naive().weekday().num_days_from_monday() as usize;
        let days = self.cursor.days_in_month();

        let mut weeks = Vec::new();
        let mut spans: Vec<Span<'static>> = vec![Span::raw("   ".repeat(offset))];
        let mut column = offset;

        for day in 1..=days {
            spans.push(Span::styled(format!("{:>2}", day), self.day_style(day)));
            column += 1;
            if column == 7 {
                weeks.push(Line::from(std::mem::take(&mut spans)));
                column = 0;
            } else {
                spans.push(Span::raw(" "));
            }
        }
        if column > 0 {
            weeks.push(Line::from(spans));
        }
        weeks
    }

    fn day_style(&self, day: u32) -> Style {
        let mut style = if day == self.cursor.day() {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if self.note_days.contains(&day) {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if self.cursor.same_month(self.today) && day == self.today.day() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}
