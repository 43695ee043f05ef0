use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

pub struct Header<'a> {
    pub route: &'a str,
    pub date: &'a str,
    pub dirty: bool,
    pub read_only: bool,
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = Style::default().bg(Color::DarkGray);

        let title = Span::styled(
            " daynote ",
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

        let route = Span::styled(
            format!(" [{}] ", self.route),
            Style::default().fg(Color::Cyan).bg(Color::DarkGray),
        );

        let marker = if self.dirty {
            Span::styled(" ● ", Style::default().fg(Color::Yellow).bg(Color::DarkGray))
        } else if self.read_only {
            Span::styled(" read-only ", Style::default().fg(Color::Gray).bg(Color::DarkGray))
        } else {
            Span::styled("", bg)
        };

        let date = Span::styled(
            format!("{} ", self.date),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let used = title.width() + route.width() + marker.width() + date.width();
        let spacer_len = (area.width as usize).saturating_sub(used);
        let spacer = Span::styled(" ".repeat(spacer_len), bg);

        let line = Line::from(vec![title, route, marker, spacer, date]);
        line.render(area, buf);
    }
}
