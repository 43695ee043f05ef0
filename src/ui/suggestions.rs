use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear, Widget};

pub const MAX_VISIBLE: usize = 8;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Mention autocomplete list.
pub struct SuggestionsPopup<'a> {
    pub trigger: char,
    pub query: &'a str,
    pub results: &'a [String],
    pub selected: usize,
    /// Row offering the query as a project to create.
    pub new_index: Option<usize>,
    pub pending: bool,
    pub tick: u64,
}

impl SuggestionsPopup<'_> {
    /// Outer height for the current results, borders included.
    pub fn height(&self) -> u16 {
        let rows = if self.results.is_empty() {
            1
        } else {
            MAX_VISIBLE.min(self.results.len())
        };
        (rows + 2) as u16
    }
}

impl Widget for SuggestionsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = WidgetBlock::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Gray))
            .title(format!(" {}{} ", self.trigger, self.query));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.results.is_empty() {
            let style = Style::default().fg(Color::DarkGray);
            let text = if self.pending {
                let frame = SPINNER[(self.tick % SPINNER.len() as u64) as usize];
                format!("{} Searching...", frame)
            } else {
                "No results".to_string()
            };
            let line_area = Rect::new(inner.x, inner.y, inner.width, 1);
            Line::from(Span::styled(text, style)).render(line_area, buf);
            return;
        }

        // Scroll window: keep selected item visible
        let scroll_offset = if self.selected >= MAX_VISIBLE {
            self.selected - MAX_VISIBLE + 1
        } else {
            0
        };

        for (i, label) in self
            .results
            .iter()
            .skip(scroll_offset)
            .take(MAX_VISIBLE)
            .enumerate()
        {
            if i as u16 >= inner.height {
                break;
            }
            let index = i + scroll_offset;
            let is_selected = index == self.selected;
            let style = if is_selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray)
            };

            let text = if self.new_index == Some(index) {
                format!("{} (new)", label)
            } else {
                label.clone()
            };

            let max_text_width = inner.width as usize;
            let display: String = text.chars().take(max_text_width).collect();
            let padding = max_text_width.saturating_sub(display.chars().count());
            let padded = format!("{}{}", display, " ".repeat(padding));

            let line_area = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
            Line::from(Span::styled(padded, style)).render(line_area, buf);
        }
    }
}
