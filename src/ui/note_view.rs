use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use daynote::mention::{parse_segments, Segment};

use crate::edit_buffer::EditBuffer;

pub struct NoteView<'a> {
    pub buffer: &'a EditBuffer,
    pub trigger: char,
    pub editing: bool,
    pub loading: bool,
    pub read_only: bool,
    /// False for routes without a note, including rejected ones.
    pub has_date: bool,
}

impl NoteView<'_> {
    /// First buffer line shown, keeping the cursor on screen while editing.
    pub fn scroll(&self, height: usize) -> usize {
        let (cursor_line, _) = self.buffer.cursor_line_col();
        if self.editing && height > 0 && cursor_line >= height {
            cursor_line + 1 - height
        } else {
            0
        }
    }
}

impl Widget for NoteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.has_date {
            return;
        }
        if self.loading {
            render_centered_message("Loading note...", area, buf);
            return;
        }
        if self.buffer.is_empty() && !self.editing {
            let msg = if self.read_only {
                "No note for this day"
            } else {
                "Nothing written yet. Press i to start"
            };
            render_centered_message(msg, area, buf);
            return;
        }

        let text = self.buffer.text();
        let (cursor_line, cursor_col) = self.buffer.cursor_line_col();
        let scroll = self.scroll(area.height as usize);

        for (row, (idx, line)) in text
            .split('\n')
            .enumerate()
            .skip(scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let rendered = if self.editing && idx == cursor_line {
                cursor_line_spans(line, cursor_col)
            } else {
                styled_line(line, self.trigger)
            };
            let line_area = Rect::new(area.x, area.y + row as u16, area.width, 1);
            rendered.render(line_area, buf);
        }
    }
}

fn styled_line(line: &str, trigger: char) -> Line<'static> {
    let spans: Vec<Span<'static>> = parse_segments(line, trigger)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(t) => Span::raw(t),
            Segment::Mention(label) => Span::styled(
                format!("{}{}", trigger, label),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        })
        .collect();
    Line::from(spans)
}

fn cursor_line_spans(line: &str, cursor_col: usize) -> Line<'static> {
    let chars: Vec<char> = line.chars().collect();
    let col = cursor_col.min(chars.len());
    let before: String = chars[..col].iter().collect();
    let cursor_char = chars.get(col).copied().unwrap_or(' ');
    let after: String = chars.get(col + 1..).map(|s| s.iter().collect()).unwrap_or_default();

    let mut spans = vec![
        Span::raw(before),
        Span::styled(
            cursor_char.to_string(),
            Style::default().fg(Color::Black).bg(Color::White),
        ),
    ];
    if !after.is_empty() {
        spans.push(Span::raw(after));
    }
    Line::from(spans)
}

fn render_centered_message(msg: &str, area: Rect, buf: &mut Buffer) {
    if area.height > 0 {
        let line = Line::styled(msg, Style::default().fg(Color::DarkGray));
        let y = area.y + area.height / 2;
        let render_area = Rect::new(area.x, y, area.width, 1);
        line.render(render_area, buf);
    }
}
