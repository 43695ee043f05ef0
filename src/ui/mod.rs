pub mod header;
pub mod note_view;
pub mod status_bar;
pub mod suggestions;
pub mod switcher;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block as WidgetBlock, BorderType, Borders, Clear};
use ratatui::Frame;

use crate::app::{AppState, InputMode};
use crate::error::ErrorPopup;

use header::Header;
use note_view::NoteView;
use status_bar::StatusBar;
use suggestions::SuggestionsPopup;
use switcher::SwitcherPopup;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let date_label = state
        .current_date()
        .map(|d| d.naive().format("%a, %b %d %Y").to_string())
        .unwrap_or_default();
    let route_label = state.route.path();
    let read_only = state.current_date().is_some() && !state.is_editable() && !state.loading;
    let header = Header {
        route: &route_label,
        date: &date_label,
        dirty: state.dirty,
        read_only,
    };
    frame.render_widget(header, chunks[0]);

    let editing = state.input_mode == InputMode::Insert;
    let body = chunks[1];
    let view = NoteView {
        buffer: &state.buffer,
        trigger: state.trigger,
        editing,
        loading: state.loading,
        read_only,
        has_date: state.current_date().is_some(),
    };
    let scroll = view.scroll(body.height as usize);
    frame.render_widget(view, body);

    if let Some(session) = &state.suggestions {
        let popup = SuggestionsPopup {
            trigger: state.trigger,
            query: session.query(),
            results: session.results(),
            selected: session.selected_index(),
            new_index: session.new_label_index(),
            pending: session.is_pending(),
            tick: state.tick,
        };
        let (line, col) = state.buffer.cursor_line_col();
        let popup_area = below_cursor(body, line.saturating_sub(scroll), col, popup.height());
        frame.render_widget(popup, popup_area);
    }

    if state.switcher.is_open() {
        let popup = SwitcherPopup {
            cursor: state.switcher.cursor().current(),
            today: state.today,
            note_days: &state.month_days,
        };
        frame.render_widget(popup, centered(body, switcher::POPUP_WIDTH, switcher::POPUP_HEIGHT));
    }

    if let Some(err) = &state.error_popup {
        render_error_popup(frame, err, body);
    }

    let status = StatusBar {
        hints: &state.hints,
        message: state.status_message.as_deref(),
        insert_mode: editing,
    };
    frame.render_widget(status, chunks[2]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Popup placed on the row under the cursor, shifted to stay inside `area`.
fn below_cursor(area: Rect, row: usize, col: usize, height: u16) -> Rect {
    let width = (area.width * 40 / 100).max(24).min(area.width);
    let height = height.min(area.height);
    let x = area.x + (col as u16).min(area.width.saturating_sub(width));
    let y = (area.y + row as u16 + 1).min(area.y + area.height.saturating_sub(height));
    Rect::new(x, y, width, height)
}

fn render_error_popup(frame: &mut Frame, popup: &ErrorPopup, area: Rect) {
    let popup_width = (area.width * 50 / 100).max(30).min(area.width);
    let inner_width = popup_width.saturating_sub(2) as usize; // -2 for borders

    let msg_lines = wrap_text(&popup.message, inner_width);
    // 1 blank top + msg lines + 1 blank + 1 hint + 1 blank + 1 footer
    let content_height = 1 + msg_lines.len() + 1 + 1 + 1 + 1;
    let popup_height = (content_height + 2).min(area.height as usize) as u16; // +2 borders

    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width, popup_height);
    frame.render_widget(Clear, popup_area);

    let title = format!(" ! {} ", popup.title);
    let block = WidgetBlock::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut row: u16 = 1;

    for line_text in &msg_lines {
        if row >= inner.height.saturating_sub(1) {
            break;
        }
        let line = Line::from(Span::styled(
            line_text.clone(),
            Style::default().fg(Color::White),
        ));
        frame.render_widget(line, Rect::new(inner.x, inner.y + row, inner.width, 1));
        row += 1;
    }

    row += 1;

    if row < inner.height.saturating_sub(1) {
        let hint = Line::from(Span::styled(
            popup.hint.clone(),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(hint, Rect::new(inner.x, inner.y + row, inner.width, 1));
        row += 1;
    }

    row += 1;

    if row < inner.height {
        let footer = Line::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        );
        frame.render_widget(footer, Rect::new(inner.x, inner.y + row, inner.width, 1));
    }
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
