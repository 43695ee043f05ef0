use daynote::mention::format_mention;

/// Open mention trigger before the cursor: where the trigger sits and the
/// query typed after it.
#[derive(Debug, Clone, PartialEq)]
pub struct MentionSpan {
    pub start: usize,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub chars: Vec<char>,
    pub cursor: usize,
}

impl EditBuffer {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn new_empty() -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars[self.cursor..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| self.cursor + p)
            .unwrap_or(self.chars.len());
    }

    pub fn move_up(&mut self) {
        let current_line_start = self.line_start(self.cursor);
        if current_line_start == 0 {
            self.cursor = 0;
            return;
        }

        let col = self.cursor - current_line_start;
        let prev_line_end = current_line_start - 1; // the \n before current line
        let prev_line_start = self.line_start(prev_line_end);
        let prev_line_len = prev_line_end - prev_line_start;
        self.cursor = prev_line_start + col.min(prev_line_len);
    }

    pub fn move_down(&mut self) {
        let current_line_start = self.line_start(self.cursor);
        let current_line_end = self.chars[self.cursor..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| self.cursor + p)
            .unwrap_or(self.chars.len());

        if current_line_end >= self.chars.len() {
            self.cursor = self.chars.len();
            return;
        }

        let col = self.cursor - current_line_start;
        let next_line_start = current_line_end + 1;
        let next_line_end = self.chars[next_line_start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|p| next_line_start + p)
            .unwrap_or(self.chars.len());
        let next_line_len = next_line_end - next_line_start;
        self.cursor = next_line_start + col.min(next_line_len);
    }

    fn line_start(&self, pos: usize) -> usize {
        self.chars[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|p| p + 1)
            .unwrap_or(0)
    }

    /// Cursor as (line, column), both zero-based.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let line = self.chars[..self.cursor].iter().filter(|&&c| c == '\n').count();
        (line, self.cursor - self.line_start(self.cursor))
    }

    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        let new_chars: Vec<char> = replacement.chars().collect();
        let new_len = new_chars.len();
        self.chars.splice(start..end, new_chars);
        self.cursor = start + new_len;
    }

    /// The trigger span the cursor is in, if any.
    ///
    /// The trigger must start a word, and only non-whitespace may sit between
    /// it and the cursor. Already committed `@[label]` markup does not count.
    pub fn mention_span(&self, trigger: char) -> Option<MentionSpan> {
        let before = &self.chars[..self.cursor];
        let start = before
            .iter()
            .rposition(|&c| c == trigger || c.is_whitespace())?;
        if before[start] != trigger {
            return None;
        }
        if start > 0 && !before[start - 1].is_whitespace() {
            return None;
        }
        if before.get(start + 1) == Some(&'[') {
            return None;
        }
        Some(MentionSpan {
            start,
            query: before[start + 1..].iter().collect(),
        })
    }

    /// Replace the open trigger span with mention markup for `label`.
    pub fn commit_mention(&mut self, span: &MentionSpan, trigger: char, label: &str) {
        let markup = format!("{} ", format_mention(trigger, label));
        self.replace_range(span.start, self.cursor, &markup);
    }
}
