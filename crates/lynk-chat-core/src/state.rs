//! UI-agnostic chat log types
//!
//! The log is the only state the client keeps. Messages are appended in the
//! order they occur and are never edited or removed; the backend owns the
//! actual conversation state.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You:",
            Sender::Bot => "Bot:",
        }
    }
}

/// A single entry in the chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    /// Rendered as a fixed-width block (YAML payloads)
    pub formatted: bool,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender, formatted: bool) -> Self {
        Self {
            text: text.into(),
            sender,
            formatted,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, false)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, false)
    }

    pub fn formatted_bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, true)
    }
}

/// How a rendered line should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Label(Sender),
    Body(Sender),
    Block,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub kind: LineKind,
    pub text: String,
}

impl RenderedLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Gutter drawn in front of every line of a formatted block
pub const BLOCK_GUTTER: &str = "│ ";

/// Append-only message log with a scroll position that follows the newest entry.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    // Display line count per message at `viewport_width`
    line_counts: Vec<usize>,
    total_lines: usize,
    scroll: usize,
    viewport_width: usize,
    viewport_height: usize,
    follow: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            follow: true,
            ..Self::default()
        }
    }

    /// Append a message and snap the view to the bottom
    pub fn push(&mut self, message: Message) {
        let count = message_lines(&message, self.viewport_width).len();
        self.line_counts.push(count);
        self.total_lines += count;
        self.messages.push(message);
        self.scroll_to_bottom();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Record the inner size of the pane the log is drawn into.
    /// Messages are laid out again only when the width changes.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        if width != self.viewport_width {
            self.viewport_width = width;
            self.relayout();
        }
        self.viewport_height = height;
        if self.follow {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = self.scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.max_scroll();
        self.scroll = (self.scroll + lines).min(max);
        self.follow = self.scroll >= max;
    }

    /// Largest scroll offset that still fills the viewport
    pub fn max_scroll(&self) -> usize {
        self.total_lines().saturating_sub(self.viewport_height)
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    fn relayout(&mut self) {
        let width = self.viewport_width;
        self.line_counts = self
            .messages
            .iter()
            .map(|m| message_lines(m, width).len())
            .collect();
        self.total_lines = self.line_counts.iter().sum();
    }

    /// Most recent formatted block, if any
    pub fn latest_formatted(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.formatted)
    }

    /// Lay out every message as display lines for the given width.
    pub fn rendered_lines(&self, width: usize) -> Vec<RenderedLine> {
        self.messages
            .iter()
            .flat_map(|m| message_lines(m, width))
            .collect()
    }

    /// Display lines `start..start + count` at the viewport width.
    ///
    /// Only the messages that overlap the window are laid out.
    pub fn visible_lines(&self, start: usize, count: usize) -> Vec<RenderedLine> {
        let mut lines = Vec::with_capacity(count);
        let mut offset = 0;

        for (message, &n) in self.messages.iter().zip(&self.line_counts) {
            if lines.len() >= count {
                break;
            }
            if offset + n > start {
                let skip = start.saturating_sub(offset);
                let take = count - lines.len();
                lines.extend(
                    message_lines(message, self.viewport_width)
                        .into_iter()
                        .skip(skip)
                        .take(take),
                );
            }
            offset += n;
        }

        lines
    }
}

/// A sender label line, the wrapped body, and a blank separator.
///
/// Plain text is word-wrapped; formatted blocks keep their own line breaks
/// and indentation and are hard-wrapped behind a gutter.
fn message_lines(message: &Message, width: usize) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine::new(
        LineKind::Label(message.sender),
        message.sender.label(),
    )];

    if message.formatted {
        let gutter_len = BLOCK_GUTTER.chars().count();
        let inner = width.saturating_sub(gutter_len);
        for raw in message.text.trim_end_matches('\n').split('\n') {
            for chunk in hard_wrap(raw, inner) {
                lines.push(RenderedLine::new(
                    LineKind::Block,
                    format!("{}{}", BLOCK_GUTTER, chunk),
                ));
            }
        }
    } else {
        for raw in message.text.split('\n') {
            for wrapped in wrap_text_to_width(raw, width) {
                lines.push(RenderedLine::new(LineKind::Body(message.sender), wrapped));
            }
        }
    }

    lines.push(RenderedLine::new(LineKind::Blank, ""));
    lines
}

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }

        // Words longer than the line get split
        while current_len > width {
            let head: String = current_line.chars().take(width).collect();
            let tail: String = current_line.chars().skip(width).collect();
            lines.push(head);
            current_len = tail.chars().count();
            current_line = tail;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Split by character count, keeping leading whitespace intact
fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
