use grocer_core::{ChatMessage, InputSizing, MessageId, ScrollMetrics, ViewSurface};

/// Input box sizing in terminal rows (borders excluded).
pub const TERMINAL_INPUT: InputSizing = InputSizing {
    default_height: 1,
    max_height: 6,
    line_height: 1,
    padding: 0,
};

/// Rows short of the end that still count as following the conversation.
const FOLLOW_SLACK: u16 = 0;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: MessageId,
    pub message: ChatMessage,
}

/// The terminal's message list, input buffer and submit control.
pub struct TerminalView {
    next_id: u64,
    entries: Vec<Entry>,

    input: String,
    cursor: usize, // char index into `input`
    input_height: u16,
    input_focused: bool,
    submit_enabled: bool,

    pub scroll: ScrollMetrics,
    follow_bottom: bool,

    // Image URLs appended since the last drain
    unprobed_images: Vec<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
            input: String::new(),
            cursor: 0,
            input_height: TERMINAL_INPUT.default_height,
            input_focused: true,
            submit_enabled: true,
            scroll: ScrollMetrics::default(),
            follow_bottom: true,
            unprobed_images: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input_height(&self) -> u16 {
        self.input_height
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn blur_input(&mut self) {
        self.input_focused = false;
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Row and column of the cursor within the (multi-line) input.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.input.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    // Scrolling

    /// Record the rendered size of the message list. Keeps the newest entry
    /// visible unless the user has scrolled away from the bottom.
    pub fn update_scroll(&mut self, content: u16, viewport: u16) {
        self.scroll.content = content;
        self.scroll.viewport = viewport;
        if self.follow_bottom {
            self.scroll.scroll_to_bottom();
        } else {
            self.scroll.scroll_by(0);
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll.scroll_by(delta);
        self.follow_bottom = self.scroll.is_at_bottom(FOLLOW_SLACK);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll.offset = 0;
        self.follow_bottom = self.scroll.is_at_bottom(FOLLOW_SLACK);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
        self.follow_bottom = true;
    }

    pub fn is_following(&self) -> bool {
        self.follow_bottom
    }

    // Images

    pub fn take_unprobed_images(&mut self) -> Vec<String> {
        std::mem::take(&mut self.unprobed_images)
    }

    pub fn mark_image_failed(&mut self, src: &str) -> usize {
        self.entries
            .iter_mut()
            .map(|entry| entry.message.mark_image_failed(src))
            .sum()
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSurface for TerminalView {
    fn append_message(&mut self, message: ChatMessage) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(self.next_id);

        for src in message.image_sources() {
            if !self.unprobed_images.contains(&src) {
                self.unprobed_images.push(src);
            }
        }

        self.entries.push(Entry { id, message });
        self.follow_bottom = true;
        id
    }

    fn remove_message(&mut self, id: MessageId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    fn read_input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }

    fn auto_grow_input(&mut self) {
        self.input_height = TERMINAL_INPUT.height_for(&self.input);
    }

    fn reset_input_height(&mut self) {
        self.input_height = TERMINAL_INPUT.default_height;
    }
}
