//! The view surface the controller drives, plus the sizing and scrolling
//! arithmetic hosts share.

use crate::render::ChatMessage;

/// Handle to an appended message, issued by the view surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// UI regions the conversation controller reads from and writes to.
///
/// Implementations own the message list, the input field and the submit
/// control. Appending must leave the newest entry in view.
pub trait ViewSurface {
    fn append_message(&mut self, message: ChatMessage) -> MessageId;

    /// Remove exactly one entry. Unknown ids are ignored.
    fn remove_message(&mut self, id: MessageId) -> bool;

    fn read_input_text(&self) -> String;

    fn clear_input(&mut self);

    fn set_submit_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self);

    /// Grow the input to fit its content, up to the host's maximum.
    fn auto_grow_input(&mut self) {}

    /// Return the input to its default height.
    fn reset_input_height(&mut self) {}
}

/// Height rules for a growing input box, in host units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSizing {
    pub default_height: u16,
    pub max_height: u16,
    pub line_height: u16,
    pub padding: u16,
}

impl Default for InputSizing {
    fn default() -> Self {
        Self {
            default_height: 50,
            max_height: 120,
            line_height: 20,
            padding: 10,
        }
    }
}

impl InputSizing {
    /// Height needed to show `text`, never below the default or above the
    /// maximum.
    pub fn height_for(&self, text: &str) -> u16 {
        let lines = text.split('\n').count().max(1);
        let lines = u16::try_from(lines).unwrap_or(u16::MAX);
        let content = lines
            .saturating_mul(self.line_height)
            .saturating_add(self.padding);
        content.clamp(self.default_height, self.max_height.max(self.default_height))
    }
}

/// Scroll position of a message list, in host units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top.
    pub offset: u16,
    /// Visible height.
    pub viewport: u16,
    /// Total content height.
    pub content: u16,
}

impl ScrollMetrics {
    pub fn bottom_offset(&self) -> u16 {
        self.content.saturating_sub(self.viewport)
    }

    /// Whether the end of the content is in view, allowing `slack` units
    /// short of it.
    pub fn is_at_bottom(&self, slack: u16) -> bool {
        self.offset.saturating_add(self.viewport) >= self.content.saturating_sub(slack)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.bottom_offset();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.offset).saturating_add(delta);
        self.offset = next.clamp(0, i32::from(self.bottom_offset())) as u16;
    }
}
