//! Layout calculation helpers for the TUI.
//!
//! Single source of truth for frame dimensions: the same [`ChatLayout`] is
//! used by scroll calculations and rendering, so offsets always match what
//! is on screen.

use ratatui::layout::{Constraint, Layout, Rect};

/// Layout information for the chat view.
///
/// - transcript scrolls above
/// - status bar and composer below
/// - one-line header and footer framing the whole thing
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatLayout {
    /// Header area (1 line).
    pub header: Rect,
    /// Conversation transcript (scrollable, grows).
    pub transcript: Rect,
    /// Status bar area (2 lines).
    pub status: Rect,
    /// Composer area.
    pub input: Rect,
    /// Footer area (key hints, 1 line).
    pub footer: Rect,
    /// Visible height of the transcript (excluding borders).
    pub transcript_visible_height: usize,
    /// Content width of the transcript (excluding borders and scrollbar).
    pub transcript_content_width: usize,
    /// Inner width of the composer (excluding borders).
    pub input_inner_width: usize,
    /// Inner height of the composer (excluding borders).
    pub input_inner_height: usize,
}

/// Layout constraints for the chat view.
const CHAT_LAYOUT_CONSTRAINTS: [Constraint; 5] = [
    Constraint::Length(1), // Header
    Constraint::Min(5),    // Transcript (grows)
    Constraint::Length(2), // Status bar
    Constraint::Length(5), // Composer
    Constraint::Length(1), // Footer
];

/// Calculates the layout for the chat view.
#[must_use]
pub fn calculate_chat_layout(area: Rect) -> ChatLayout {
    let chunks = Layout::vertical(CHAT_LAYOUT_CONSTRAINTS).split(area);

    let transcript = chunks[1];
    let input = chunks[3];

    // Transcript: borders top+bottom, one column for the scrollbar.
    let transcript_visible_height = transcript.height.saturating_sub(2) as usize;
    let transcript_content_width = transcript.width.saturating_sub(3) as usize;
    // Composer: borders on both axes.
    let input_inner_width = input.width.saturating_sub(2) as usize;
    let input_inner_height = input.height.saturating_sub(2) as usize;

    ChatLayout {
        header: chunks[0],
        transcript,
        status: chunks[2],
        input,
        footer: chunks[4],
        transcript_visible_height,
        transcript_content_width,
        input_inner_width,
        input_inner_height,
    }
}
