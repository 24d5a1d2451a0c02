//! Application state structures.
//!
//! This module contains the state definitions for the parts of the
//! application:
//!
//! - **`Session`**: conversation history, active mode, busy flag
//! - **`ComposerState`**: the draft input, `@` tokens, and popups
//! - **`ModeSelectState`**: the mode selector overlay
//! - **`QuizUiState`**: per-entry quiz attempts and quiz focus
//! - **`ScrollState`** / **`LayoutState`**: transcript scrolling and frame
//!   layout
//! - **`AppEvent`**: messages from background tasks to the UI loop
//!
//! The session owns the conversation truth: history is append-only (entries
//! are immutable once pushed, nothing removes them), the mode defaults to
//! `Summary`, and `busy` is the hard guard that keeps at most one chat
//! request in flight.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tui_textarea::TextArea;

use crate::api::{ApiError, ChatMode, ConversationEntry};
use crate::picker::DocumentSearch;
use crate::tui::widgets::{CommandPopupState, DocPopupState};

use super::commands::SlashToken;

/// Placeholder shown in the empty composer.
pub(crate) const COMPOSER_PLACEHOLDER: &str =
    "Ask a question, @ to attach a document, / for commands...";

/// Application mode.
///
/// - **Chat**: the main interface (transcript, status bar, composer).
/// - **`ModeSelect`**: modal overlay for picking the conversation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Chat interface.
    #[default]
    Chat,
    /// Mode selector overlay (Ctrl+S or `/mode`).
    ModeSelect,
}

/// Events sent from background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The in-flight chat request finished: raw 2xx body or failure.
    ChatFinished(Result<String, ApiError>),
    /// An upload finished.
    UploadFinished {
        /// Display name of the uploaded file.
        file: String,
        /// Outcome of the upload.
        result: Result<(), ApiError>,
    },
    /// Document search result from the background picker task.
    SearchResult {
        /// Generation of the search request (stale results are dropped).
        generation: u64,
        /// The matches.
        result: DocumentSearch,
    },
}

/// Query sent to the background document search task.
#[derive(Debug, Clone)]
pub struct PickerQuery {
    /// The search query string (text after `@`).
    pub query: String,
    /// The directory to search in.
    pub root: PathBuf,
    /// Generation counter for debouncing/cancellation.
    pub generation: u64,
}

/// Information about an `@` token being typed.
///
/// Tracks the location and content of an `@`-prefixed token the cursor is
/// within or immediately after, used to drive the document picker popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtToken {
    /// The query text (without the `@` prefix).
    pub query: String,
    /// Byte position where the `@` starts in the current line.
    pub start_byte: usize,
    /// Byte position where the token ends (cursor position or whitespace).
    pub end_byte: usize,
    /// The row (line index) containing the token.
    pub row: usize,
}

/// The conversation session.
///
/// Created at startup with an empty history and the default mode; lives for
/// the life of the process and is never persisted; a restart is the "full
/// reload" that clears it.
#[derive(Debug, Default)]
pub struct Session {
    /// Active conversation intent for the next request.
    pub mode: ChatMode,
    /// True while a chat request is in flight. Suppresses new submissions.
    pub busy: bool,
    history: Vec<ConversationEntry>,
}

impl Session {
    /// Creates an empty session in the default mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conversation history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }

    /// Appends an entry and returns its index.
    ///
    /// The only way history changes: entries are immutable once pushed and
    /// nothing removes them.
    pub(crate) fn push(&mut self, entry: ConversationEntry) -> usize {
        self.history.push(entry);
        self.history.len() - 1
    }
}

/// State for the composer (draft input).
pub struct ComposerState {
    /// The text area widget holding the draft.
    pub textarea: TextArea<'static>,
    /// Current `@` token being typed (if any).
    pub at_token: Option<AtToken>,
    /// Document suggestion popup state.
    pub doc_popup: DocPopupState,
    /// Slash command suggestion popup state.
    pub command_popup: CommandPopupState,
    /// Current slash token being typed (if any).
    pub slash_token: Option<SlashToken>,
    /// Last document search query (for debouncing).
    pub(crate) last_search_query: Option<String>,
    /// Last document search time (for debouncing).
    pub(crate) last_search_time: Option<Instant>,
    /// Channel sender for search queries to the background task.
    pub(crate) search_tx: mpsc::Sender<PickerQuery>,
    /// Current search generation (incremented per search).
    pub(crate) search_generation: u64,
}

impl ComposerState {
    /// Creates a new composer state with an empty draft.
    #[must_use]
    pub fn new(search_tx: mpsc::Sender<PickerQuery>) -> Self {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(COMPOSER_PLACEHOLDER);
        Self {
            textarea,
            at_token: None,
            doc_popup: DocPopupState::default(),
            command_popup: CommandPopupState::default(),
            slash_token: None,
            last_search_query: None,
            last_search_time: None,
            search_tx,
            search_generation: 0,
        }
    }

    /// Clears the draft and all popup state.
    pub fn clear(&mut self) {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(COMPOSER_PLACEHOLDER);
        self.textarea = textarea;
        self.at_token = None;
        self.doc_popup = DocPopupState::default();
        self.command_popup = CommandPopupState::default();
        self.slash_token = None;
        self.last_search_query = None;
    }

    /// Returns the lines of the draft.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        self.textarea.lines()
    }

    /// Returns the cursor position as (row, col), both zero-indexed.
    /// `col` is a character position, not a byte position.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        self.textarea.cursor()
    }

    /// Collects the draft into a single string.
    #[must_use]
    pub fn collect_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Replaces the draft content (for testing).
    #[cfg(test)]
    pub fn set_lines(&mut self, lines: Vec<String>) {
        let mut textarea = TextArea::new(lines);
        textarea.set_placeholder_text(COMPOSER_PLACEHOLDER);
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        self.textarea = textarea;
    }
}

/// State for the mode selector overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSelectState {
    /// Currently selected index into [`ChatMode::all`].
    pub selected: usize,
}

impl ModeSelectState {
    /// Creates a selector positioned on the given mode.
    #[must_use]
    pub fn for_mode(mode: ChatMode) -> Self {
        let selected = ChatMode::all()
            .iter()
            .position(|m| *m == mode)
            .unwrap_or_default();
        Self { selected }
    }

    /// Moves the selection up, saturating at the first mode.
    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Moves the selection down, saturating at the last mode.
    pub fn select_down(&mut self) {
        self.selected = (self.selected + 1).min(ChatMode::all().len() - 1);
    }

    /// Returns the mode under the selection.
    #[must_use]
    pub fn selected_mode(&self) -> ChatMode {
        ChatMode::all()
            .get(self.selected)
            .copied()
            .unwrap_or_default()
    }
}

/// Per-session quiz UI state.
///
/// Attempts live outside the history because entries are immutable; they
/// are keyed by the history index of their quiz entry.
#[derive(Debug, Default)]
pub struct QuizUiState {
    /// Attempt state per quiz entry index.
    pub attempts: std::collections::HashMap<usize, super::QuizAttempt>,
    /// History index of the quiz that currently has keyboard focus.
    pub focus: Option<usize>,
}

impl QuizUiState {
    /// Returns the history index of the most recent unrevealed quiz.
    #[must_use]
    pub fn latest_unrevealed(&self) -> Option<usize> {
        self.attempts
            .iter()
            .filter(|(_, attempt)| !attempt.is_revealed())
            .map(|(idx, _)| *idx)
            .max()
    }
}

/// Scroll state for the transcript panel.
///
/// Follows the newest entry by default (the chat auto-scroll); manual
/// scrolling disengages following until the user returns to the bottom.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Current scroll offset in visual lines from the top.
    pub offset: usize,
    /// Whether to jump to the bottom when new content arrives.
    pub follow: bool,
}

impl ScrollState {
    /// Creates a scroll state that follows the latest content.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }

    /// Scrolls up by `amount` lines, disengaging follow.
    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
        self.follow = false;
    }

    /// Scrolls down by `amount` lines, re-engaging follow at the bottom.
    pub fn scroll_down(&mut self, amount: usize, content_len: usize, visible_height: usize) {
        let max_scroll = content_len.saturating_sub(visible_height);
        self.offset = (self.offset + amount).min(max_scroll);
        self.follow = self.offset >= max_scroll;
    }

    /// Jumps to the top, disengaging follow.
    pub fn to_top(&mut self) {
        self.offset = 0;
        self.follow = false;
    }

    /// Jumps to the bottom, re-engaging follow.
    pub fn to_bottom(&mut self, content_len: usize, visible_height: usize) {
        self.offset = content_len.saturating_sub(visible_height);
        self.follow = true;
    }

    /// Jumps to the bottom only when follow is engaged.
    pub fn follow_if_engaged(&mut self, content_len: usize, visible_height: usize) {
        if self.follow {
            self.offset = content_len.saturating_sub(visible_height);
        }
    }
}

/// Cached frame layout.
///
/// Stores the [`ChatLayout`] calculated once per frame so scroll math and
/// rendering agree on dimensions.
///
/// [`ChatLayout`]: super::ChatLayout
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutState {
    /// The cached chat layout.
    pub chat: super::ChatLayout,
}

impl LayoutState {
    /// Visible height of the transcript panel (excluding borders).
    #[must_use]
    pub const fn transcript_visible_height(&self) -> usize {
        self.chat.transcript_visible_height
    }

    /// Content width of the transcript panel (excluding borders and
    /// scrollbar).
    #[must_use]
    pub const fn transcript_content_width(&self) -> usize {
        self.chat.transcript_content_width
    }
}

/// Detects an `@` token at the given cursor position.
///
/// Scans the current line around the cursor for a token that starts with
/// `@` at a word boundary (line start or after whitespace). Returns the
/// token with byte boundaries for later replacement.
#[must_use]
pub fn detect_at_token(
    lines: &[String],
    cursor_row: usize,
    cursor_char_col: usize,
) -> Option<AtToken> {
    let line = lines.get(cursor_row)?;
    if line.is_empty() {
        return None;
    }

    let char_info: Vec<(usize, char)> = line.char_indices().collect();
    let cursor_char_idx = cursor_char_col.min(char_info.len());

    // Left boundary: whitespace or line start.
    let mut left_char_idx = cursor_char_idx;
    while left_char_idx > 0 {
        let (_, ch) = char_info[left_char_idx - 1];
        if ch.is_whitespace() {
            break;
        }
        left_char_idx -= 1;
    }

    // Right boundary: whitespace or line end.
    let mut right_char_idx = cursor_char_idx;
    while right_char_idx < char_info.len() {
        let (_, ch) = char_info[right_char_idx];
        if ch.is_whitespace() {
            break;
        }
        right_char_idx += 1;
    }

    if left_char_idx >= right_char_idx {
        return None;
    }

    let start_byte = char_info[left_char_idx].0;
    let end_byte = if right_char_idx < char_info.len() {
        char_info[right_char_idx].0
    } else {
        line.len()
    };

    let token = &line[start_byte..end_byte];
    if !token.starts_with('@') {
        return None;
    }

    // The '@' must sit at a word boundary.
    if left_char_idx > 0 {
        let (_, prev_ch) = char_info[left_char_idx - 1];
        if !prev_ch.is_whitespace() {
            return None;
        }
    }

    Some(AtToken {
        query: token[1..].to_string(),
        start_byte,
        end_byte,
        row: cursor_row,
    })
}





#[cfg(test)]
mod at_token_tests {
    use super::*;

    fn lines(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn detects_token_at_line_start() {
        let token = detect_at_token(&lines(&["@notes"]), 0, 6).expect("token");
        assert_eq!(token.query, "notes");
        assert_eq!(token.start_byte, 0);
        assert_eq!(token.end_byte, 6);
        assert_eq!(token.row, 0);
    }

    #[test]
    fn detects_token_after_whitespace() {
        let token = detect_at_token(&lines(&["/upload @syl"]), 0, 12).expect("token");
        assert_eq!(token.query, "syl");
        assert_eq!(token.start_byte, 8);
    }

    #[test]
    fn bare_at_has_empty_query() {
        let token = detect_at_token(&lines(&["@"]), 0, 1).expect("token");
        assert_eq!(token.query, "");
    }

    #[test]
    fn at_inside_a_word_is_not_a_token() {
        assert!(detect_at_token(&lines(&["user@host"]), 0, 9).is_none());
    }

    #[test]
    fn no_token_on_plain_text() {
        assert!(detect_at_token(&lines(&["hello world"]), 0, 5).is_none());
    }

    #[test]
    fn empty_line_has_no_token() {
        assert!(detect_at_token(&lines(&[""]), 0, 0).is_none());
    }

    #[test]
    fn cursor_row_out_of_range_is_none() {
        assert!(detect_at_token(&lines(&["@a"]), 3, 0).is_none());
    }
}
