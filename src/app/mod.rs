//! Main application state and logic.
//!
//! The core `App` struct owns the session and orchestrates everything,
//! organized into submodules:
//! - `commands` - slash command system
//! - `events` - key routing and background event processing
//! - `layout` - frame layout calculation
//! - `render` - UI rendering
//! - `state` - state structures
//!
//! ## Concurrency shape
//!
//! Everything runs on the UI loop except the network calls and the document
//! search, which run in spawned tasks and report back over one mpsc channel.
//! At most one chat request is in flight at a time: `submit` is a no-op
//! while `session.busy` is set, a hard guard rather than a disabled button.
//! Uploads are independent of chat and of each other.

pub mod commands;
pub mod events;
mod layout;
mod render;
pub mod state;

#[cfg(test)]
mod tests;

pub use commands::{
    CommandOutcome, CommandRegistry, SlashToken, detect_slash_token, parse_slash_command,
};
pub use layout::{ChatLayout, calculate_chat_layout};
pub use state::{
    AppEvent, AppMode, AtToken, ComposerState, LayoutState, ModeSelectState, PickerQuery,
    QuizUiState, ScrollState, Session, detect_at_token,
};

// Quiz attempt state lives with its widget; the app re-exports it because
// `QuizUiState` stores one per quiz entry.
pub use crate::tui::widgets::QuizAttempt;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::api::{Backend, ChatRequest, ConversationEntry, HttpBackend};
use crate::picker::search_documents;
use crate::sources::{SourceOpener, SystemOpener};
use crate::tui::Theme;
use crate::tui::widgets::{
    CommandMatch, CommandPopupState, DocPopupState, Notice, transcript_line_count,
};

/// Channel buffer size for app events.
const EVENT_CHANNEL_SIZE: usize = 1000;

/// Minimum time between document searches (debounce) in milliseconds.
const SEARCH_DEBOUNCE_MS: u64 = 50;

/// Main application state.
///
/// Component sub-structs keep the concerns apart:
/// - `session`: conversation truth (history, mode, busy)
/// - `composer`: the draft and its popups
/// - `quiz`: per-entry quiz attempts and focus
/// - `transcript_scroll` / `layout`: presentation state
pub struct App {
    // =========================================================================
    // Collaborators
    // =========================================================================
    /// Transport to the backend.
    pub(crate) backend: Arc<dyn Backend>,
    /// Resolver for citation strings.
    pub(crate) opener: Box<dyn SourceOpener>,
    /// Theme for styling.
    pub(crate) theme: &'static Theme,

    // =========================================================================
    // Shared state
    // =========================================================================
    /// Current application mode.
    pub(crate) mode: AppMode,
    /// Should quit flag.
    should_quit: bool,
    /// The conversation session.
    pub(crate) session: Session,

    // =========================================================================
    // Event channel
    // =========================================================================
    /// Event receiver drained by `process_events`.
    pub(crate) event_rx: mpsc::Receiver<AppEvent>,
    /// Event sender cloned into spawned tasks.
    pub(crate) event_tx: mpsc::Sender<AppEvent>,

    // =========================================================================
    // Component states
    // =========================================================================
    /// Composer (draft input) state.
    pub(crate) composer: ComposerState,
    /// Transcript scroll state.
    pub(crate) transcript_scroll: ScrollState,
    /// Quiz attempts and focus.
    pub(crate) quiz: QuizUiState,
    /// Mode selector overlay state.
    pub(crate) mode_select: ModeSelectState,
    /// Latest status notice.
    pub(crate) notice: Option<Notice>,
    /// Number of uploads currently in flight.
    pub(crate) uploads_in_flight: usize,
    /// Cached frame layout.
    pub(crate) layout: LayoutState,
    /// Registry of slash commands.
    pub(crate) registry: CommandRegistry,
}

/// Spawns the background task that serves document search queries.
///
/// Searches run via `spawn_blocking` (directory walking is blocking work);
/// results come back over the event channel tagged with their generation so
/// stale results can be dropped.
fn spawn_picker_task(mut search_rx: mpsc::Receiver<PickerQuery>, event_tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        while let Some(query) = search_rx.recv().await {
            let generation = query.generation;
            let query_str = query.query.clone();
            let root = query.root.clone();

            let search_result =
                tokio::task::spawn_blocking(move || search_documents(&query_str, &root)).await;

            if let Ok(result) = search_result {
                let _ = event_tx
                    .send(AppEvent::SearchResult { generation, result })
                    .await;
            }
        }
    });
}

impl App {
    /// Creates the application against a live HTTP backend.
    ///
    /// Must be called within a Tokio runtime (background tasks are spawned
    /// here).
    #[must_use]
    pub fn new(backend_url: url::Url) -> Self {
        Self::with_backend(
            Arc::new(HttpBackend::new(backend_url)),
            Box::new(SystemOpener),
        )
    }

    /// Creates the application with injected collaborators.
    ///
    /// This is the seam tests use to substitute a scripted backend and a
    /// recording source opener.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn Backend>, opener: Box<dyn SourceOpener>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (search_tx, search_rx) = mpsc::channel(16);
        spawn_picker_task(search_rx, event_tx.clone());

        Self {
            backend,
            opener,
            theme: Theme::global(),
            mode: AppMode::Chat,
            should_quit: false,
            session: Session::new(),
            event_rx,
            event_tx,
            composer: ComposerState::new(search_tx),
            transcript_scroll: ScrollState::new(),
            quiz: QuizUiState::default(),
            mode_select: ModeSelectState::default(),
            notice: None,
            uploads_in_flight: 0,
            layout: LayoutState::default(),
            registry: CommandRegistry::with_builtins(),
        }
    }

    /// Returns true if the application should quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Flags the application for shutdown.
    pub(crate) fn request_quit(&mut self) {
        self.should_quit = true;
    }

    /// Returns the event sender for spawned tasks.
    #[must_use]
    pub fn event_sender(&self) -> mpsc::Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Calculates and caches the layout for this frame.
    ///
    /// Must be called inside the draw closure so scroll math and rendering
    /// see the same dimensions.
    pub fn update_layout(&mut self, terminal_area: Rect) {
        self.layout.chat = calculate_chat_layout(terminal_area);
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submits the composer content: slash commands execute, anything else
    /// goes to the backend as a chat message.
    pub fn submit_text_input(&mut self) {
        let draft = self.composer.collect_text();
        if draft.trim().is_empty() {
            return;
        }
        if self.try_execute_slash_command(&draft) {
            return;
        }
        self.submit_draft(draft);
    }

    /// Sends one chat request for `draft`.
    ///
    /// Preconditions are enforced here, not at the key binding: a blank
    /// draft or an in-flight request makes this a no-op, so overlapping
    /// submissions are rejected even for programmatic callers.
    ///
    /// Appends the optimistic user echo immediately; the response (or error)
    /// entry arrives through [`AppEvent::ChatFinished`]. The draft is
    /// cleared on completion, not here; while waiting it stays visible in
    /// the read-only composer.
    pub(crate) fn submit_draft(&mut self, draft: String) {
        if self.session.busy || draft.trim().is_empty() {
            return;
        }

        let request = ChatRequest {
            query: draft.clone(),
            intent: self.session.mode,
        };

        self.session
            .push(ConversationEntry::user(draft, Local::now()));
        self.session.busy = true;
        self.scroll_transcript_to_latest();

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.chat(&request).await;
            let _ = tx.send(AppEvent::ChatFinished(outcome)).await;
        });
    }

    // =========================================================================
    // Slash commands
    // =========================================================================

    /// Attempts to parse and execute a slash command from the draft.
    ///
    /// Returns `true` if the draft was a command (known or not), `false` if
    /// it should be submitted as a chat message.
    pub(crate) fn try_execute_slash_command(&mut self, draft: &str) -> bool {
        let Some((name, args)) = parse_slash_command(draft) else {
            return false;
        };

        let outcome = match self.registry.find(name) {
            Some(cmd) => cmd.execute(args),
            None => CommandOutcome::Message(format!("Unknown command: /{name}")),
        };

        self.composer.clear();
        self.handle_command_outcome(outcome);
        true
    }

    /// Applies the outcome of a slash command.
    fn handle_command_outcome(&mut self, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Exit => self.request_quit(),
            CommandOutcome::OpenModeSelect => self.open_mode_select(),
            CommandOutcome::SetMode(mode) => {
                self.session.mode = mode;
                self.notice = Some(Notice::info(format!("Mode set to {}", mode.label())));
            }
            CommandOutcome::Upload(path) => self.start_upload(path),
            CommandOutcome::OpenCitation(n) => self.open_citation(n),
            CommandOutcome::Message(message) => {
                self.notice = Some(Notice::error(message));
            }
        }
    }

    // =========================================================================
    // Mode selector
    // =========================================================================

    /// Opens the mode selector overlay, positioned on the active mode.
    pub(crate) fn open_mode_select(&mut self) {
        if self.mode == AppMode::ModeSelect {
            return;
        }
        self.mode_select = ModeSelectState::for_mode(self.session.mode);
        self.mode = AppMode::ModeSelect;
    }

    /// Applies the selection and closes the overlay.
    pub(crate) fn confirm_mode_select(&mut self) {
        self.session.mode = self.mode_select.selected_mode();
        self.mode = AppMode::Chat;
    }

    /// Closes the overlay without changing the mode.
    pub(crate) fn close_mode_select(&mut self) {
        self.mode = AppMode::Chat;
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Starts one upload. Fire-and-forget: the result arrives as an
    /// [`AppEvent::UploadFinished`] notice and never touches history.
    ///
    /// Uploads are not serialized with chat requests or with each other.
    pub(crate) fn start_upload(&mut self, path: PathBuf) {
        if !path.is_file() {
            self.notice = Some(Notice::error(format!("No such file: {}", path.display())));
            return;
        }

        let file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();

        self.uploads_in_flight += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.upload(&path).await;
            let _ = tx.send(AppEvent::UploadFinished { file, result }).await;
        });
    }

    // =========================================================================
    // Citations
    // =========================================================================

    /// Opens the n-th citation (1-based) of the most recent entry that has
    /// any sources.
    pub(crate) fn open_citation(&mut self, n: usize) {
        let source = self
            .session
            .history()
            .iter()
            .rev()
            .find(|entry| !entry.sources.is_empty())
            .and_then(|entry| entry.sources.get(n - 1))
            .cloned();

        let Some(source) = source else {
            self.notice = Some(Notice::error(format!("No citation #{n}")));
            return;
        };

        match self.opener.open(&source) {
            Ok(()) => self.notice = Some(Notice::info(format!("Opened {source}"))),
            Err(e) => self.notice = Some(Notice::error(format!("Could not open {source}: {e}"))),
        }
    }

    // =========================================================================
    // Quiz
    // =========================================================================

    /// Returns the focused quiz entry index, if focus is on a live quiz.
    #[must_use]
    pub(crate) fn focused_quiz(&self) -> Option<usize> {
        let idx = self.quiz.focus?;
        self.quiz.attempts.contains_key(&idx).then_some(idx)
    }

    /// Focuses the most recent unrevealed quiz, if any.
    pub(crate) fn focus_latest_quiz(&mut self) {
        if let Some(idx) = self.quiz.latest_unrevealed() {
            self.quiz.focus = Some(idx);
        }
    }

    /// Drops quiz focus, returning keys to the composer.
    pub(crate) fn unfocus_quiz(&mut self) {
        self.quiz.focus = None;
    }

    /// Moves the focused quiz cursor up.
    pub(crate) fn quiz_cursor_up(&mut self) {
        let Some(idx) = self.focused_quiz() else {
            return;
        };
        if let Some(attempt) = self.quiz.attempts.get_mut(&idx) {
            attempt.cursor_up();
        }
    }

    /// Moves the focused quiz cursor down.
    pub(crate) fn quiz_cursor_down(&mut self) {
        let Some(idx) = self.focused_quiz() else {
            return;
        };
        let Some(count) = self
            .session
            .history()
            .get(idx)
            .and_then(ConversationEntry::questions)
            .map(<[_]>::len)
        else {
            return;
        };
        if let Some(attempt) = self.quiz.attempts.get_mut(&idx) {
            attempt.cursor_down(count);
        }
    }

    /// Records the `choice`-th option (1-based) for the question under the
    /// quiz cursor. Last write wins per question.
    pub(crate) fn quiz_select_option(&mut self, choice: usize) {
        let Some(idx) = self.focused_quiz() else {
            return;
        };
        let Some(questions) = self
            .session
            .history()
            .get(idx)
            .and_then(ConversationEntry::questions)
        else {
            return;
        };
        let Some(attempt) = self.quiz.attempts.get_mut(&idx) else {
            return;
        };
        let Some(question) = questions.get(attempt.cursor()) else {
            return;
        };
        let Some(option) = question.options.get(choice - 1) else {
            return;
        };
        attempt.select(question.id, option);
    }

    /// Submits the focused quiz.
    ///
    /// The completeness check is the visible affordance's guard; the reveal
    /// itself would transition regardless. The completion payload (the raw
    /// answers) comes out of `reveal` exactly once and is reported as a
    /// notice; aggregate scoring is not computed here.
    pub(crate) fn quiz_submit(&mut self) {
        let Some(idx) = self.focused_quiz() else {
            return;
        };
        let Some(questions) = self
            .session
            .history()
            .get(idx)
            .and_then(ConversationEntry::questions)
        else {
            return;
        };
        let total = questions.len();
        let Some(attempt) = self.quiz.attempts.get_mut(&idx) else {
            return;
        };
        if !attempt.is_complete(questions) {
            return;
        }
        if let Some(answers) = attempt.reveal() {
            self.quiz.focus = None;
            self.notice = Some(Notice::info(format!(
                "Quiz submitted: answers recorded for {}/{total} questions",
                answers.len()
            )));
        }
    }

    // =========================================================================
    // Transcript scrolling
    // =========================================================================

    /// Total visual lines of the transcript at the cached layout width.
    pub(crate) fn transcript_lines_total(&self) -> usize {
        transcript_line_count(
            self.session.history(),
            &self.quiz.attempts,
            self.focused_quiz(),
            self.layout.transcript_content_width(),
            self.theme,
        )
    }

    /// Jumps to the newest content when follow is engaged.
    pub(crate) fn scroll_transcript_to_latest(&mut self) {
        let content_len = self.transcript_lines_total();
        self.transcript_scroll
            .follow_if_engaged(content_len, self.layout.transcript_visible_height());
    }

    /// Scrolls the transcript by `amount` lines, negative is up.
    pub(crate) fn scroll_transcript(&mut self, amount: isize) {
        if amount < 0 {
            self.transcript_scroll.scroll_up(amount.unsigned_abs());
        } else {
            let content_len = self.transcript_lines_total();
            self.transcript_scroll.scroll_down(
                amount.unsigned_abs(),
                content_len,
                self.layout.transcript_visible_height(),
            );
        }
    }

    /// Jumps the transcript to the top.
    pub(crate) fn scroll_transcript_to_top(&mut self) {
        self.transcript_scroll.to_top();
    }

    /// Jumps the transcript to the bottom, re-engaging follow.
    pub(crate) fn scroll_transcript_to_bottom(&mut self) {
        let content_len = self.transcript_lines_total();
        self.transcript_scroll
            .to_bottom(content_len, self.layout.transcript_visible_height());
    }

    // =========================================================================
    // Document picker
    // =========================================================================

    /// Re-detects the `@` token under the cursor and refreshes the search.
    pub(crate) fn update_at_token(&mut self) {
        let (row, col) = self.composer.cursor();
        let token = detect_at_token(self.composer.lines(), row, col);
        self.composer.at_token = token;
        self.update_document_search();
    }

    /// Runs or debounces the document search for the current `@` token.
    pub(crate) fn update_document_search(&mut self) {
        if let Some(token) = &self.composer.at_token {
            let should_search = match (
                &self.composer.last_search_query,
                self.composer.last_search_time,
            ) {
                (Some(last_query), Some(last_time)) => {
                    last_query != &token.query
                        || last_time.elapsed() >= Duration::from_millis(SEARCH_DEBOUNCE_MS)
                }
                _ => true,
            };

            if should_search {
                let query = token.query.clone();
                self.perform_document_search(&query);
            }
        } else {
            self.composer.doc_popup = DocPopupState::Hidden;
            self.composer.last_search_query = None;
        }
    }

    /// Kicks off an async document search.
    ///
    /// Results arrive as [`AppEvent::SearchResult`]; the generation counter
    /// cancels anything stale.
    pub(crate) fn perform_document_search(&mut self, query: &str) {
        let root = std::env::current_dir().unwrap_or_default();

        self.composer.last_search_query = Some(query.to_string());
        self.composer.last_search_time = Some(Instant::now());
        self.composer.search_generation = self.composer.search_generation.wrapping_add(1);
        self.composer.doc_popup = DocPopupState::Loading;

        let picker_query = PickerQuery {
            query: query.to_string(),
            root,
            generation: self.composer.search_generation,
        };

        // try_send: if the channel is full the freshest query will follow
        // shortly anyway.
        let _ = self.composer.search_tx.try_send(picker_query);
    }

    /// Applies a search result from the background task, dropping stale
    /// generations.
    pub(crate) fn handle_search_result(
        &mut self,
        generation: u64,
        result: crate::picker::DocumentSearch,
    ) {
        if generation != self.composer.search_generation {
            return;
        }

        self.composer.doc_popup = if result.matches.is_empty() {
            DocPopupState::NoMatches
        } else {
            DocPopupState::Showing {
                matches: result.matches,
                selected: 0,
            }
        };
    }

    /// Returns true if the document popup should be drawn.
    #[must_use]
    pub(crate) fn should_show_doc_popup(&self) -> bool {
        self.composer.doc_popup.is_visible()
    }

    /// Inserts the selected document path in place of the `@` token.
    ///
    /// Directories insert with a trailing slash so the user can keep
    /// drilling down.
    pub(crate) fn select_document_from_popup(&mut self) {
        let selected = self
            .composer
            .doc_popup
            .selected_match()
            .map(|m| (m.path.clone(), m.is_dir));
        let Some((path, is_dir)) = selected else {
            return;
        };
        let Some(token) = self.composer.at_token.take() else {
            return;
        };

        let path_str = if is_dir {
            format!("{}/", path.display())
        } else {
            path.display().to_string()
        };

        self.replace_at_token_with_path(&token, &path_str);
        self.dismiss_doc_popup();
    }

    /// Replaces an `@` token in the draft with a path.
    ///
    /// Spaces in the path are escaped so command argument parsing stays
    /// whitespace-delimited.
    pub(crate) fn replace_at_token_with_path(&mut self, token: &AtToken, path: &str) {
        use tui_textarea::{CursorMove, TextArea};

        let lines = self.composer.lines();
        let Some(line) = lines.get(token.row) else {
            return;
        };

        let insert_str = commands::escape_path(path);

        let start = token.start_byte;
        let end = token.end_byte;
        if start > end || end > line.len() {
            return;
        }

        let mut new_line = line.clone();
        new_line.replace_range(start..end, &insert_str);

        let start_char_idx = line[..start].chars().count();
        let new_cursor_col = start_char_idx + insert_str.chars().count();

        let mut new_lines: Vec<String> = lines.to_vec();
        new_lines[token.row] = new_line;

        let mut new_textarea = TextArea::new(new_lines);
        new_textarea.set_placeholder_text(state::COMPOSER_PLACEHOLDER);
        new_textarea.move_cursor(CursorMove::Top);
        for _ in 0..token.row {
            new_textarea.move_cursor(CursorMove::Down);
        }
        new_textarea.move_cursor(CursorMove::Head);
        for _ in 0..new_cursor_col {
            new_textarea.move_cursor(CursorMove::Forward);
        }

        self.composer.textarea = new_textarea;
    }

    /// Dismisses the document popup without selecting.
    pub(crate) fn dismiss_doc_popup(&mut self) {
        self.composer.doc_popup = DocPopupState::Hidden;
        self.composer.at_token = None;
        self.composer.last_search_query = None;
    }

    // =========================================================================
    // Command popup
    // =========================================================================

    /// Refreshes the slash command completion popup for the current draft.
    pub(crate) fn update_slash_command_popup(&mut self) {
        let (row, col) = self.composer.cursor();
        let token = detect_slash_token(self.composer.lines(), row, col);

        let popup = match &token {
            Some(token) => {
                let matches: Vec<CommandMatch> = self
                    .registry
                    .matching(&token.name)
                    .iter()
                    .map(|cmd| CommandMatch {
                        name: cmd.name(),
                        description: cmd.description(),
                    })
                    .collect();
                if matches.is_empty() {
                    CommandPopupState::Hidden
                } else {
                    // Keep the selection stable across keystrokes.
                    let selected = match &self.composer.command_popup {
                        CommandPopupState::Showing { selected, .. } => {
                            (*selected).min(matches.len() - 1)
                        }
                        CommandPopupState::Hidden => 0,
                    };
                    CommandPopupState::Showing { matches, selected }
                }
            }
            None => CommandPopupState::Hidden,
        };

        self.composer.slash_token = token;
        self.composer.command_popup = popup;
    }

    /// Returns true if the command popup should be drawn.
    #[must_use]
    pub(crate) fn should_show_command_popup(&self) -> bool {
        self.composer.command_popup.is_visible()
    }

    /// Replaces the draft with the selected command, cursor at the end so
    /// arguments can follow.
    pub(crate) fn select_command_from_popup(&mut self) {
        use tui_textarea::{CursorMove, TextArea};

        let Some(cmd_name) = self.composer.command_popup.selected_command() else {
            return;
        };

        let mut new_textarea = TextArea::new(vec![format!("/{cmd_name}")]);
        new_textarea.set_placeholder_text(state::COMPOSER_PLACEHOLDER);
        self.composer.textarea = new_textarea;
        self.composer.textarea.move_cursor(CursorMove::End);

        self.dismiss_command_popup();
    }

    /// Dismisses the command popup without selecting.
    pub(crate) fn dismiss_command_popup(&mut self) {
        self.composer.command_popup = CommandPopupState::Hidden;
        self.composer.slash_token = None;
    }

    /// Returns true if an unrevealed quiz is waiting for answers.
    #[must_use]
    pub(crate) fn has_pending_quiz(&self) -> bool {
        self.quiz.latest_unrevealed().is_some()
    }
}
