//! Shared test utilities for the app module.
//!
//! - [`ScriptedBackend`] - a [`Backend`] double that replays queued results
//! - App builders that construct an [`App`] without spawning background
//!   tasks, so synchronous tests need no runtime
//! - Key event helpers and [`settle`], which lets spawned request tasks run
//!   and drains their completion events
//! - [`render_app_to_terminal`] for `TestBackend` render assertions

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};

use crate::api::{ApiError, Backend, ChatRequest};
use crate::app::{
    App, AppMode, CommandRegistry, ComposerState, LayoutState, ModeSelectState, QuizUiState,
    ScrollState, Session,
};
use crate::sources::{RecordingOpener, SourceOpener};
use crate::tui::Theme;

/// A quiz reply with two questions, ids 1 and 2.
pub const TWO_QUESTION_QUIZ: &str = r#"{"type":"quiz","questions":[
    {"id":1,"question":"2+2?","options":["3","4"],"answer":"4"},
    {"id":2,"question":"Capital of France?","options":["Paris","Lyon"],"answer":"Paris"}
]}"#;

/// Backend double that replays queued results and records every request.
///
/// An empty queue answers chat with `{}` and upload with success, so tests
/// only script what they assert on.
#[derive(Default)]
pub struct ScriptedBackend {
    chat_results: Mutex<VecDeque<Result<String, ApiError>>>,
    upload_results: Mutex<VecDeque<Result<(), ApiError>>>,
    /// Chat requests in the order they were sent.
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    /// Upload paths in the order they were sent.
    pub uploaded: Mutex<Vec<PathBuf>>,
}

impl ScriptedBackend {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a 2xx chat response with the given raw body.
    pub fn queue_chat_body(&self, body: &str) {
        self.chat_results
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
    }

    /// Queues a failed chat request with the given HTTP status.
    pub fn queue_chat_failure(&self, status: u16) {
        self.chat_results
            .lock()
            .unwrap()
            .push_back(Err(status_error(status)));
    }

    /// Queues a failed upload with the given HTTP status.
    pub fn queue_upload_failure(&self, status: u16) {
        self.upload_results
            .lock()
            .unwrap()
            .push_back(Err(status_error(status)));
    }

    /// Number of chat requests this backend has seen.
    pub fn chat_request_count(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }
}

fn status_error(status: u16) -> ApiError {
    ApiError::Status(reqwest::StatusCode::from_u16(status).expect("valid status code"))
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ApiError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.chat_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("{}".to_string()))
    }

    async fn upload(&self, path: &std::path::Path) -> Result<(), ApiError> {
        self.uploaded.lock().unwrap().push(path.to_path_buf());
        self.upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// Creates an `App` over the given collaborators without spawning the
/// document picker task, so synchronous tests need no Tokio runtime.
///
/// The search receiver half is dropped: tests drive document search results
/// directly through `handle_search_result`.
pub fn app_with_opener(backend: Arc<dyn Backend>, opener: Box<dyn SourceOpener>) -> App {
    let (event_tx, event_rx) = tokio::sync::mpsc::channel(64);
    let (search_tx, _search_rx) = tokio::sync::mpsc::channel(16);

    App {
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

/// Creates a scripted backend and an app wired to it, with a recording
/// opener so no test ever spawns the platform opener.
pub fn scripted_app() -> (Arc<ScriptedBackend>, App) {
    let backend = ScriptedBackend::arc();
    let (opener, _) = RecordingOpener::new();
    let app = app_with_opener(
        Arc::clone(&backend) as Arc<dyn Backend>,
        Box::new(opener),
    );
    (backend, app)
}

/// Replaces the draft with the given single line, cursor at the end.
pub fn set_draft(app: &mut App, line: &str) {
    app.composer.set_lines(vec![line.to_string()]);
}

/// Creates a [`KeyEvent`] with no modifiers.
pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Creates a [`KeyEvent`] for a character key with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

/// Creates a [`KeyEvent`] for a character key with Ctrl held.
pub fn ctrl_char(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Creates a [`KeyEvent`] for the Enter key with the given modifiers.
pub fn enter_key(modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Enter,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Types a string into the app one key press at a time.
pub fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

/// Lets spawned request tasks run and drains their completion events until
/// no chat request or upload is in flight.
///
/// # Panics
///
/// Panics if the background work never settles, so a lost completion event
/// fails the test instead of hanging it.
pub async fn settle(app: &mut App) {
    for _ in 0..100 {
        tokio::task::yield_now().await;
        app.process_events();
        if !app.session.busy && app.uploads_in_flight == 0 {
            return;
        }
    }
    panic!("background work did not settle");
}

/// Renders the app to a `TestBackend` terminal.
///
/// Calls `update_layout()` before rendering, mimicking the main loop, so
/// the cached layout matches the drawn frame.
///
/// # Errors
///
/// Returns an error if terminal creation or rendering fails.
pub fn render_app_to_terminal(
    app: &mut App,
    width: u16,
    height: u16,
) -> Result<Terminal<TestBackend>> {
    use ratatui::layout::Rect;

    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;

    app.update_layout(Rect::new(0, 0, width, height));
    terminal.draw(|f| app.render(f))?;

    Ok(terminal)
}

/// Flattens the rendered buffer into one newline-separated string for
/// contains-style assertions.
pub fn terminal_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = *buffer.area();
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}
