//! Event handling logic for the App.
//!
//! Key routing in chat mode is priority-ordered: popups first, then the
//! focused quiz, then transcript scrolling, then the composer. Background
//! task results (chat replies, upload outcomes, search results) are drained
//! from the event channel by `process_events` on the UI loop.

use chrono::Local;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::App;
use super::state::{AppEvent, AppMode};
use crate::api::classify_body;
use crate::tui::widgets::{Notice, QuizAttempt};

/// Scroll page size for PageUp/PageDown.
const SCROLL_PAGE_SIZE: isize = 10;

impl App {
    /// Handles pasted text from bracketed paste mode.
    ///
    /// Multi-line pastes arrive as one event so each pasted line is not
    /// submitted as its own message. Line endings are normalized to `\n`
    /// and control characters (except newlines) are filtered out.
    pub fn handle_paste(&mut self, text: &str) {
        if self.mode != AppMode::Chat || self.session.busy {
            return;
        }
        if text.is_empty() {
            return;
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let filtered: String = normalized
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .collect();

        self.composer.textarea.insert_str(&filtered);

        self.update_at_token();
        self.update_slash_command_popup();
    }

    /// Handles a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global hotkey: Ctrl+S opens the mode selector from chat mode.
        if self.mode == AppMode::Chat
            && key.code == KeyCode::Char('s')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.open_mode_select();
            return;
        }

        match self.mode {
            AppMode::Chat => self.handle_chat_key(key),
            AppMode::ModeSelect => self.handle_mode_select_key(key),
        }
    }

    /// Handles key events in chat mode.
    ///
    /// Priorities:
    /// 1. Document popup (when visible)
    /// 2. Command popup (when visible)
    /// 3. Focused quiz
    /// 4. Transcript scrolling (Ctrl+Arrows, PageUp/PageDown)
    /// 5. Quit shortcuts
    /// 6. Composer input
    #[allow(clippy::too_many_lines)]
    fn handle_chat_key(&mut self, key: KeyEvent) {
        // Priority 1: document popup.
        if self.should_show_doc_popup() {
            match key.code {
                KeyCode::Up => {
                    self.composer.doc_popup.select_up();
                    return;
                }
                KeyCode::Down => {
                    self.composer.doc_popup.select_down();
                    return;
                }
                KeyCode::Tab => {
                    if self.composer.doc_popup.has_matches() {
                        self.select_document_from_popup();
                        return;
                    }
                }
                KeyCode::Enter if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if self.composer.doc_popup.has_matches() {
                        self.select_document_from_popup();
                        return;
                    }
                }
                KeyCode::Esc => {
                    self.dismiss_doc_popup();
                    return;
                }
                _ => {}
            }
        }

        // Priority 2: command popup.
        if self.should_show_command_popup() {
            match key.code {
                KeyCode::Up => {
                    self.composer.command_popup.select_up();
                    return;
                }
                KeyCode::Down => {
                    self.composer.command_popup.select_down();
                    return;
                }
                // Tab completes without submitting (arguments may follow).
                KeyCode::Tab => {
                    self.select_command_from_popup();
                    return;
                }
                // Enter completes and submits.
                KeyCode::Enter if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.select_command_from_popup();
                    self.submit_text_input();
                    return;
                }
                KeyCode::Esc => {
                    self.dismiss_command_popup();
                    return;
                }
                _ => {}
            }
        }

        // Priority 3: focused quiz captures answer keys.
        if self.focused_quiz().is_some() {
            match key.code {
                KeyCode::Up => {
                    self.quiz_cursor_up();
                    return;
                }
                KeyCode::Down => {
                    self.quiz_cursor_down();
                    return;
                }
                KeyCode::Char(c @ '1'..='9') if key.modifiers.is_empty() => {
                    let choice = c as usize - '0' as usize;
                    self.quiz_select_option(choice);
                    return;
                }
                KeyCode::Enter => {
                    self.quiz_submit();
                    return;
                }
                KeyCode::Esc => {
                    self.unfocus_quiz();
                    return;
                }
                _ => {}
            }
        }

        // Priority 4: transcript scrolling.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Up => {
                    self.scroll_transcript(-1);
                    return;
                }
                KeyCode::Down => {
                    self.scroll_transcript(1);
                    return;
                }
                KeyCode::Home => {
                    self.scroll_transcript_to_top();
                    return;
                }
                KeyCode::End => {
                    self.scroll_transcript_to_bottom();
                    return;
                }
                _ => {}
            }
        }
        match key.code {
            KeyCode::PageUp => {
                self.scroll_transcript(-SCROLL_PAGE_SIZE);
                return;
            }
            KeyCode::PageDown => {
                self.scroll_transcript(SCROLL_PAGE_SIZE);
                return;
            }
            _ => {}
        }

        // Priority 5: quit and quiz focus shortcuts.
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_quit();
                return;
            }
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focus_latest_quiz();
                return;
            }
            KeyCode::Esc => {
                return;
            }
            _ => {}
        }

        // Priority 6: composer input. Read-only while a request is in
        // flight; the draft stays visible until the exchange completes.
        if self.session.busy {
            return;
        }
        self.handle_composer_key(key);
    }

    /// Handles composer key events.
    ///
    /// - `Enter` submits
    /// - `Shift+Enter` / `Alt+Enter` / `Ctrl+J` insert a newline
    /// - everything else goes to the textarea
    fn handle_composer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit_text_input();
            }
            // Ctrl+J = ASCII LF, a newline that works on every terminal.
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.composer.textarea.insert_newline();
                self.update_at_token();
                self.update_slash_command_popup();
            }
            KeyCode::Enter
                if key.modifiers.contains(KeyModifiers::SHIFT)
                    || key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.composer.textarea.insert_newline();
                self.update_at_token();
                self.update_slash_command_popup();
            }
            KeyCode::Enter => {
                self.submit_text_input();
            }
            _ => {
                self.composer.textarea.input(key);
                self.update_at_token();
                self.update_slash_command_popup();
            }
        }
    }

    /// Handles key events in the mode selector overlay.
    fn handle_mode_select_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.mode_select.select_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode_select.select_down();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.confirm_mode_select();
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close_mode_select();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_mode_select();
            }
            _ => {}
        }
    }

    /// Processes pending events from background tasks.
    ///
    /// Chat completion is where the submission contract lands: exactly one
    /// response-or-error entry per submission, then the draft clears and
    /// `busy` drops; the session stays usable on every path.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::ChatFinished(outcome) => {
                    let entry = match outcome {
                        Ok(body) => classify_body(&body, Local::now()),
                        Err(e) => crate::api::ConversationEntry::failure(&e.to_string(), Local::now()),
                    };

                    let is_quiz = entry.is_quiz();
                    let idx = self.session.push(entry);
                    if is_quiz {
                        self.quiz.attempts.insert(idx, QuizAttempt::new());
                        // Answer keys route straight to the fresh quiz.
                        self.quiz.focus = Some(idx);
                    }

                    self.session.busy = false;
                    self.composer.clear();
                    self.scroll_transcript_to_latest();
                }
                AppEvent::UploadFinished { file, result } => {
                    self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
                    self.notice = Some(match result {
                        Ok(()) => Notice::info(format!("Uploaded {file}")),
                        Err(e) => Notice::error(format!("Upload failed for {file}: {e}")),
                    });
                }
                AppEvent::SearchResult { generation, result } => {
                    self.handle_search_result(generation, result);
                }
            }
        }
    }
}
