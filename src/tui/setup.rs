//! Terminal setup and configuration utilities.
//!
//! Enables bracketed paste mode so multi-line pastes arrive as a single
//! `Event::Paste` instead of per-line key events (which would submit each
//! line of the paste as its own message).

use std::io::stdout;

use ratatui::crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use ratatui::crossterm::execute;

/// Guard that disables bracketed paste mode again on drop.
///
/// Cleanup runs even if the application panics.
pub struct TerminalEventGuard {
    bracketed_paste_enabled: bool,
}

impl TerminalEventGuard {
    #[must_use]
    pub fn new() -> Self {
        let mut guard = Self {
            bracketed_paste_enabled: false,
        };

        match execute!(stdout(), EnableBracketedPaste) {
            Ok(()) => {
                guard.bracketed_paste_enabled = true;
            }
            Err(e) => {
                eprintln!("Warning: Could not enable bracketed paste mode: {e}");
                eprintln!("Multi-line paste may not work correctly.");
            }
        }

        guard
    }
}

impl Default for TerminalEventGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalEventGuard {
    fn drop(&mut self) {
        if self.bracketed_paste_enabled {
            let _ = execute!(stdout(), DisableBracketedPaste);
        }
    }
}
