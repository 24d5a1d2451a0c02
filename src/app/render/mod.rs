//! Rendering methods for the App.
//!
//! - **Chat mode**: header, transcript, status bar, composer, footer
//! - **Mode selector**: modal overlay over the chat view

mod chat;
mod mode_select;

use ratatui::Frame;

use super::{App, AppMode};

impl App {
    /// Renders the application UI.
    pub fn render(&self, frame: &mut Frame) {
        match self.mode {
            AppMode::Chat => self.render_chat(frame),
            AppMode::ModeSelect => {
                // Chat stays visible under the overlay.
                self.render_chat(frame);
                self.render_mode_select(frame);
            }
        }
    }
}
