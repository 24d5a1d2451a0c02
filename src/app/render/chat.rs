//! Chat mode rendering.
//!
//! Renders the unified chat interface: header, transcript, status bar,
//! composer, footer, and the completion popups anchored above the composer.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Block,
};

use crate::app::App;
use crate::tui::widgets::{CommandPopup, DocumentPopup, StatusBarWidget, TranscriptWidget};

impl App {
    /// Renders the chat interface using the layout cached for this frame.
    pub(crate) fn render_chat(&self, frame: &mut Frame) {
        let layout = self.layout.chat;

        self.render_header(frame, layout.header);
        self.render_transcript(frame, layout.transcript);
        self.render_status(frame, layout.status);
        self.render_input(frame, layout.input);
        self.render_footer(frame, layout.footer);

        if self.should_show_doc_popup() {
            self.render_doc_popup(frame, layout.input);
        }
        if self.should_show_command_popup() {
            self.render_command_popup(frame, layout.input);
        }
    }

    /// Renders the header (single line: app name and active mode).
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(" lingo ", self.theme.header_style()),
            Span::styled("[", self.theme.muted_style()),
            Span::styled(self.session.mode.label(), self.theme.normal_style()),
            Span::styled("]", self.theme.muted_style()),
        ]);
        frame.render_widget(ratatui::widgets::Paragraph::new(header), area);
    }

    /// Renders the conversation transcript.
    fn render_transcript(&self, frame: &mut Frame, area: Rect) {
        let widget = TranscriptWidget::new(
            self.session.history(),
            &self.quiz.attempts,
            self.focused_quiz(),
            self.transcript_scroll.offset,
            self.session.busy,
            self.theme,
        );
        frame.render_widget(widget, area);
    }

    /// Renders the status bar (2 lines).
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let widget = StatusBarWidget::new(
            self.session.mode,
            self.session.busy,
            self.uploads_in_flight,
            self.has_pending_quiz(),
            self.notice.as_ref(),
            self.theme,
        );
        frame.render_widget(widget, area);
    }

    /// Renders the composer.
    ///
    /// While a request is in flight the draft is shown read-only; the title
    /// says so and key input is blocked in the event handler.
    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let title = if self.session.busy {
            " Message (waiting for reply) "
        } else {
            " Message "
        };

        let block = Block::bordered()
            .title(title)
            .title_style(self.theme.header_style())
            .border_style(self.theme.border_style());

        let mut textarea = self.composer.textarea.clone();
        textarea.set_block(block);
        textarea.set_style(self.theme.normal_style());
        textarea.set_cursor_line_style(ratatui::style::Style::default());
        textarea.set_placeholder_style(self.theme.placeholder_style());

        frame.render_widget(&textarea, area);
    }

    /// Renders the footer key hints (single line).
    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.session.busy {
            vec![
                Span::styled(" [Ctrl+C] ", self.theme.highlight_style()),
                Span::styled("Quit  ", self.theme.muted_style()),
                Span::styled("waiting for reply...", self.theme.muted_style()),
            ]
        } else if self.focused_quiz().is_some() {
            vec![
                Span::styled(" [↑/↓] ", self.theme.highlight_style()),
                Span::styled("Question  ", self.theme.muted_style()),
                Span::styled("[1-9] ", self.theme.highlight_style()),
                Span::styled("Answer  ", self.theme.muted_style()),
                Span::styled("[Enter] ", self.theme.highlight_style()),
                Span::styled("Submit  ", self.theme.muted_style()),
                Span::styled("[Esc] ", self.theme.highlight_style()),
                Span::styled("Back to typing", self.theme.muted_style()),
            ]
        } else if self.should_show_doc_popup() || self.should_show_command_popup() {
            vec![
                Span::styled(" [↑/↓] ", self.theme.highlight_style()),
                Span::styled("Navigate  ", self.theme.muted_style()),
                Span::styled("[Tab/Enter] ", self.theme.highlight_style()),
                Span::styled("Select  ", self.theme.muted_style()),
                Span::styled("[Esc] ", self.theme.highlight_style()),
                Span::styled("Dismiss", self.theme.muted_style()),
            ]
        } else {
            let mut spans = vec![
                Span::styled(" [Enter] ", self.theme.highlight_style()),
                Span::styled("Send  ", self.theme.muted_style()),
                Span::styled("[Ctrl+S] ", self.theme.highlight_style()),
                Span::styled("Mode  ", self.theme.muted_style()),
                Span::styled("[@] ", self.theme.highlight_style()),
                Span::styled("Attach  ", self.theme.muted_style()),
            ];
            if self.has_pending_quiz() {
                spans.push(Span::styled("[Ctrl+Q] ", self.theme.highlight_style()));
                spans.push(Span::styled("Answer quiz", self.theme.muted_style()));
            }
            spans
        };

        frame.render_widget(ratatui::widgets::Paragraph::new(Line::from(hints)), area);
    }

    /// Renders the document picker popup above the composer.
    fn render_doc_popup(&self, frame: &mut Frame, input_area: Rect) {
        let query = self
            .composer
            .at_token
            .as_ref()
            .map_or("", |t| t.query.as_str());
        let popup = DocumentPopup::new(&self.composer.doc_popup, query, self.theme);

        let (popup_width, popup_height) = popup.preferred_size();
        if popup_height == 0 {
            return;
        }

        let popup_area = anchor_above(popup_width, popup_height, input_area);
        frame.render_widget(popup, popup_area);
    }

    /// Renders the slash command popup above the composer.
    fn render_command_popup(&self, frame: &mut Frame, input_area: Rect) {
        let popup = CommandPopup::new(&self.composer.command_popup, self.theme);

        let (popup_width, popup_height) = popup.preferred_size();
        if popup_height == 0 {
            return;
        }

        let popup_area = anchor_above(popup_width, popup_height, input_area);
        frame.render_widget(popup, popup_area);
    }
}

/// Positions a popup directly above the composer, left-aligned.
fn anchor_above(popup_width: u16, popup_height: u16, input_area: Rect) -> Rect {
    let width = popup_width.min(input_area.width);
    Rect {
        x: input_area.x,
        y: input_area.y.saturating_sub(popup_height),
        width,
        height: popup_height,
    }
}
