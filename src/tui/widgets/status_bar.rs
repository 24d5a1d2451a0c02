//! Compact status bar for the chat view.
//!
//! Two borderless lines under the transcript: the active mode with request
//! activity on the first, the latest notice (or a readiness hint) on the
//! second. Upload results surface here; they never touch the conversation
//! history.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::api::ChatMode;
use crate::tui::Theme;

/// Severity of a status notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational (upload finished, quiz submitted, ...).
    Info,
    /// Something failed (upload error, bad command, ...).
    Error,
}

/// A transient message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// The message text.
    pub text: String,
    /// Severity, which picks the style.
    pub level: NoticeLevel,
}

impl Notice {
    /// Creates an informational notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: NoticeLevel::Info,
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// A compact 2-line status indicator widget.
pub struct StatusBarWidget<'a> {
    /// Active conversation mode.
    mode: ChatMode,
    /// Whether a chat request is in flight.
    busy: bool,
    /// Number of uploads currently in flight.
    uploads_in_flight: usize,
    /// Whether an unrevealed quiz is waiting for answers.
    pending_quiz: bool,
    /// Latest notice, if any.
    notice: Option<&'a Notice>,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    /// Creates a new status bar widget.
    #[must_use]
    pub const fn new(
        mode: ChatMode,
        busy: bool,
        uploads_in_flight: usize,
        pending_quiz: bool,
        notice: Option<&'a Notice>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            mode,
            busy,
            uploads_in_flight,
            pending_quiz,
            notice,
            theme,
        }
    }

    /// Builds the first line: mode and request activity.
    fn activity_line(&self) -> Line<'static> {
        let (icon, icon_style) = if self.busy {
            ("▶", self.theme.highlight_style())
        } else {
            ("·", self.theme.muted_style())
        };

        let mut spans = vec![
            Span::styled(format!(" {icon} "), icon_style),
            Span::styled("Mode: ", self.theme.muted_style()),
            Span::styled(self.mode.label().to_string(), self.theme.normal_style()),
        ];

        if self.busy {
            spans.push(Span::styled(
                "  |  waiting for reply...",
                self.theme.highlight_style(),
            ));
        }

        if self.uploads_in_flight > 0 {
            spans.push(Span::styled(
                format!(
                    "  |  uploading {} file{}",
                    self.uploads_in_flight,
                    if self.uploads_in_flight == 1 { "" } else { "s" }
                ),
                self.theme.warning_style(),
            ));
        }

        Line::from(spans)
    }

    /// Builds the second line: notice, quiz hint, or readiness.
    fn detail_line(&self) -> Line<'static> {
        if let Some(notice) = self.notice {
            let style = match notice.level {
                NoticeLevel::Info => self.theme.success_style(),
                NoticeLevel::Error => self.theme.error_style(),
            };
            return Line::from(Span::styled(format!("   {}", notice.text), style));
        }

        if self.pending_quiz {
            return Line::from(Span::styled(
                "   Quiz waiting - Ctrl+Q to answer",
                self.theme.highlight_style(),
            ));
        }

        Line::from(Span::styled("   Ready", self.theme.muted_style()))
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            Paragraph::new(self.activity_line()).render(area, buf);
            return;
        }

        let lines = vec![self.activity_line(), self.detail_line()];
        Paragraph::new(lines).render(area, buf);
    }
}
