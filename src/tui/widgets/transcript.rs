//! Conversation transcript widget.
//!
//! Renders the append-only history as a scrollable panel. Line building is
//! a pure function shared with the scroll math so both always agree on the
//! visual line count. Dispatch is per entry kind: text bodies go through the
//! markdown styler, quiz bodies through the quiz block builder, and an
//! undecodable body renders a fixed placeholder.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
        Widget,
    },
};
use unicode_width::UnicodeWidthChar;

use super::citations::citation_line;
use super::markdown::markdown_lines;
use super::quiz::{QuizAttempt, quiz_lines};
use crate::api::{ConversationEntry, EntryBody, Role};
use crate::tui::Theme;

/// Placeholder shown for a response the client could not decode.
const INVALID_RESPONSE_PLACEHOLDER: &str = "Received invalid response from server.";

/// Wraps a single line of text to fit within the given width.
///
/// Unicode-aware: wide characters count as their display width. Each
/// returned string is one visual row.
#[must_use]
pub fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut result = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let char_width = ch.width().unwrap_or(0);

        if current_width + char_width > width {
            result.push(current_line);
            current_line = String::new();
            current_width = 0;
        }

        current_line.push(ch);
        current_width += char_width;
    }

    result.push(current_line);
    result
}

/// Returns the speaker label and its style for an entry.
fn speaker(entry: &ConversationEntry, theme: &Theme) -> (&'static str, ratatui::style::Style) {
    match entry.role {
        Role::User => ("You", theme.user_style()),
        Role::Assistant => ("Bot", theme.success_style().add_modifier(Modifier::BOLD)),
        Role::Bot => ("Bot", theme.error_style().add_modifier(Modifier::BOLD)),
    }
}

/// Builds the visual lines for the whole history.
///
/// Pure: same history, attempts, focus, width, and theme always produce the
/// same lines, and nothing here mutates the history.
#[must_use]
pub fn build_transcript_lines(
    history: &[ConversationEntry],
    attempts: &HashMap<usize, QuizAttempt>,
    focused_quiz: Option<usize>,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let fallback_attempt = QuizAttempt::new();

    for (idx, entry) in history.iter().enumerate() {
        let is_user = entry.role == Role::User;
        let align = if is_user {
            Alignment::Right
        } else {
            Alignment::Left
        };

        let (label, label_style) = speaker(entry, theme);
        lines.push(
            Line::from(vec![
                Span::styled(label.to_string(), label_style),
                Span::styled(
                    format!(" · {}", entry.when.format("%H:%M")),
                    theme.muted_style(),
                ),
            ])
            .alignment(align),
        );

        match &entry.body {
            EntryBody::Text(text) => {
                for line in markdown_lines(text, width, theme.normal_style(), theme) {
                    lines.push(line.alignment(align));
                }
            }
            EntryBody::Quiz(questions) => {
                let attempt = attempts.get(&idx).unwrap_or(&fallback_attempt);
                let focused = focused_quiz == Some(idx);
                lines.extend(quiz_lines(questions, attempt, width, focused, theme));
            }
            EntryBody::Invalid => {
                lines.push(Line::from(Span::styled(
                    INVALID_RESPONSE_PLACEHOLDER.to_string(),
                    theme.muted_style().add_modifier(Modifier::ITALIC),
                )));
            }
        }

        if let Some(chips) = citation_line(&entry.sources, theme) {
            lines.push(chips.alignment(align));
        }

        if idx + 1 < history.len() {
            lines.push(Line::from(Span::styled(
                "─".repeat(width.max(1)),
                theme.muted_style(),
            )));
        }
    }

    lines
}

/// Counts the visual lines the transcript occupies at the given width.
///
/// Used by the scroll state so offsets match what the widget renders.
#[must_use]
pub fn transcript_line_count(
    history: &[ConversationEntry],
    attempts: &HashMap<usize, QuizAttempt>,
    focused_quiz: Option<usize>,
    width: usize,
    theme: &Theme,
) -> usize {
    build_transcript_lines(history, attempts, focused_quiz, width, theme).len()
}

/// A scrollable conversation transcript.
pub struct TranscriptWidget<'a> {
    history: &'a [ConversationEntry],
    attempts: &'a HashMap<usize, QuizAttempt>,
    focused_quiz: Option<usize>,
    scroll_offset: usize,
    busy: bool,
    theme: &'a Theme,
}

impl<'a> TranscriptWidget<'a> {
    /// Creates a new transcript widget.
    #[must_use]
    pub const fn new(
        history: &'a [ConversationEntry],
        attempts: &'a HashMap<usize, QuizAttempt>,
        focused_quiz: Option<usize>,
        scroll_offset: usize,
        busy: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            history,
            attempts,
            focused_quiz,
            scroll_offset,
            busy,
            theme,
        }
    }
}

impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner_area = block.inner(area);
        let visible_height = inner_area.height as usize;

        // Account for scrollbar width (1 character on the right).
        let content_width = inner_area.width.saturating_sub(1) as usize;

        let all_lines = build_transcript_lines(
            self.history,
            self.attempts,
            self.focused_quiz,
            content_width,
            self.theme,
        );
        let total_lines = all_lines.len();

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .collect();

        let scroll_info = if total_lines > visible_height {
            format!(
                " ({}-{}/{})",
                self.scroll_offset + 1,
                (self.scroll_offset + visible_height).min(total_lines),
                total_lines
            )
        } else {
            String::new()
        };
        let title = if self.busy {
            format!(" Conversation{scroll_info} - Bot is typing... ")
        } else {
            format!(" Conversation{scroll_info} ")
        };

        let block = Block::default()
            .title(Line::from(Span::styled(title, self.theme.header_style())))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        block.render(area, buf);

        // Content is pre-wrapped; render without Paragraph wrapping.
        Paragraph::new(visible_lines).render(inner_area, buf);

        if total_lines > visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"))
                .track_symbol(Some("│"))
                .thumb_symbol("█")
                .track_style(self.theme.scrollbar_track_style())
                .thumb_style(self.theme.scrollbar_thumb_style());

            let mut scrollbar_state = ScrollbarState::new(total_lines)
                .position(self.scroll_offset)
                .viewport_content_length(visible_height);

            scrollbar.render(inner_area, buf, &mut scrollbar_state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QuizQuestion;
    use anyhow::Result;
    use chrono::Local;

    fn text_entry(role: Role, text: &str, sources: &[&str]) -> ConversationEntry {
        ConversationEntry {
            role,
            body: EntryBody::Text(text.to_string()),
            sources: sources.iter().map(ToString::to_string).collect(),
            when: Local::now(),
        }
    }

    fn quiz_entry() -> ConversationEntry {
        ConversationEntry {
            role: Role::Assistant,
            body: EntryBody::Quiz(vec![QuizQuestion {
                id: 1,
                question: "2+2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                answer: "4".to_string(),
            }]),
            sources: Vec::new(),
            when: Local::now(),
        }
    }

    fn flat(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    mod wrapping {
        use super::*;

        #[test]
        fn short_text_is_one_row() {
            assert_eq!(wrap_to_width("hello", 10), vec!["hello"]);
        }

        #[test]
        fn long_text_wraps_at_width() {
            assert_eq!(wrap_to_width("abcdef", 3), vec!["abc", "def"]);
        }

        #[test]
        fn zero_width_returns_text_unchanged() {
            assert_eq!(wrap_to_width("abc", 0), vec!["abc"]);
        }

        #[test]
        fn empty_text_is_one_empty_row() {
            assert_eq!(wrap_to_width("", 10), vec![""]);
        }

        #[test]
        fn wide_characters_count_double() {
            // Each CJK character is 2 cells wide, so only two fit in 4.
            assert_eq!(wrap_to_width("你好世界", 4), vec!["你好", "世界"]);
        }
    }

    mod line_building {
        use super::*;

        #[test]
        fn user_entries_are_right_aligned() {
            let theme = Theme::default();
            let history = vec![text_entry(Role::User, "hi", &[])];
            let lines = build_transcript_lines(&history, &HashMap::new(), None, 60, &theme);

            assert!(lines.iter().all(|l| l.alignment == Some(Alignment::Right)));
            let text = flat(&lines);
            assert!(text.iter().any(|l| l.contains("You")));
            assert!(text.iter().any(|l| l.contains("hi")));
        }

        #[test]
        fn assistant_entries_are_left_aligned() {
            let theme = Theme::default();
            let history = vec![text_entry(Role::Assistant, "hello", &[])];
            let lines = build_transcript_lines(&history, &HashMap::new(), None, 60, &theme);
            assert!(lines.iter().all(|l| l.alignment == Some(Alignment::Left)));
        }

        #[test]
        fn invalid_body_renders_placeholder() {
            let theme = Theme::default();
            let history = vec![ConversationEntry {
                role: Role::Assistant,
                body: EntryBody::Invalid,
                sources: Vec::new(),
                when: Local::now(),
            }];
            let lines = build_transcript_lines(&history, &HashMap::new(), None, 60, &theme);
            let text = flat(&lines);
            assert!(
                text.iter()
                    .any(|l| l.contains("Received invalid response from server."))
            );
        }

        #[test]
        fn quiz_body_delegates_to_quiz_lines() {
            let theme = Theme::default();
            let history = vec![quiz_entry()];
            let mut attempts = HashMap::new();
            attempts.insert(0, QuizAttempt::new());
            let lines = build_transcript_lines(&history, &attempts, None, 60, &theme);
            let text = flat(&lines);
            assert!(text.iter().any(|l| l.contains("1. 2+2?")));
        }

        #[test]
        fn citations_render_after_the_body() {
            let theme = Theme::default();
            let history = vec![text_entry(Role::Assistant, "see sources", &["doc1", "doc1"])];
            let lines = build_transcript_lines(&history, &HashMap::new(), None, 60, &theme);
            let text = flat(&lines);
            assert!(text.iter().any(|l| l.contains("[1 doc1] [2 doc1]")));
        }

        #[test]
        fn entries_are_separated_by_a_rule() {
            let theme = Theme::default();
            let history = vec![
                text_entry(Role::User, "q", &[]),
                text_entry(Role::Assistant, "a", &[]),
            ];
            let lines = build_transcript_lines(&history, &HashMap::new(), None, 20, &theme);
            let text = flat(&lines);
            assert_eq!(text.iter().filter(|l| l.starts_with("──")).count(), 1);
        }

        #[test]
        fn line_count_matches_built_lines() {
            let theme = Theme::default();
            let history = vec![
                text_entry(Role::User, "a long question that wraps around", &[]),
                quiz_entry(),
            ];
            let attempts = HashMap::new();
            assert_eq!(
                transcript_line_count(&history, &attempts, None, 12, &theme),
                build_transcript_lines(&history, &attempts, None, 12, &theme).len()
            );
        }

        #[test]
        fn building_does_not_mutate_history() {
            let theme = Theme::default();
            let history = vec![text_entry(Role::User, "stable", &["s"])];
            let before = history.clone();
            let _ = build_transcript_lines(&history, &HashMap::new(), None, 40, &theme);
            assert_eq!(history, before);
        }
    }

    mod widget {
        use super::*;
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        #[test]
        fn renders_history_inside_borders() -> Result<()> {
            let backend = TestBackend::new(40, 8);
            let mut terminal = Terminal::new(backend)?;
            let theme = Theme::default();
            let history = vec![text_entry(Role::Assistant, "hello there", &[])];
            let attempts = HashMap::new();

            terminal.draw(|frame| {
                let widget = TranscriptWidget::new(&history, &attempts, None, 0, false, &theme);
                frame.render_widget(widget, frame.area());
            })?;

            let buffer = terminal.backend().buffer();
            let mut content = String::new();
            for y in 0..8 {
                for x in 0..40 {
                    content.push_str(buffer[(x, y)].symbol());
                }
            }
            assert!(content.contains("hello there"));
            assert!(content.contains("Conversation"));
            Ok(())
        }

        #[test]
        fn busy_flag_shows_typing_indicator() -> Result<()> {
            let backend = TestBackend::new(50, 6);
            let mut terminal = Terminal::new(backend)?;
            let theme = Theme::default();
            let history = Vec::new();
            let attempts = HashMap::new();

            terminal.draw(|frame| {
                let widget = TranscriptWidget::new(&history, &attempts, None, 0, true, &theme);
                frame.render_widget(widget, frame.area());
            })?;

            let buffer = terminal.backend().buffer();
            let title: String = (0..50).map(|x| buffer[(x, 0)].symbol()).collect();
            assert!(title.contains("Bot is typing..."));
            Ok(())
        }
    }
}
