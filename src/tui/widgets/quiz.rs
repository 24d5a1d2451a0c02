//! Inline quiz widget.
//!
//! A quiz entry renders as a block of questions with selectable options.
//! [`QuizAttempt`] is the widget's local state machine: it starts in
//! `Answering`, accumulates one answer per question id (last write wins),
//! and transitions exactly once to `Revealed`, after which selection is
//! inert and per-question verdicts are shown.
//!
//! The attempt never re-validates completeness on reveal (that guard lives
//! in the submit affordance) and it does not compute an aggregate score;
//! it hands the raw answers outward exactly once.

use std::collections::HashMap;

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use super::transcript::wrap_to_width;
use crate::api::QuizQuestion;
use crate::tui::Theme;

/// Phase of a quiz attempt. One-way: `Answering` → `Revealed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    /// Options are selectable.
    #[default]
    Answering,
    /// Verdicts are visible; selection is inert. Terminal.
    Revealed,
}

/// Local state for one rendered quiz. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct QuizAttempt {
    answers: HashMap<u64, String>,
    phase: QuizPhase,
    cursor: usize,
}

impl QuizAttempt {
    /// Creates a fresh attempt in the `Answering` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `option` as the answer for question `id`.
    ///
    /// Overwrites any prior selection for the same id and leaves other ids
    /// untouched. Returns false (and records nothing) once revealed.
    pub fn select(&mut self, id: u64, option: &str) -> bool {
        if self.phase == QuizPhase::Revealed {
            return false;
        }
        self.answers.insert(id, option.to_string());
        true
    }

    /// Returns the recorded answer for question `id`, if any.
    #[must_use]
    pub fn answer(&self, id: u64) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    /// Returns how many of `questions` have a recorded answer.
    #[must_use]
    pub fn answered_count(&self, questions: &[QuizQuestion]) -> usize {
        questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count()
    }

    /// Returns true once every question id has a recorded answer.
    ///
    /// This gates the visible submit affordance only; [`QuizAttempt::reveal`]
    /// does not check it.
    #[must_use]
    pub fn is_complete(&self, questions: &[QuizQuestion]) -> bool {
        questions.iter().all(|q| self.answers.contains_key(&q.id))
    }

    /// Transitions to `Revealed`.
    ///
    /// The first call returns the accumulated answers: the completion
    /// payload, delivered exactly once. Redundant calls return `None` and
    /// change nothing. Partial answers still transition.
    pub fn reveal(&mut self) -> Option<HashMap<u64, String>> {
        if self.phase == QuizPhase::Revealed {
            return None;
        }
        self.phase = QuizPhase::Revealed;
        Some(self.answers.clone())
    }

    /// Returns true once revealed.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.phase == QuizPhase::Revealed
    }

    /// Returns true iff the recorded answer equals the correct option
    /// exactly. Unanswered questions are incorrect.
    #[must_use]
    pub fn verdict(&self, question: &QuizQuestion) -> bool {
        self.answer(question.id) == Some(question.answer.as_str())
    }

    /// Index of the question the UI cursor is on.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor to the previous question.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor to the next question.
    pub fn cursor_down(&mut self, question_count: usize) {
        self.cursor = (self.cursor + 1).min(question_count.saturating_sub(1));
    }
}

/// Builds the visual lines for one quiz block.
#[must_use]
pub fn quiz_lines(
    questions: &[QuizQuestion],
    attempt: &QuizAttempt,
    width: usize,
    focused: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, question) in questions.iter().enumerate() {
        let on_cursor = focused && attempt.cursor() == idx;
        let marker = if on_cursor { "› " } else { "  " };
        let prompt_style = if on_cursor {
            theme.highlight_style()
        } else {
            theme.normal_style().add_modifier(Modifier::BOLD)
        };

        let prompt = format!("{}. {}", idx + 1, question.question);
        for (i, chunk) in wrap_to_width(&prompt, width.saturating_sub(2)).into_iter().enumerate() {
            let prefix = if i == 0 { marker } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(prefix.to_string(), prompt_style),
                Span::styled(chunk, prompt_style),
            ]));
        }

        let selected = attempt.answer(question.id);
        for (i, option) in question.options.iter().enumerate() {
            let is_selected = selected == Some(option.as_str());
            let mark = if is_selected { "(•)" } else { "( )" };
            let style = if attempt.is_revealed() {
                if is_selected && *option == question.answer {
                    theme.success_style()
                } else if is_selected {
                    theme.error_style()
                } else {
                    theme.muted_style()
                }
            } else if is_selected {
                theme.highlight_style()
            } else {
                theme.normal_style()
            };
            lines.push(Line::from(Span::styled(
                format!("    {}) {mark} {option}", i + 1),
                style,
            )));
        }

        if attempt.is_revealed() {
            if attempt.verdict(question) {
                lines.push(Line::from(Span::styled(
                    "    ✓ correct".to_string(),
                    theme.success_style(),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    format!("    ✗ correct answer: {}", question.answer),
                    theme.error_style(),
                )));
            }
        }
    }

    if !attempt.is_revealed() {
        if attempt.is_complete(questions) {
            lines.push(Line::from(Span::styled(
                "  Enter to submit answers".to_string(),
                theme.highlight_style(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!(
                    "  {}/{} answered",
                    attempt.answered_count(questions),
                    questions.len()
                ),
                theme.muted_style(),
            )));
        }
    }

    lines
}
