//! Wire types for the study backend and the conversation model built from
//! them.
//!
//! The response side is deliberately lenient: every field of
//! [`ChatResponse`] is optional, and [`classify_body`] is total: any 2xx
//! body, however malformed, becomes exactly one [`ConversationEntry`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Conversation intents understood by the backend.
///
/// The wire representation is the snake_case name (`code_review`,
/// `interactive_tutorial`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Generate a multiple-choice quiz.
    Quiz,
    /// Generate flashcards.
    Flashcards,
    /// Summarize material (default).
    #[default]
    Summary,
    /// Review a piece of code.
    CodeReview,
    /// Argue both sides of a topic.
    Debate,
    /// Walk through material step by step.
    InteractiveTutorial,
}

impl ChatMode {
    /// Returns all modes in display order.
    #[must_use]
    pub const fn all() -> &'static [ChatMode] {
        &[
            ChatMode::Quiz,
            ChatMode::Flashcards,
            ChatMode::Summary,
            ChatMode::CodeReview,
            ChatMode::Debate,
            ChatMode::InteractiveTutorial,
        ]
    }

    /// Returns the display label for this mode.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Quiz => "Quiz",
            Self::Flashcards => "Flashcards",
            Self::Summary => "Summary",
            Self::CodeReview => "Code Review",
            Self::Debate => "Debate",
            Self::InteractiveTutorial => "Interactive Tutorial",
        }
    }

    /// Returns the wire name sent as the `intent` field.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
            Self::Summary => "summary",
            Self::CodeReview => "code_review",
            Self::Debate => "debate",
            Self::InteractiveTutorial => "interactive_tutorial",
        }
    }

    /// Returns a short description for the mode selector.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Quiz => "Multiple-choice questions about the material",
            Self::Flashcards => "Question/answer pairs for spaced review",
            Self::Summary => "Condensed overview of the material",
            Self::CodeReview => "Feedback on a piece of code",
            Self::Debate => "Arguments for and against a position",
            Self::InteractiveTutorial => "Step-by-step guided walkthrough",
        }
    }

    /// Parses a mode from its wire name or display label.
    ///
    /// Matching is case-insensitive and accepts both `code_review` and
    /// `Code Review` spellings.
    #[must_use]
    pub fn parse(input: &str) -> Option<ChatMode> {
        let normalized = input.trim().to_lowercase();
        Self::all().iter().copied().find(|mode| {
            normalized == mode.wire_name() || normalized == mode.label().to_lowercase()
        })
    }
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's question.
    pub query: String,
    /// The conversation intent selected in the mode selector.
    pub intent: ChatMode,
}

/// One multiple-choice question from a quiz response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Identifier unique within its question set.
    pub id: u64,
    /// Prompt text.
    pub question: String,
    /// Candidate answers, in display order.
    pub options: Vec<String>,
    /// The correct option. Expected to be a member of `options`; the client
    /// renders whatever it was given.
    pub answer: String,
}

/// Decoded response body from `POST /chat`.
///
/// Every field is optional so that any JSON object decodes successfully;
/// shape decisions happen in [`classify_body`], not in serde.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Response discriminator. Only `"quiz"` is meaningful.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Quiz questions, when the backend produced a quiz.
    #[serde(default)]
    pub questions: Option<Vec<QuizQuestion>>,
    /// Plain text answer.
    #[serde(default)]
    pub response: Option<String>,
    /// Citation strings for the material the answer drew on.
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person typing.
    User,
    /// A successful backend reply.
    Assistant,
    /// A client-authored error entry.
    Bot,
}

/// Payload of a conversation entry.
///
/// Exactly one variant is populated per entry; the `kind`/`content`/
/// `questions` coupling is carried by the type rather than checked at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    /// Plain (markdown-ish) text.
    Text(String),
    /// An interactive quiz.
    Quiz(Vec<QuizQuestion>),
    /// A 2xx body that could not be decoded at all; rendered as a fixed
    /// placeholder.
    Invalid,
}

/// One immutable message in the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    /// Who authored the entry.
    pub role: Role,
    /// The entry payload.
    pub body: EntryBody,
    /// Citation strings, possibly empty. Order and duplicates preserved as
    /// received.
    pub sources: Vec<String>,
    /// Local wall-clock time the entry was appended.
    pub when: DateTime<Local>,
}

impl ConversationEntry {
    /// Builds the optimistic local echo for a submitted draft.
    #[must_use]
    pub fn user(content: String, when: DateTime<Local>) -> Self {
        Self {
            role: Role::User,
            body: EntryBody::Text(content),
            sources: Vec::new(),
            when,
        }
    }

    /// Builds the bot-authored entry for a failed chat request.
    #[must_use]
    pub fn failure(message: &str, when: DateTime<Local>) -> Self {
        Self {
            role: Role::Bot,
            body: EntryBody::Text(format!("Error: {message}")),
            sources: Vec::new(),
            when,
        }
    }

    /// Returns the quiz questions if this entry carries a quiz.
    #[must_use]
    pub fn questions(&self) -> Option<&[QuizQuestion]> {
        match &self.body {
            EntryBody::Quiz(questions) => Some(questions),
            _ => None,
        }
    }

    /// Returns true if this entry carries a quiz.
    #[must_use]
    pub fn is_quiz(&self) -> bool {
        matches!(self.body, EntryBody::Quiz(_))
    }
}

/// Classifies a raw 2xx response body into exactly one conversation entry.
///
/// The classification is total:
/// - JSON with `type == "quiz"` and a present, non-null `questions` array
///   becomes a quiz entry;
/// - any other JSON object becomes a text entry (missing `response` reads as
///   the empty string, any other `type` value is ignored);
/// - a body that does not decode as a `ChatResponse` becomes an
///   [`EntryBody::Invalid`] placeholder entry.
///
/// No input fails the exchange.
#[must_use]
pub fn classify_body(body: &str, when: DateTime<Local>) -> ConversationEntry {
    let Ok(response) = serde_json::from_str::<ChatResponse>(body) else {
        return ConversationEntry {
            role: Role::Assistant,
            body: EntryBody::Invalid,
            sources: Vec::new(),
            when,
        };
    };

    let sources = response.sources.unwrap_or_default();

    if response.kind.as_deref() == Some("quiz")
        && let Some(questions) = response.questions
    {
        return ConversationEntry {
            role: Role::Assistant,
            body: EntryBody::Quiz(questions),
            sources,
            when,
        };
    }

    ConversationEntry {
        role: Role::Assistant,
        body: EntryBody::Text(response.response.unwrap_or_default()),
        sources,
        when,
    }
}
