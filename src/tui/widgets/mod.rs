//! Custom TUI widgets.

pub mod citations;
pub mod command_popup;
pub mod doc_popup;
pub mod markdown;
pub mod quiz;
pub mod status_bar;
pub mod transcript;

pub use citations::citation_line;
pub use command_popup::{CommandMatch, CommandPopup, CommandPopupState, MAX_COMMAND_POPUP_ROWS};
pub use doc_popup::{DocPopupState, DocumentPopup, MAX_POPUP_ROWS};
pub use quiz::{QuizAttempt, QuizPhase, quiz_lines};
pub use status_bar::{Notice, NoticeLevel, StatusBarWidget};
pub use transcript::{TranscriptWidget, build_transcript_lines, transcript_line_count};
