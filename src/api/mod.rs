//! Backend protocol and HTTP client.

pub mod client;
pub mod protocol;

pub use client::{ApiError, Backend, HttpBackend};
pub use protocol::{
    ChatMode, ChatRequest, ChatResponse, ConversationEntry, EntryBody, QuizQuestion, Role,
    classify_body,
};
