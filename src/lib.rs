//! `lingo` - TUI chat client for an AI study backend.
//!
//! Talks to a backend over `POST /chat` and `POST /upload`: ask questions
//! in one of six conversation modes, answer inline quizzes, follow
//! citations, and upload study documents.

pub mod api;
pub mod app;
pub mod cli;
pub mod picker;
pub mod sources;
pub mod tui;
