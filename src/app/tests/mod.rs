//! Tests for the app module.
//!
//! This module is organized into submodules by functionality:
//! - `helpers` - Shared test utilities (scripted backend, app builders)
//! - `input` - Composer keys, paste handling, popups, and slash commands
//! - `quiz` - Quiz focus, answering, and the reveal flow
//! - `submit` - The chat submission contract
//! - `ui` - Rendered-frame assertions over a `TestBackend`
//! - `upload` - Document upload flow

#[allow(clippy::unwrap_used, clippy::expect_used)]
pub mod helpers;
