//! Terminal presentation: setup guard, theme, and the chat widgets.

pub mod setup;
pub mod theme;
pub mod widgets;

pub use setup::TerminalEventGuard;
pub use theme::Theme;
