//! Centralized theme and styling.
//!
//! The active theme is registered process-wide exactly once via
//! [`Theme::install`]; later installs are ignored. Rendering code reads it
//! through [`Theme::global`].

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

/// The process-wide theme registry. Set at most once.
static ACTIVE_THEME: OnceLock<Theme> = OnceLock::new();

/// Application theme with consistent colors and styles.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color.
    pub bg: Color,
    /// Primary foreground color.
    pub fg: Color,
    /// Accent/highlight color.
    pub accent: Color,
    /// Success color (green).
    pub success: Color,
    /// Warning color (yellow).
    pub warning: Color,
    /// Error color (red).
    pub error: Color,
    /// Muted/secondary text color.
    pub muted: Color,
    /// Border color.
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            border: Color::Gray,
        }
    }
}

impl Theme {
    /// Registers `theme` as the process-wide theme.
    ///
    /// The first call wins; subsequent calls are no-ops. Returns `true` if
    /// this call performed the registration, `false` if a theme was already
    /// installed.
    pub fn install(theme: Theme) -> bool {
        ACTIVE_THEME.set(theme).is_ok()
    }

    /// Returns the installed theme, installing the default on first access.
    #[must_use]
    pub fn global() -> &'static Theme {
        ACTIVE_THEME.get_or_init(Theme::default)
    }

    /// Style for the header/title.
    #[must_use]
    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for normal text.
    #[must_use]
    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Style for muted/secondary text.
    #[must_use]
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for success messages.
    #[must_use]
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Style for warning messages.
    #[must_use]
    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Style for error messages.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Style for borders.
    #[must_use]
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for highlighted/selected items.
    #[must_use]
    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the speaker label on messages the user sent.
    #[must_use]
    pub fn user_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for inline code spans in message bodies.
    #[must_use]
    pub fn code_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Style for citation chips.
    #[must_use]
    pub fn chip_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Style for scrollbar thumb.
    #[must_use]
    pub fn scrollbar_thumb_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Style for scrollbar track.
    #[must_use]
    pub fn scrollbar_track_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for placeholder text (visible on both light and dark backgrounds).
    #[must_use]
    pub fn placeholder_style(&self) -> Style {
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
    }
}
