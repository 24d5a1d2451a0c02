//! Slash command suggestion popup widget.
//!
//! Displays a popup with available slash commands when the user types
//! `/` at the start of input.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Widget},
};

use crate::tui::Theme;

/// Maximum number of visible rows in the command popup.
pub const MAX_COMMAND_POPUP_ROWS: usize = 8;

/// A matched slash command for display.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    /// Command name (without slash).
    pub name: &'static str,
    /// Command description.
    pub description: &'static str,
}

/// State of the slash command suggestion popup.
#[derive(Debug, Clone, Default)]
pub enum CommandPopupState {
    /// Popup is not visible.
    #[default]
    Hidden,
    /// Popup is showing matching commands.
    Showing {
        /// List of matching commands.
        matches: Vec<CommandMatch>,
        /// Currently selected index.
        selected: usize,
    },
}

impl CommandPopupState {
    /// Returns true if the popup is visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Showing { .. })
    }

    /// Move selection up by one.
    pub fn select_up(&mut self) {
        if let Self::Showing { selected, .. } = self {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Move selection down by one.
    pub fn select_down(&mut self) {
        if let Self::Showing { matches, selected } = self {
            *selected = (*selected + 1).min(matches.len().saturating_sub(1));
        }
    }

    /// Returns the currently selected command name, if any.
    #[must_use]
    pub fn selected_command(&self) -> Option<&str> {
        if let Self::Showing { matches, selected } = self {
            matches.get(*selected).map(|m| m.name)
        } else {
            None
        }
    }

    /// Returns the number of matches if in Showing state.
    #[must_use]
    pub fn match_count(&self) -> usize {
        match self {
            Self::Showing { matches, .. } => matches.len(),
            Self::Hidden => 0,
        }
    }
}

/// Widget for rendering slash command suggestions.
pub struct CommandPopup<'a> {
    /// The popup state.
    state: &'a CommandPopupState,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> CommandPopup<'a> {
    /// Creates a new command popup widget.
    #[must_use]
    pub const fn new(state: &'a CommandPopupState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Calculates the preferred size for the popup.
    ///
    /// Returns (width, height) in terminal cells.
    #[must_use]
    pub fn preferred_size(&self) -> (u16, u16) {
        match self.state {
            CommandPopupState::Hidden => (0, 0),
            CommandPopupState::Showing { matches, .. } => {
                if matches.is_empty() {
                    return (0, 0);
                }

                let max_name_len = matches.iter().map(|m| m.name.len()).max().unwrap_or(0);
                let max_desc_len = matches
                    .iter()
                    .map(|m| m.description.len())
                    .max()
                    .unwrap_or(0);

                // Format: "/name  description" + padding
                #[allow(clippy::cast_possible_truncation)]
                let width = (1 + max_name_len + 2 + max_desc_len + 4).min(60) as u16;

                let content_rows = matches.len().min(MAX_COMMAND_POPUP_ROWS);
                #[allow(clippy::cast_possible_truncation)]
                let height = (content_rows + 2) as u16; // +2 for borders

                (width, height)
            }
        }
    }
}

impl Widget for CommandPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let CommandPopupState::Showing { matches, selected } = self.state else {
            return;
        };

        if matches.is_empty() {
            return;
        }

        Clear.render(area, buf);

        let block = Block::default()
            .title(" Commands ")
            .title_style(self.theme.header_style())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let inner = block.inner(area);
        block.render(area, buf);

        let max_name_len = matches.iter().map(|m| m.name.len()).max().unwrap_or(0);

        let items: Vec<ListItem> = matches
            .iter()
            .enumerate()
            .take(inner.height as usize)
            .map(|(i, cmd_match)| {
                let is_selected = i == *selected;
                let style = if is_selected {
                    self.theme.highlight_style()
                } else {
                    self.theme.normal_style()
                };
                let prefix = if is_selected { "> " } else { "  " };
                let line = format!(
                    "/{:<width$}  {}",
                    cmd_match.name,
                    cmd_match.description,
                    width = max_name_len
                );
                ListItem::new(Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(line, style),
                ]))
            })
            .collect();

        let list = List::new(items);
        Widget::render(list, inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn sample_matches() -> Vec<CommandMatch> {
        vec![
            CommandMatch {
                name: "mode",
                description: "Choose the chat mode",
            },
            CommandMatch {
                name: "upload",
                description: "Upload a document",
            },
        ]
    }

    #[test]
    fn hidden_popup_has_zero_size() {
        let state = CommandPopupState::Hidden;
        let theme = Theme::default();
        let popup = CommandPopup::new(&state, &theme);
        assert_eq!(popup.preferred_size(), (0, 0));
    }

    #[test]
    fn showing_popup_sizes_to_content() {
        let state = CommandPopupState::Showing {
            matches: sample_matches(),
            selected: 0,
        };
        let theme = Theme::default();
        let popup = CommandPopup::new(&state, &theme);
        let (width, height) = popup.preferred_size();
        assert!(width > 0);
        assert_eq!(height, 4); // 2 rows + borders
    }

    #[test]
    fn select_down_saturates_at_last_match() {
        let mut state = CommandPopupState::Showing {
            matches: sample_matches(),
            selected: 0,
        };
        state.select_down();
        state.select_down();
        state.select_down();
        assert_eq!(state.selected_command(), Some("upload"));
    }

    #[test]
    fn select_up_saturates_at_zero() {
        let mut state = CommandPopupState::Showing {
            matches: sample_matches(),
            selected: 1,
        };
        state.select_up();
        state.select_up();
        assert_eq!(state.selected_command(), Some("mode"));
    }

    #[test]
    fn selected_command_hidden_is_none() {
        let state = CommandPopupState::Hidden;
        assert_eq!(state.selected_command(), None);
        assert_eq!(state.match_count(), 0);
    }

    #[test]
    fn renders_command_names() -> Result<()> {
        let backend = TestBackend::new(50, 6);
        let mut terminal = Terminal::new(backend)?;
        let theme = Theme::default();
        let state = CommandPopupState::Showing {
            matches: sample_matches(),
            selected: 0,
        };

        terminal.draw(|frame| {
            let popup = CommandPopup::new(&state, &theme);
            frame.render_widget(popup, frame.area());
        })?;

        let buffer = terminal.backend().buffer();
        let row: String = (0..50).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(row.contains("/mode"));
        Ok(())
    }
}
