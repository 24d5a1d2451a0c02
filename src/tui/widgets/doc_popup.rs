//! Document suggestion popup for the uploader.
//!
//! Shown while the user types an `@` token in the composer; lists fuzzy
//! matches from the background document search. Directories are selectable
//! for drill-down and render with a trailing slash.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Widget},
};

use crate::picker::DocumentMatch;
use crate::tui::Theme;

/// Maximum number of visible rows in the popup.
pub const MAX_POPUP_ROWS: usize = 8;

/// State of the document suggestion popup.
#[derive(Debug, Clone, Default)]
pub enum DocPopupState {
    /// No popup should be shown.
    #[default]
    Hidden,
    /// A search is running.
    Loading,
    /// The search came back empty.
    NoMatches,
    /// Showing upload candidates.
    Showing {
        /// The matched documents.
        matches: Vec<DocumentMatch>,
        /// Currently selected index (0-indexed).
        selected: usize,
    },
}

impl DocPopupState {
    /// Returns true if the popup is visible (not hidden).
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Returns true if there is at least one selectable match.
    #[must_use]
    pub fn has_matches(&self) -> bool {
        matches!(self, Self::Showing { matches, .. } if !matches.is_empty())
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

    /// Returns the currently selected match, if any.
    #[must_use]
    pub fn selected_match(&self) -> Option<&DocumentMatch> {
        if let Self::Showing { matches, selected } = self {
            matches.get(*selected)
        } else {
            None
        }
    }
}

/// A popup widget for displaying document suggestions.
pub struct DocumentPopup<'a> {
    /// The popup state.
    state: &'a DocPopupState,
    /// The search query (displayed in title).
    query: &'a str,
    /// Theme for styling.
    theme: &'a Theme,
}

impl<'a> DocumentPopup<'a> {
    /// Creates a new document popup.
    #[must_use]
    pub const fn new(state: &'a DocPopupState, query: &'a str, theme: &'a Theme) -> Self {
        Self {
            state,
            query,
            theme,
        }
    }

    /// Calculates the preferred size for the popup.
    ///
    /// Returns (width, height) in terminal cells.
    #[must_use]
    pub fn preferred_size(&self) -> (u16, u16) {
        let width = 50u16;
        let height = match self.state {
            DocPopupState::Hidden => 0,
            DocPopupState::Loading | DocPopupState::NoMatches => 3,
            DocPopupState::Showing { matches, .. } => {
                let content_rows = matches.len().min(MAX_POPUP_ROWS);
                #[allow(clippy::cast_possible_truncation)]
                let rows = content_rows as u16;
                rows + 2 // +2 for borders
            }
        };
        (width, height)
    }
}

impl Widget for DocumentPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if matches!(self.state, DocPopupState::Hidden) {
            return;
        }

        Clear.render(area, buf);

        let title = if self.query.is_empty() {
            " Documents ".to_string()
        } else {
            format!(" Documents matching @{} ", self.query)
        };

        let block = Block::default()
            .title(title)
            .title_style(self.theme.header_style())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let inner = block.inner(area);
        block.render(area, buf);

        match self.state {
            DocPopupState::Hidden => {}
            DocPopupState::Loading => {
                let text = Line::from("Searching...").style(self.theme.muted_style());
                Widget::render(text, inner, buf);
            }
            DocPopupState::NoMatches => {
                let text = Line::from("No matches").style(self.theme.muted_style());
                Widget::render(text, inner, buf);
            }
            DocPopupState::Showing { matches, selected } => {
                let items: Vec<ListItem> = matches
                    .iter()
                    .enumerate()
                    .take(MAX_POPUP_ROWS)
                    .map(|(i, doc_match)| {
                        let path_str = if doc_match.is_dir {
                            format!("{}/", doc_match.path.display())
                        } else {
                            doc_match.path.display().to_string()
                        };
                        let is_selected = i == *selected;
                        let style = if is_selected {
                            self.theme.highlight_style()
                        } else {
                            self.theme.normal_style()
                        };
                        let prefix = if is_selected { "> " } else { "  " };
                        ListItem::new(Line::from(vec![
                            Span::styled(prefix, style),
                            Span::styled(path_str, style),
                        ]))
                    })
                    .collect();

                let list = List::new(items);
                Widget::render(list, inner, buf);
            }
        }
    }
}
