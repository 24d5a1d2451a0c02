//! Mode selector overlay rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::api::ChatMode;
use crate::app::App;

impl App {
    /// Renders the mode selector as a centered overlay.
    pub(crate) fn render_mode_select(&self, frame: &mut Frame) {
        let area = frame.area();

        let modes = ChatMode::all();
        let popup_width = 64u16;
        #[allow(clippy::cast_possible_truncation)]
        let popup_height = (modes.len() + 7) as u16;
        let x = area.width.saturating_sub(popup_width) / 2;
        let y = area.height.saturating_sub(popup_height) / 2;
        let popup_area = Rect::new(x, y, popup_width.min(area.width), popup_height);

        frame.render_widget(Clear, popup_area);

        let mut content_lines = Vec::new();
        content_lines.push(Line::from(Span::styled(
            "Choose Chat Mode",
            self.theme.header_style(),
        )));
        content_lines.push(Line::from(Span::styled(
            "The intent sent with every question.",
            self.theme.muted_style(),
        )));
        content_lines.push(Line::from(""));

        for (i, mode) in modes.iter().enumerate() {
            let is_selected = i == self.mode_select.selected;
            let is_active = *mode == self.session.mode;
            let prefix = if is_selected { "› " } else { "  " };
            let active_marker = if is_active { " (current)" } else { "" };

            let line = if is_selected {
                Line::from(vec![
                    Span::styled(prefix, self.theme.highlight_style()),
                    Span::styled(
                        format!("{:<22}", mode.label()),
                        self.theme.highlight_style(),
                    ),
                    Span::styled(mode.description(), self.theme.highlight_style()),
                    Span::styled(active_marker, self.theme.muted_style()),
                ])
            } else {
                Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(format!("{:<22}", mode.label()), self.theme.normal_style()),
                    Span::styled(mode.description(), self.theme.muted_style()),
                    Span::styled(active_marker, self.theme.muted_style()),
                ])
            };
            content_lines.push(line);
        }

        content_lines.push(Line::from(""));
        content_lines.push(Line::from(vec![
            Span::styled("[↑/↓] ", self.theme.highlight_style()),
            Span::styled("Navigate  ", self.theme.muted_style()),
            Span::styled("[Enter] ", self.theme.highlight_style()),
            Span::styled("Select  ", self.theme.muted_style()),
            Span::styled("[Esc] ", self.theme.highlight_style()),
            Span::styled("Close", self.theme.muted_style()),
        ]));

        let block = Block::default()
            .title(" Mode ")
            .title_style(self.theme.header_style())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let paragraph = Paragraph::new(content_lines)
            .block(block)
            .alignment(ratatui::layout::Alignment::Left);

        frame.render_widget(paragraph, popup_area);
    }
}
