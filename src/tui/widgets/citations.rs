//! Citation chips.
//!
//! Assistant entries can carry citation strings. Each renders as a numbered
//! chip; `/open <n>` resolves the n-th chip of the most recent entry that
//! has any. Order and duplicates are preserved exactly as received.

use ratatui::text::{Line, Span};

use crate::tui::Theme;

/// Builds the chip line for an entry's sources.
///
/// Returns `None` when there is nothing to cite, so empty source sets
/// produce no affordance at all.
#[must_use]
pub fn citation_line(sources: &[String], theme: &Theme) -> Option<Line<'static>> {
    if sources.is_empty() {
        return None;
    }

    let mut spans = Vec::with_capacity(sources.len() * 2);
    for (i, source) in sources.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("[{} {source}]", i + 1),
            theme.chip_style(),
        ));
    }
    Some(Line::from(spans))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn empty_sources_render_nothing() {
        let theme = Theme::default();
        assert!(citation_line(&[], &theme).is_none());
    }

    #[test]
    fn chips_are_numbered_in_order() {
        let theme = Theme::default();
        let sources = vec!["doc1".to_string(), "doc2".to_string()];
        let line = citation_line(&sources, &theme).expect("chips");
        assert_eq!(text_of(&line), "[1 doc1] [2 doc2]");
    }

    #[test]
    fn duplicate_sources_produce_two_chips() {
        let theme = Theme::default();
        let sources = vec!["a".to_string(), "a".to_string()];
        let line = citation_line(&sources, &theme).expect("chips");
        assert_eq!(text_of(&line), "[1 a] [2 a]");
    }

    #[test]
    fn chips_use_the_chip_style() {
        let theme = Theme::default();
        let sources = vec!["doc1".to_string()];
        let line = citation_line(&sources, &theme).expect("chips");
        assert_eq!(line.spans[0].style, theme.chip_style());
    }
}
