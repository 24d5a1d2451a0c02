//! Markdown-ish styling for message bodies.
//!
//! The backend answers in light markdown. This is a safe, line-oriented
//! rendering: `#` headings, `-`/`*` bullet items, and `` ` `` inline code
//! spans. Everything else passes through as plain text; unknown syntax is
//! shown, never dropped.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::transcript::wrap_to_width;
use crate::tui::Theme;

/// How a single logical line should be presented.
enum LineShape {
    Heading(String),
    Bullet(String),
    Plain(String),
    Blank,
}

/// Classifies one source line and strips its markers.
fn shape_of(line: &str) -> LineShape {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return LineShape::Blank;
    }

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes)
        && let Some(rest) = trimmed[hashes..].strip_prefix(' ')
    {
        return LineShape::Heading(rest.to_string());
    }

    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        return LineShape::Bullet(format!("• {rest}"));
    }

    LineShape::Plain(line.to_string())
}

/// Splits a wrapped chunk into spans, styling `` `code` `` segments.
///
/// Segments alternate on backticks; the backticks themselves are dropped.
fn inline_spans(chunk: &str, base: Style, code: Style) -> Vec<Span<'static>> {
    if !chunk.contains('`') {
        return vec![Span::styled(chunk.to_string(), base)];
    }

    let mut spans = Vec::new();
    for (i, segment) in chunk.split('`').enumerate() {
        if segment.is_empty() {
            continue;
        }
        let style = if i % 2 == 1 { code } else { base };
        spans.push(Span::styled(segment.to_string(), style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(String::new(), base));
    }
    spans
}

/// Renders message text as styled, width-wrapped lines.
///
/// Pure: the same text, width, and theme always produce the same lines.
#[must_use]
pub fn markdown_lines(text: &str, width: usize, base: Style, theme: &Theme) -> Vec<Line<'static>> {
    let code = theme.code_style();
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        match shape_of(source_line) {
            LineShape::Blank => lines.push(Line::from(String::new())),
            LineShape::Heading(content) => {
                for chunk in wrap_to_width(&content, width) {
                    lines.push(Line::from(Span::styled(chunk, theme.header_style())));
                }
            }
            LineShape::Bullet(content) | LineShape::Plain(content) => {
                for chunk in wrap_to_width(&content, width) {
                    lines.push(Line::from(inline_spans(&chunk, base, code)));
                }
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn render(text: &str, width: usize) -> Vec<Line<'static>> {
        let theme = Theme::default();
        markdown_lines(text, width, theme.normal_style(), &theme)
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn plain_text_passes_through() {
        let lines = render("hello world", 80);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "hello world");
    }

    #[test]
    fn heading_is_stripped_and_styled() {
        let theme = Theme::default();
        let lines = render("## Ownership", 80);
        assert_eq!(line_text(&lines[0]), "Ownership");
        assert_eq!(lines[0].spans[0].style, theme.header_style());
    }

    #[test]
    fn hashes_without_space_are_not_headings() {
        let lines = render("#1 ranked answer", 80);
        assert_eq!(line_text(&lines[0]), "#1 ranked answer");
    }

    #[test]
    fn bullets_get_a_dot_marker() {
        let lines = render("- first\n* second", 80);
        assert_eq!(line_text(&lines[0]), "• first");
        assert_eq!(line_text(&lines[1]), "• second");
    }

    #[test]
    fn inline_code_is_styled_and_backticks_dropped() {
        let theme = Theme::default();
        let lines = render("use `Vec::new` here", 80);
        let line = &lines[0];
        assert_eq!(line_text(line), "use Vec::new here");
        let code_span = line
            .spans
            .iter()
            .find(|s| s.content == "Vec::new")
            .expect("code span");
        assert_eq!(code_span.style, theme.code_style());
    }

    #[test]
    fn long_lines_wrap_to_width() {
        let lines = render("abcdefghij", 4);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn blank_lines_are_preserved() {
        let lines = render("one\n\ntwo", 80);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[1]), "");
    }

    #[test]
    fn rendering_is_deterministic() {
        let first = render("# A\n- b `c`", 20);
        let second = render("# A\n- b `c`", 20);
        let flat = |lines: &[Line]| -> Vec<String> { lines.iter().map(line_text).collect() };
        assert_eq!(flat(&first), flat(&second));
    }

    #[test]
    fn heading_style_has_bold() {
        let theme = Theme::default();
        assert!(theme.header_style().add_modifier.contains(Modifier::BOLD));
    }
}
