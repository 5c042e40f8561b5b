//! Preview component rendering the highlighted displayed text.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::preview::PreviewSegment;
use crate::infra::highlight::HighlightSpan;

/// Displays the open file with line numbers.
#[derive(Debug, Default)]
pub struct Preview;

impl Preview {
    pub fn render(
        &self,
        segment: &PreviewSegment,
        scroll: u16,
        has_focus: bool,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let mut title = format!("{} ({} lines)", segment.file_name, segment.line_count());
        if segment.redacted {
            title.push_str(" · redacted");
        }

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if has_focus {
                Color::Cyan
            } else {
                Color::DarkGray
            }));

        let mut lines = Vec::with_capacity(segment.highlighted.lines.len());
        for (idx, line) in segment.highlighted.lines.iter().enumerate() {
            let mut spans = vec![Span::styled(
                format!("{:>4} │ ", idx + 1),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(line.spans.iter().map(highlight_span_to_span));
            lines.push(Line::from(spans));
        }

        if lines.is_empty() {
            lines.push(Line::styled(
                "(empty file)",
                Style::default().fg(Color::DarkGray),
            ));
        }

        Paragraph::new(lines)
            .block(block)
            .scroll((scroll, 0))
            .render(area, buf);
    }
}

fn highlight_span_to_span(span: &HighlightSpan) -> Span<'_> {
    let mut style = Style::default();

    if let Some(color) = span.style.foreground {
        style = style.fg(Color::Rgb(color.r, color.g, color.b));
    }
    if span.style.attributes.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.style.attributes.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.style.attributes.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }

    Span::styled(span.content.as_str(), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::preview::PreviewService;
    use crate::infra::config::Config;

    #[test]
    fn renders_numbered_lines() {
        let segment = PreviewService::from_config(&Config::default()).preview(
            "Cart.cs",
            "class Cart\n{\n    void Add() { /* logic hidden */ }\n}\n",
            true,
        );
        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        Preview.render(&segment, 0, true, area, &mut buf);

        let row = |y: u16| -> String { (0..50).map(|x| buf.get(x, y).symbol()).collect() };
        assert!(row(0).contains("Cart.cs (4 lines) · redacted"));
        assert!(row(1).contains("   1 │ class Cart"));
        assert!(row(3).contains("   3 │     void Add() { /* logic hidden */ }"));
    }
}
