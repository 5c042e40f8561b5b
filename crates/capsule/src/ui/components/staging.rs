//! Staging panel listing the files captured for the bundle.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::domain::model::StagedBundle;

/// Displays staged snapshots in the order they will be exported.
#[derive(Debug, Default)]
pub struct Staging;

impl Staging {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, staged: &StagedBundle) {
        let block = Block::default().title("Staged").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        if staged.is_empty() {
            let placeholder = Paragraph::new("Nothing staged (press a)")
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let header = Line::from(vec![
            Span::styled("Total files", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::styled(staged.len().to_string(), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(header), layout[0]);

        let list = List::new(build_item_list(staged)).block(Block::default());
        frame.render_widget(list, layout[1]);
    }
}

fn build_item_list(staged: &StagedBundle) -> Vec<ListItem<'static>> {
    staged
        .iter()
        .map(|(name, text)| {
            let lines = text.lines().count();
            ListItem::new(Line::from(vec![
                Span::raw(name.to_owned()),
                Span::styled(
                    format!(" – {lines} lines"),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect()
}
