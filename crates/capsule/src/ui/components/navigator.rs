//! Structure navigator: one checkbox per class and method of the open file.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::domain::model::HiddenNames;
use crate::domain::syntax::OutlineEntry;

#[derive(Debug, Default, Clone)]
pub struct NavigatorState {
    entries: Vec<OutlineEntry>,
    selected: usize,
}

impl NavigatorState {
    pub fn new(entries: Vec<OutlineEntry>) -> Self {
        Self {
            entries,
            selected: 0,
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn selected_entry(&self) -> Option<&OutlineEntry> {
        self.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Checked boxes mark visible declarations; unchecking one hides it.
#[derive(Debug, Default)]
pub struct Navigator;

impl Navigator {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &NavigatorState,
        hidden: &HiddenNames,
        has_focus: bool,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(super::file_list::border_style(has_focus))
            .title("Structure");

        if state.entries.is_empty() {
            let placeholder = Paragraph::new("No classes")
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem<'_>> = state
            .entries
            .iter()
            .map(|entry| ListItem::new(entry_line(entry, hidden)))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(state.selected));
        let list = List::new(items)
            .block(block)
            .highlight_style(super::file_list::highlight_style(has_focus));
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn entry_line<'a>(entry: &'a OutlineEntry, hidden: &HiddenNames) -> Line<'a> {
    match entry {
        OutlineEntry::Class { name, depth, .. } => Line::from(vec![
            Span::raw("  ".repeat(*depth)),
            Span::raw(checkbox(!hidden.is_class_hidden(name))),
            Span::styled(entry.label(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        OutlineEntry::Method { name, .. } => Line::from(vec![
            Span::raw("    "),
            Span::raw(checkbox(!hidden.is_method_hidden(name))),
            Span::raw(entry.label()),
        ]),
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x] " } else { "[ ] " }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::domain::syntax::ClassKind;

    fn entries() -> Vec<OutlineEntry> {
        vec![
            OutlineEntry::Class {
                name: "Cart".into(),
                kind: ClassKind::Class,
                depth: 0,
            },
            OutlineEntry::Method {
                name: "Add".into(),
                return_type: "void".into(),
                class: "Cart".into(),
            },
        ]
    }

    fn rows(terminal: &Terminal<TestBackend>, width: u16, height: u16) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer.get(x, y).symbol()).collect())
            .collect()
    }

    #[test]
    fn renders_checkbox_per_declaration() {
        let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
        let state = NavigatorState::new(entries());
        let hidden = HiddenNames::from_names(Vec::<String>::new(), ["Add".to_string()]);

        terminal
            .draw(|frame| {
                let area = frame.size();
                Navigator.render(frame, area, &state, &hidden, false);
            })
            .unwrap();

        let rows = rows(&terminal, 30, 5);
        assert!(rows[1].contains("[x] class Cart"), "{rows:?}");
        assert!(rows[2].contains("    [ ] void Add()"), "{rows:?}");
    }

    #[test]
    fn selection_moves_through_entries() {
        let mut state = NavigatorState::new(entries());
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_entry().map(OutlineEntry::name), Some("Add"));
        state.select_previous();
        assert_eq!(state.selected_entry().map(OutlineEntry::name), Some("Cart"));
    }
}
