//! File list component and state management.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::scan::ScanResult;
use crate::domain::model::StagedBundle;

/// Navigable state of the project's file list.
#[derive(Debug, Default, Clone)]
pub struct FileListState {
    names: Vec<String>,
    selected: usize,
    root_label: String,
    placeholder: bool,
}

impl FileListState {
    /// Construct state from a scan result.
    pub fn from_scan(result: &ScanResult) -> Self {
        Self {
            names: result.files.iter().map(|file| file.name.clone()).collect(),
            selected: 0,
            root_label: folder_label(result),
            placeholder: result.placeholder,
        }
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.names.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.names.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }
}

fn folder_label(result: &ScanResult) -> String {
    result
        .root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| result.root.display().to_string())
}

/// Ratatui component rendering the file list.
#[derive(Debug, Default)]
pub struct FileList;

impl FileList {
    /// Staged files are marked with `+`, the open file is drawn bold.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &FileListState,
        has_focus: bool,
        staged: &StagedBundle,
        open: Option<&str>,
    ) {
        let mut title = format!("Files · {}", state.root_label());
        if state.placeholder {
            title.push_str(" (missing)");
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(has_focus))
            .title(title);

        if state.is_empty() {
            let placeholder = Paragraph::new("No matching files").block(block).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem<'_>> = state
            .names
            .iter()
            .map(|name| {
                let marker = if staged.contains(name) { "+ " } else { "  " };
                let mut style = Style::default();
                if open == Some(name.as_str()) {
                    style = style.add_modifier(Modifier::BOLD);
                }
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::styled(name.clone(), style),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(state.selected));

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style(has_focus))
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

pub(crate) fn border_style(has_focus: bool) -> Style {
    Style::default().fg(if has_focus {
        Color::Cyan
    } else {
        Color::DarkGray
    })
}

pub(crate) fn highlight_style(has_focus: bool) -> Style {
    let background = if has_focus { Color::Cyan } else { Color::Gray };
    Style::default()
        .fg(Color::Black)
        .bg(background)
        .add_modifier(Modifier::BOLD)
}
