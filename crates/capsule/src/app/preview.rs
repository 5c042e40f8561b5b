//! Preview service producing syntax highlighted views of the displayed text.

use crate::infra::config::Config;
use crate::infra::highlight::{HighlightResult, Highlighter};

/// Displayable preview output including metadata for the UI layer.
#[derive(Debug, Clone)]
pub struct PreviewSegment {
    pub file_name: String,
    pub highlighted: HighlightResult,
    /// Whether any class or method of the file is currently hidden.
    pub redacted: bool,
}

impl PreviewSegment {
    pub fn line_count(&self) -> usize {
        self.highlighted.lines.len()
    }
}

/// Service responsible for preparing preview data from displayed text.
#[derive(Debug, Default)]
pub struct PreviewService {
    highlighter: Highlighter,
    theme: String,
}

impl PreviewService {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            highlighter: Highlighter::new(),
            theme: theme.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ui.theme.clone())
    }

    /// Highlight `text` as the contents of `file_name`.
    pub fn preview(&self, file_name: &str, text: &str, redacted: bool) -> PreviewSegment {
        let lines: Vec<String> = text
            .lines()
            .map(str::to_owned)
            .collect();

        PreviewSegment {
            file_name: file_name.to_owned(),
            highlighted: self.highlighter.highlight(file_name, &lines, &self.theme),
            redacted,
        }
    }
}
