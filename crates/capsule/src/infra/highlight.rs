//! Syntax highlighting utilities built on top of syntect.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

const DEFAULT_THEME: &str = "base16-ocean.dark";

static DEFAULT_ASSETS: Lazy<(Arc<SyntaxSet>, Arc<ThemeSet>)> = Lazy::new(|| {
    (
        Arc::new(SyntaxSet::load_defaults_newlines()),
        Arc::new(ThemeSet::load_defaults()),
    )
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightAttributes {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightStyle {
    pub foreground: Option<RgbColor>,
    pub background: Option<RgbColor>,
    pub attributes: HighlightAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub content: String,
    pub style: HighlightStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightLine {
    pub spans: Vec<HighlightSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    Highlighted,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    pub lines: Vec<HighlightLine>,
    pub language: Option<String>,
    pub theme: String,
    pub mode: HighlightMode,
}

impl HighlightResult {
    pub fn plain(lines: Vec<String>, theme: String) -> Self {
        HighlightResult {
            lines: lines
                .into_iter()
                .map(|line| HighlightLine {
                    spans: vec![HighlightSpan {
                        content: line,
                        style: HighlightStyle::default(),
                    }],
                })
                .collect(),
            language: None,
            theme,
            mode: HighlightMode::Plain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Highlighter {
    syntax_set: Arc<SyntaxSet>,
    theme_set: Arc<ThemeSet>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        let assets = &*DEFAULT_ASSETS;
        Self {
            syntax_set: Arc::clone(&assets.0),
            theme_set: Arc::clone(&assets.1),
        }
    }

    pub fn available_themes(&self) -> Vec<String> {
        let mut themes: Vec<_> = self.theme_set.themes.keys().cloned().collect();
        themes.sort();
        themes
    }

    /// Highlight `lines` using the syntax chosen from `file_name`'s extension.
    pub fn highlight(&self, file_name: &str, lines: &[String], theme: &str) -> HighlightResult {
        let Some(resolved) = self.resolve_theme(theme) else {
            return HighlightResult::plain(lines.to_vec(), theme.to_owned());
        };
        let theme_name = resolved.name.to_string();

        let Some(syntax) = self.syntax_for_name(file_name) else {
            return HighlightResult::plain(lines.to_vec(), theme_name);
        };

        match self.highlight_with_syntax(lines, resolved.theme, syntax) {
            Ok(highlighted) => HighlightResult {
                lines: highlighted,
                language: Some(syntax.name.clone()),
                theme: theme_name,
                mode: HighlightMode::Highlighted,
            },
            Err(err) => {
                tracing::warn!(error = %err, file = file_name, "highlight failed");
                HighlightResult::plain(lines.to_vec(), theme_name)
            }
        }
    }

    fn highlight_with_syntax(
        &self,
        lines: &[String],
        theme: &Theme,
        syntax: &SyntaxReference,
    ) -> Result<Vec<HighlightLine>> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut result = Vec::with_capacity(lines.len());
        for line in lines {
            // The newline-aware syntax set expects each line terminated.
            let terminated = format!("{line}\n");
            let segments = highlighter.highlight_line(&terminated, &self.syntax_set)?;
            let spans = segments
                .into_iter()
                .map(|(style, text)| HighlightSpan {
                    content: text.trim_end_matches('\n').to_string(),
                    style: convert_style(style),
                })
                .filter(|span| !span.content.is_empty())
                .collect();
            result.push(HighlightLine { spans });
        }
        Ok(result)
    }

    fn syntax_for_name(&self, file_name: &str) -> Option<&SyntaxReference> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        self.syntax_set.find_syntax_by_extension(extension)
    }

    fn resolve_theme<'a>(&'a self, requested: &'a str) -> Option<ResolvedTheme<'a>> {
        if let Some(theme) = self.theme_set.themes.get(requested) {
            return Some(ResolvedTheme {
                name: Cow::Borrowed(requested),
                theme,
            });
        }

        if let Some((name, theme)) = self
            .theme_set
            .themes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(requested))
        {
            return Some(ResolvedTheme {
                name: Cow::Borrowed(name.as_str()),
                theme,
            });
        }

        let (name, theme) = self
            .theme_set
            .themes
            .get_key_value(DEFAULT_THEME)
            .or_else(|| self.theme_set.themes.iter().next())?;
        tracing::warn!(requested, fallback = %name, "theme not found");
        Some(ResolvedTheme {
            name: Cow::Borrowed(name.as_str()),
            theme,
        })
    }
}

#[derive(Debug, Clone)]
struct ResolvedTheme<'a> {
    name: Cow<'a, str>,
    theme: &'a Theme,
}

fn convert_style(style: SyntectStyle) -> HighlightStyle {
    let attributes = HighlightAttributes {
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
        underline: style.font_style.contains(FontStyle::UNDERLINE),
    };

    HighlightStyle {
        foreground: convert_color(style.foreground),
        background: convert_color(style.background),
        attributes,
    }
}

fn convert_color(color: syntect::highlighting::Color) -> Option<RgbColor> {
    if color.a == 0 {
        None
    } else {
        Some(RgbColor {
            r: color.r,
            g: color.g,
            b: color.b,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_available() {
        let highlighter = Highlighter::new();
        assert!(
            highlighter
                .available_themes()
                .iter()
                .any(|theme| theme == DEFAULT_THEME)
        );
    }

    #[test]
    fn highlights_csharp_by_file_name() {
        let highlighter = Highlighter::new();
        let lines = vec![
            "class Cart".to_string(),
            "{".to_string(),
            "    void Add() { /* logic hidden */ }".to_string(),
            "}".to_string(),
        ];
        let result = highlighter.highlight("Cart.cs", &lines, DEFAULT_THEME);

        assert_eq!(result.mode, HighlightMode::Highlighted);
        assert_eq!(result.lines.len(), 4);
        assert!(result.lines[0].spans.len() > 1);
        let text: String = result.lines[2]
            .spans
            .iter()
            .map(|span| span.content.as_str())
            .collect();
        assert_eq!(text, lines[2]);
    }

    #[test]
    fn unknown_extension_is_plain() {
        let highlighter = Highlighter::new();
        let lines = vec!["plain text".to_string()];
        let result = highlighter.highlight("notes.unknownext", &lines, DEFAULT_THEME);
        assert_eq!(result.mode, HighlightMode::Plain);
        assert_eq!(result.lines[0].spans[0].content, "plain text");
    }

    #[test]
    fn unknown_theme_falls_back() {
        let highlighter = Highlighter::new();
        let lines = vec!["class A {}".to_string()];
        let result = highlighter.highlight("A.cs", &lines, "not-a-theme");
        assert_eq!(result.mode, HighlightMode::Highlighted);
        assert_eq!(result.theme, DEFAULT_THEME);
    }
}
