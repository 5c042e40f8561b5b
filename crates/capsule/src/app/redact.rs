//! Source redaction: collapse hidden classes and blank hidden method bodies.

use std::ops::Range;

use crate::domain::model::HiddenNames;
use crate::domain::syntax::{ClassDecl, Decl, MethodDecl, ParsedSource};
use crate::infra::config::Config;

/// Comment texts inserted in place of removed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub method: String,
    pub class: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            method: "logic hidden".into(),
            class: "whole class collapsed".into(),
        }
    }
}

/// Renders a [`ParsedSource`] with hidden declarations replaced by placeholders.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    placeholders: Placeholders,
}

impl Redactor {
    pub fn new(placeholders: Placeholders) -> Self {
        Self { placeholders }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Placeholders {
            method: config.redaction.method_placeholder.clone(),
            class: config.redaction.class_placeholder.clone(),
        })
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Produce the redacted text. The source is never modified, so calling this repeatedly with
    /// different name sets always starts from the original file.
    pub fn redact(&self, source: &ParsedSource, hidden: &HiddenNames) -> String {
        let text = source.text();
        let mut out = String::with_capacity(text.len());
        self.render_range(text, source.decls(), 0..text.len(), hidden, &mut out);
        out
    }

    fn render_range(
        &self,
        text: &str,
        decls: &[Decl],
        range: Range<usize>,
        hidden: &HiddenNames,
        out: &mut String,
    ) {
        let mut cursor = range.start;
        for decl in decls {
            let span = decl.span();
            out.push_str(&text[cursor..span.start]);
            match decl {
                Decl::Class(class) => self.render_class(text, class, hidden, out),
                Decl::Method(method) => self.render_method(text, method, hidden, out),
            }
            cursor = span.end;
        }
        out.push_str(&text[cursor..range.end]);
    }

    fn render_class(&self, text: &str, class: &ClassDecl, hidden: &HiddenNames, out: &mut String) {
        let Some(body) = &class.body else {
            out.push_str(&text[class.span.clone()]);
            return;
        };

        if !hidden.is_class_hidden(&class.name) {
            self.render_range(text, &body.members, class.span.clone(), hidden, out);
            return;
        }

        let indent = line_indent(text, body.inner.end);
        out.push_str(&text[class.span.start..body.inner.start]);
        out.push('\n');
        out.push_str(indent);
        out.push_str("    /* ");
        out.push_str(&self.placeholders.class);
        out.push_str(" */\n");
        out.push_str(indent);
        out.push_str(&text[body.inner.end..class.span.end]);
    }

    fn render_method(
        &self,
        text: &str,
        method: &MethodDecl,
        hidden: &HiddenNames,
        out: &mut String,
    ) {
        match &method.body {
            Some(body) if hidden.is_method_hidden(&method.name) => {
                out.push_str(&text[method.span.start..body.span.start]);
                out.push_str("{ /* ");
                out.push_str(&self.placeholders.method);
                out.push_str(" */ }");
                out.push_str(&text[body.span.end..method.span.end]);
            }
            _ => out.push_str(&text[method.span.clone()]),
        }
    }
}

/// Leading whitespace of the line containing `offset`, when only whitespace precedes it.
fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = text[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let prefix = &text[line_start..offset];
    if prefix.chars().all(|ch| ch == ' ' || ch == '\t') {
        prefix
    } else {
        ""
    }
}
