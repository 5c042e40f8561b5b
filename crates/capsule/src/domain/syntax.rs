//! Owned declaration tree of a parsed source file.
//!
//! Only the constructs the redactor cares about are modelled. Everything between declaration
//! spans is plain source text and is always emitted verbatim.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Original file text together with the declarations found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    text: String,
    decls: Vec<Decl>,
}

impl ParsedSource {
    /// Declarations must be ordered, non-overlapping, and lie within `text`.
    pub fn new(text: String, decls: Vec<Decl>) -> Self {
        Self { text, decls }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    /// Flatten the tree into navigator rows: every class in document order, each followed by the
    /// methods declared directly in its body.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        collect_outline(&self.decls, 0, &mut entries);
        entries
    }
}

/// A construct the redactor can rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Class(ClassDecl),
    Method(MethodDecl),
}

impl Decl {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Decl::Class(class) => &class.span,
            Decl::Method(method) => &method.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Struct,
    Interface,
    Record,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Struct => "struct",
            ClassKind::Interface => "interface",
            ClassKind::Record => "record",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub kind: ClassKind,
    /// Whole declaration including attributes and modifiers.
    pub span: Range<usize>,
    /// `None` for positional records declared without braces.
    pub body: Option<ClassBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBody {
    /// Text strictly between `{` and `}`.
    pub inner: Range<usize>,
    pub members: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: String,
    pub span: Range<usize>,
    /// `None` for abstract, interface, extern and partial declarations.
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// For [`BodyForm::Expression`] the span runs from `=>` through the terminating `;`.
    pub span: Range<usize>,
    pub form: BodyForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyForm {
    Block,
    Expression,
}

/// One row of the structure navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutlineEntry {
    Class {
        name: String,
        kind: ClassKind,
        depth: usize,
    },
    Method {
        name: String,
        return_type: String,
        class: String,
    },
}

impl OutlineEntry {
    pub fn name(&self) -> &str {
        match self {
            OutlineEntry::Class { name, .. } | OutlineEntry::Method { name, .. } => name,
        }
    }

    /// Text shown next to the checkbox.
    pub fn label(&self) -> String {
        match self {
            OutlineEntry::Class { name, kind, .. } => format!("{kind} {name}"),
            OutlineEntry::Method {
                name, return_type, ..
            } => format!("{return_type} {name}()"),
        }
    }
}

fn collect_outline(decls: &[Decl], depth: usize, out: &mut Vec<OutlineEntry>) {
    for decl in decls {
        let Decl::Class(class) = decl else {
            continue;
        };
        out.push(OutlineEntry::Class {
            name: class.name.clone(),
            kind: class.kind,
            depth,
        });

        let Some(body) = &class.body else {
            continue;
        };
        for member in &body.members {
            if let Decl::Method(method) = member {
                out.push(OutlineEntry::Method {
                    name: method.name.clone(),
                    return_type: method.return_type.clone(),
                    class: class.name.clone(),
                });
            }
        }
        collect_outline(&body.members, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, span: Range<usize>) -> Decl {
        Decl::Method(MethodDecl {
            name: name.into(),
            return_type: "void".into(),
            span,
            body: None,
        })
    }

    #[test]
    fn outline_lists_classes_then_direct_methods() {
        let inner = Decl::Class(ClassDecl {
            name: "Inner".into(),
            kind: ClassKind::Struct,
            span: 30..60,
            body: Some(ClassBody {
                inner: 45..59,
                members: vec![method("Nested", 46..58)],
            }),
        });
        let outer = Decl::Class(ClassDecl {
            name: "Outer".into(),
            kind: ClassKind::Class,
            span: 0..80,
            body: Some(ClassBody {
                inner: 12..79,
                members: vec![method("Run", 13..29), inner, method("Stop", 61..78)],
            }),
        });
        let source = ParsedSource::new(" ".repeat(80), vec![outer]);

        let labels: Vec<_> = source.outline().iter().map(OutlineEntry::label).collect();
        assert_eq!(
            labels,
            [
                "class Outer",
                "void Run()",
                "void Stop()",
                "struct Inner",
                "void Nested()"
            ]
        );
    }
}
