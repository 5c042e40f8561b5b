//! C# parsing built on tree-sitter.
//!
//! The concrete syntax tree is walked once and lowered into the owned [`ParsedSource`] model; the
//! tree-sitter tree itself is dropped afterwards.

use std::fmt;
use std::ops::Range;

use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::domain::syntax::{
    BodyForm, ClassBody, ClassDecl, ClassKind, Decl, MethodBody, MethodDecl, ParsedSource,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the C# grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser returned no tree")]
    Cancelled,
}

/// Reusable parser for C# source files.
pub struct CSharpParser {
    parser: Parser,
}

impl fmt::Debug for CSharpParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CSharpParser").finish_non_exhaustive()
    }
}

impl CSharpParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse `text` into a declaration tree. Syntax errors never fail the parse; malformed regions
    /// simply contribute no declarations.
    pub fn parse(&mut self, text: impl Into<String>) -> Result<ParsedSource, ParseError> {
        let text = text.into();
        let tree = self
            .parser
            .parse(&text, None)
            .ok_or(ParseError::Cancelled)?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("source contains syntax errors; outline may be partial");
        }

        let mut decls = Vec::new();
        collect_decls(root, &text, &mut decls);
        tracing::debug!(declarations = decls.len(), "parsed source");
        Ok(ParsedSource::new(text, decls))
    }
}

fn collect_decls(node: Node<'_>, text: &str, out: &mut Vec<Decl>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(kind) = class_kind(child.kind()) {
            out.push(Decl::Class(lower_class(child, kind, text)));
        } else if child.kind() == "method_declaration" {
            out.push(Decl::Method(lower_method(child, text)));
        } else {
            collect_decls(child, text, out);
        }
    }
}

fn class_kind(kind: &str) -> Option<ClassKind> {
    match kind {
        "class_declaration" => Some(ClassKind::Class),
        "struct_declaration" => Some(ClassKind::Struct),
        "interface_declaration" => Some(ClassKind::Interface),
        "record_declaration" | "record_struct_declaration" => Some(ClassKind::Record),
        _ => None,
    }
}

fn lower_class(node: Node<'_>, kind: ClassKind, text: &str) -> ClassDecl {
    let body = find_child(node, "declaration_list").map(|list| {
        let mut members = Vec::new();
        collect_decls(list, text, &mut members);
        ClassBody {
            inner: brace_interior(list),
            members,
        }
    });

    ClassDecl {
        name: field_text(node, &["name"], text),
        kind,
        span: node.byte_range(),
        body,
    }
}

fn lower_method(node: Node<'_>, text: &str) -> MethodDecl {
    let mut body = None;
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    for (index, child) in children.iter().enumerate() {
        match child.kind() {
            "block" => {
                body = Some(MethodBody {
                    span: child.byte_range(),
                    form: BodyForm::Block,
                });
                break;
            }
            "arrow_expression_clause" => {
                let end = children
                    .get(index + 1)
                    .filter(|next| next.kind() == ";")
                    .map_or(child.end_byte(), |semicolon| semicolon.end_byte());
                body = Some(MethodBody {
                    span: child.start_byte()..end,
                    form: BodyForm::Expression,
                });
                break;
            }
            _ => {}
        }
    }

    MethodDecl {
        name: field_text(node, &["name"], text),
        // Older grammar releases label the return type `type` instead of `returns`.
        return_type: field_text(node, &["returns", "type"], text),
        span: node.byte_range(),
        body,
    }
}

fn find_child<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Range between the opening and closing brace of a declaration list.
fn brace_interior(list: Node<'_>) -> Range<usize> {
    let mut start = list.start_byte();
    let mut end = list.end_byte();
    let mut cursor = list.walk();
    for child in list.children(&mut cursor) {
        match child.kind() {
            "{" => start = child.end_byte(),
            "}" => end = child.start_byte(),
            _ => {}
        }
    }
    start..end.max(start)
}

fn field_text(node: Node<'_>, fields: &[&str], text: &str) -> String {
    fields
        .iter()
        .find_map(|field| node.child_by_field_name(field))
        .and_then(|child| text.get(child.byte_range()))
        .unwrap_or_default()
        .to_owned()
}
