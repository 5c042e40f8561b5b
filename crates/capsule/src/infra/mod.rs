//! Infrastructure adapters for parsing, config, highlighting, and the clipboard.

pub mod clipboard;
pub mod config;
pub mod highlight;
pub mod parser;
