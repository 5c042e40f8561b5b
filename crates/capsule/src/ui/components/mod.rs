//! Collection of reusable TUI components.

pub mod file_list;
pub mod navigator;
pub mod preview;
pub mod prompt;
pub mod staging;
