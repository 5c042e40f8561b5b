//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no file is open")]
    NoOpenFile,
    #[error("the displayed text is empty")]
    EmptyDisplay,
    #[error("file '{0}' is not part of the project")]
    UnknownFile(String),
}
