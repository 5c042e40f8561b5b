//! Domain types shared by the redactor, exporter and UI.

pub mod errors;
pub mod model;
pub mod syntax;
