//! Application layer orchestrating domain logic and infrastructure.

pub mod export;
pub mod preview;
pub mod redact;
pub mod scan;
pub mod session;
