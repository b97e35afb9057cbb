//! CLI command implementations.

pub mod check;
pub mod partition;
pub mod render;
