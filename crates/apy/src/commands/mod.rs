//! Command implementations for apy CLI.

pub mod build;
pub mod grammar;
