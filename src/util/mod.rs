//! Shared utilities: diagnostics and hashing.

pub mod diagnostic;
pub mod hash;
