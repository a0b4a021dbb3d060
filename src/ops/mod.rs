//! High-level operations.
//!
//! This module contains the implementation of Rigging commands.

pub mod configure;

pub use configure::{configure, BuildConfig, ConfigureError, ConfigureOptions};
