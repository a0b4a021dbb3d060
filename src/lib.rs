//! Rigging - a declarative build-configuration resolver for packaged
//! software.
//!
//! This crate provides the core library functionality for Rigging:
//! option resolution, dependency-set computation, and build planning
//! (flags, patches, launcher environment).

pub mod core;
pub mod ops;
pub mod planner;
pub mod resolver;
pub mod util;

pub use core::{
    catalog::DependencyCatalog, platform::Platform, recipe::Recipe, selection::SelectionSet,
};

pub use ops::{configure, BuildConfig, ConfigureOptions};
pub use planner::PlanError;
pub use resolver::ResolveError;
