//! Option and dependency resolution.

pub mod deps;
pub mod errors;
pub mod registry;

pub use deps::resolve_dependencies;
pub use errors::ResolveError;
pub use registry::OptionRegistry;
