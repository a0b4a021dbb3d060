//! Pure planning stages: templates, flags, patches, environment.

pub mod env;
pub mod errors;
pub mod flags;
pub mod patches;
pub mod template;

pub use env::compose_environment;
pub use errors::PlanError;
pub use flags::assemble_flags;
pub use patches::{plan_patches, PatchOperation};
pub use template::TemplateContext;
