//! Core data model: recipes, options, rules, dependencies, catalogs.

pub mod catalog;
pub mod dependency;
pub mod option;
pub mod platform;
pub mod recipe;
pub mod rules;
pub mod selection;

pub use catalog::{CatalogEntry, DependencyCatalog, ResolvedDependencySet};
pub use dependency::{DependencyKind, DependencySpec, InstallPaths, ResolvedDependency};
pub use option::{OptionKind, OptionSpec, OptionValue};
pub use platform::Platform;
pub use recipe::{Recipe, RecipeMetadata, RECIPE_NAME};
pub use rules::{EnvRule, FlagRule, PatchAction, PatchRule, When};
pub use selection::SelectionSet;
