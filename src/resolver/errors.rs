//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during option or dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("duplicate option `{option}`")]
    DuplicateOption { option: String },

    #[error("unknown option `{option}`")]
    UnknownOption {
        option: String,
        available: Vec<String>,
    },

    #[error("invalid value `{value}` for option `{option}`")]
    InvalidValue {
        option: String,
        value: String,
        accepted: Vec<String>,
    },

    #[error("options `{first}` and `{second}` cannot be combined")]
    OptionConflict { first: String, second: String },

    #[error("option `{requirer}` requires `{required}`, which is disabled")]
    UnsatisfiedRequirement { requirer: String, required: String },

    #[error("cycle detected in option requirements")]
    CyclicRequirement { cycle: Vec<String> },

    #[error("dependency `{name}` is not installed")]
    MissingDependency { name: String, required_by: Vec<String> },

    #[error("dependencies `{first}` and `{second}` both provide `{capability}`")]
    DependencyConflict {
        capability: String,
        first: String,
        second: String,
    },

    #[error("cycle detected in dependency requirements")]
    DependencyCycle { cycle: Vec<String> },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::DuplicateOption { option } => {
                Diagnostic::error(format!("option `{}` is registered twice", option))
                    .with_suggestion("Remove or rename one of the duplicate option declarations")
            }

            ResolveError::UnknownOption { option, available } => {
                let mut diag =
                    Diagnostic::error(format!("this recipe has no option named `{}`", option));

                if !available.is_empty() {
                    diag = diag.with_context(format!(
                        "declared options: {}",
                        available.join(", ")
                    ));
                }

                diag.with_suggestion(suggestions::UNKNOWN_OPTION)
            }

            ResolveError::InvalidValue {
                option,
                value,
                accepted,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "option `{}` does not accept the value `{}`",
                    option, value
                ));

                if !accepted.is_empty() {
                    diag = diag.with_context(format!(
                        "accepted values: {}",
                        accepted.join(", ")
                    ));
                }

                diag
            }

            ResolveError::OptionConflict { first, second } => {
                Diagnostic::error(format!(
                    "options `{}` and `{}` cannot be combined",
                    first, second
                ))
                .with_context(format!("`{}` declares a conflict with `{}`", first, second))
                .with_suggestion(format!("Drop `--with {}`", first))
                .with_suggestion(format!("Drop `--with {}`", second))
            }

            ResolveError::UnsatisfiedRequirement { requirer, required } => {
                Diagnostic::error(format!(
                    "option `{}` requires `{}`, which was explicitly disabled",
                    requirer, required
                ))
                .with_suggestion(format!("Remove the `--with {}=false` override", required))
                .with_suggestion(format!("Disable `{}` as well", requirer))
            }

            ResolveError::CyclicRequirement { cycle } => {
                Diagnostic::error("cycle detected in option requirements")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing one of the `requires` edges".to_string(),
                    )
            }

            ResolveError::MissingDependency { name, required_by } => {
                let mut diag = Diagnostic::error(format!(
                    "dependency `{}` is not in the install catalog",
                    name
                ));

                for source in required_by {
                    diag = diag.with_context(format!("required by {}", source));
                }

                diag.with_suggestion(suggestions::MISSING_DEPENDENCY)
            }

            ResolveError::DependencyConflict {
                capability,
                first,
                second,
            } => Diagnostic::error(format!(
                "dependencies `{}` and `{}` both provide the `{}` capability",
                first, second, capability
            ))
            .with_context("only one provider of a capability can be linked at once".to_string())
            .with_suggestion(suggestions::CAPABILITY_CONFLICT),

            ResolveError::DependencyCycle { cycle } => {
                Diagnostic::error("cycle detected in dependency requirements")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing one of the `requires` edges".to_string(),
                    )
            }
        }
    }
}
