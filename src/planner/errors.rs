//! Planning error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while turning a resolved selection into a build plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot resolve `{placeholder}` in `{template}`")]
    TemplateResolution {
        placeholder: String,
        template: String,
        reason: String,
    },

    #[error("patch ordering violation for `{target}`")]
    PatchOrdering {
        target: String,
        add_order: i64,
        edit_order: i64,
    },

    #[error("environment variable `{variable}` references itself")]
    CircularPathReference { variable: String },

    #[error("conflicting values for environment variable `{variable}`")]
    ConflictingEnvValue {
        variable: String,
        first: String,
        second: String,
    },
}

impl PlanError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PlanError::TemplateResolution {
                placeholder,
                template,
                reason,
            } => Diagnostic::error(format!(
                "cannot resolve `{}` in template `{}`",
                placeholder, template
            ))
            .with_context(reason.clone())
            .with_suggestion(suggestions::BAD_TEMPLATE),

            PlanError::PatchOrdering {
                target,
                add_order,
                edit_order,
            } => Diagnostic::error(format!(
                "patch for `{}` edits a file before the patch that adds it",
                target
            ))
            .with_context(format!(
                "add runs at order {}, edit at order {}",
                add_order, edit_order
            ))
            .with_suggestion("Lower the `order` of the add rule below the edit rule".to_string()),

            PlanError::CircularPathReference { variable } => Diagnostic::error(format!(
                "environment variable `{}` references itself through `${{env:{}}}`",
                variable, variable
            ))
            .with_suggestion(
                "Reference a different variable, or drop the self-reference".to_string(),
            ),

            PlanError::ConflictingEnvValue {
                variable,
                first,
                second,
            } => Diagnostic::error(format!(
                "environment variable `{}` is set to two different values",
                variable
            ))
            .with_context(format!("first: {}", first))
            .with_context(format!("second: {}", second))
            .with_suggestion(
                "Mark the rules `prepend = true` to combine them as a path list".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_ordering_diagnostic() {
        let err = PlanError::PatchOrdering {
            target: "src/app/main.cpp".to_string(),
            add_order: 20,
            edit_order: 10,
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("src/app/main.cpp"));
        assert!(output.contains("add runs at order 20"));
    }

    #[test]
    fn test_circular_reference_diagnostic() {
        let err = PlanError::CircularPathReference {
            variable: "PYTHONPATH".to_string(),
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("PYTHONPATH"));
        assert!(output.contains("references itself"));
    }
}
