//! Environment composer.
//!
//! Builds the launcher environment block: scalar variables plus
//! PATH-style prepend lists. List composition is idempotent: a segment
//! contributed twice appears once, first occurrence winning, so
//! regenerating a launcher never grows its search paths.

use std::collections::BTreeMap;

use tracing::trace;

use crate::core::recipe::Recipe;
use crate::core::selection::SelectionSet;
use crate::planner::errors::PlanError;
use crate::planner::template::{env_references, TemplateContext};

enum Contribution {
    Scalar(String),
    List(Vec<String>),
}

/// Compose the environment block for one resolved selection.
///
/// Returned in variable name order; list variables are joined with the
/// platform's search-path separator.
pub fn compose_environment(
    recipe: &Recipe,
    selection: &SelectionSet,
    ctx: &TemplateContext<'_>,
) -> Result<BTreeMap<String, String>, PlanError> {
    let mut vars: BTreeMap<String, Contribution> = BTreeMap::new();

    for rule in &recipe.env {
        if let Some(when) = &rule.when {
            if !when.matches(selection) {
                continue;
            }
        }

        // A scalar that references itself has no prior value to read.
        // Prepend lists are different: `${env:PATH}` as a list segment is
        // the launcher's late-bound tail and is expected.
        if !rule.prepend && env_references(&rule.value).contains(&rule.variable.as_str()) {
            return Err(PlanError::CircularPathReference {
                variable: rule.variable.clone(),
            });
        }

        let value = ctx.render(&rule.value)?;
        trace!(variable = %rule.variable, %value, prepend = rule.prepend, "env contribution");

        match vars.get_mut(&rule.variable) {
            None => {
                let contribution = if rule.prepend {
                    Contribution::List(vec![value])
                } else {
                    Contribution::Scalar(value)
                };
                vars.insert(rule.variable.clone(), contribution);
            }
            Some(Contribution::List(segments)) if rule.prepend => {
                if !segments.contains(&value) {
                    segments.push(value);
                }
            }
            Some(Contribution::Scalar(first)) if !rule.prepend => {
                // Re-stating the same scalar is harmless; disagreeing
                // is an authoring error.
                if first != &value {
                    return Err(PlanError::ConflictingEnvValue {
                        variable: rule.variable.clone(),
                        first: first.clone(),
                        second: value,
                    });
                }
            }
            Some(existing) => {
                let first = match existing {
                    Contribution::Scalar(s) => s.clone(),
                    Contribution::List(segments) => segments.join(", "),
                };
                return Err(PlanError::ConflictingEnvValue {
                    variable: rule.variable.clone(),
                    first,
                    second: value,
                });
            }
        }
    }

    let separator = ctx.platform.path_separator();
    let environment = vars
        .into_iter()
        .map(|(name, contribution)| {
            let value = match contribution {
                Contribution::Scalar(s) => s,
                Contribution::List(segments) => segments
                    .join(&separator.to_string()),
            };
            (name, value)
        })
        .collect();

    Ok(environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DependencyCatalog;
    use crate::core::platform::Platform;
    use crate::resolver::{resolve_dependencies, OptionRegistry};
    use std::path::PathBuf;

    fn compose(
        recipe_text: &str,
        enabled: &[&str],
    ) -> Result<BTreeMap<String, String>, PlanError> {
        let recipe = Recipe::parse(recipe_text).unwrap();
        let registry = OptionRegistry::from_recipe(&recipe).unwrap();
        let overrides: BTreeMap<_, _> = enabled
            .iter()
            .map(|n| (n.to_string(), true.into()))
            .collect();
        let selection = registry.resolve(&overrides).unwrap();

        let mut catalog = DependencyCatalog::new();
        catalog.insert_prefix("grass", "/opt/grass");
        catalog.insert_prefix("postgres", "/opt/pg");
        let deps = resolve_dependencies(&recipe, &selection, &catalog).unwrap();

        let root = PathBuf::from("/opt/qgis");
        let platform = Platform::for_os("linux");
        let ctx = TemplateContext::new(&deps, &root, &platform);
        compose_environment(&recipe, &selection, &ctx)
    }

    const RECIPE: &str = r#"
[recipe]
name = "qgis"
version = "3.4.5"

[options.grass]
default = false

[options.postgres]
default = false

[dependencies.grass]
when = "grass"

[dependencies.postgres]
when = "postgres"

[[env]]
variable = "QGIS_PREFIX_PATH"
value = "${install_root}"

[[env]]
when = "grass"
variable = "GRASS_PREFIX"
value = "${grass.prefix}"

[[env]]
when = "grass"
variable = "PATH"
value = "${grass.bin}"
prepend = true

[[env]]
when = "postgres"
variable = "PATH"
value = "${postgres.bin}"
prepend = true

[[env]]
variable = "PATH"
value = "${env:PATH}"
prepend = true
"#;

    #[test]
    fn test_scalar_and_list_composition() {
        let env = compose(RECIPE, &["grass", "postgres"]).unwrap();
        assert_eq!(env["QGIS_PREFIX_PATH"], "/opt/qgis");
        assert_eq!(env["GRASS_PREFIX"], "/opt/grass");
        assert_eq!(env["PATH"], "/opt/grass/bin:/opt/pg/bin:$PATH");
    }

    #[test]
    fn test_disabled_contributions_excluded() {
        let env = compose(RECIPE, &[]).unwrap();
        assert_eq!(env["PATH"], "$PATH");
        assert!(!env.contains_key("GRASS_PREFIX"));
    }

    #[test]
    fn test_duplicate_segments_dropped() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[dependencies.grass]

[[env]]
variable = "PATH"
value = "${grass.bin}"
prepend = true

[[env]]
variable = "PATH"
value = "${grass.bin}"
prepend = true
"#;
        let env = compose(text, &[]).unwrap();
        assert_eq!(env["PATH"], "/opt/grass/bin");
    }

    #[test]
    fn test_conflicting_scalars_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[[env]]
variable = "QT_PLUGIN_PATH"
value = "/opt/qt/plugins"

[[env]]
variable = "QT_PLUGIN_PATH"
value = "/opt/qt5/plugins"
"#;
        let err = compose(text, &[]).unwrap_err();
        match err {
            PlanError::ConflictingEnvValue {
                variable,
                first,
                second,
            } => {
                assert_eq!(variable, "QT_PLUGIN_PATH");
                assert_eq!(first, "/opt/qt/plugins");
                assert_eq!(second, "/opt/qt5/plugins");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_identical_scalar_restatement_allowed() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[[env]]
variable = "QGIS_PREFIX_PATH"
value = "${install_root}"

[[env]]
variable = "QGIS_PREFIX_PATH"
value = "${install_root}"
"#;
        let env = compose(text, &[]).unwrap();
        assert_eq!(env["QGIS_PREFIX_PATH"], "/opt/qgis");
    }

    #[test]
    fn test_prepend_tail_reference_allowed() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[dependencies.grass]

[[env]]
variable = "PATH"
value = "${grass.bin}"
prepend = true

[[env]]
variable = "PATH"
value = "${env:PATH}"
prepend = true
"#;
        let env = compose(text, &[]).unwrap();
        assert_eq!(env["PATH"], "/opt/grass/bin:$PATH");
    }

    #[test]
    fn test_self_reference_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[[env]]
variable = "PYTHONPATH"
value = "/opt/x:${env:PYTHONPATH}"
"#;
        let err = compose(text, &[]).unwrap_err();
        assert!(
            matches!(err, PlanError::CircularPathReference { variable } if variable == "PYTHONPATH")
        );
    }

    #[test]
    fn test_scalar_list_mix_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[[env]]
variable = "PATH"
value = "/opt/a"
prepend = true

[[env]]
variable = "PATH"
value = "/opt/b"
"#;
        assert!(matches!(
            compose(text, &[]),
            Err(PlanError::ConflictingEnvValue { .. })
        ));
    }
}
