//! Flag assembler.
//!
//! Walks the recipe's flag rules in declaration order, keeps the ones
//! whose trigger matches the selection, and expands their templates.
//! The output is byte-stable for a given selection, catalog, and
//! platform: rules fire in recipe order no matter how the caller
//! spelled their overrides.

use tracing::trace;

use crate::core::recipe::Recipe;
use crate::core::selection::SelectionSet;
use crate::planner::errors::PlanError;
use crate::planner::template::TemplateContext;

/// Assemble the build-flag list for one resolved selection.
pub fn assemble_flags(
    recipe: &Recipe,
    selection: &SelectionSet,
    ctx: &TemplateContext<'_>,
) -> Result<Vec<String>, PlanError> {
    let mut flags = Vec::new();
    for rule in &recipe.flags {
        if let Some(when) = &rule.when {
            if !when.matches(selection) {
                continue;
            }
        }
        for template in &rule.emit {
            let flag = ctx.render(template)?;
            trace!(%flag, "emitting flag");
            flags.push(flag);
        }
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DependencyCatalog;
    use crate::core::platform::Platform;
    use crate::resolver::{resolve_dependencies, OptionRegistry};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    const RECIPE: &str = r#"
[recipe]
name = "qgis"
version = "3.4.5"

[options.server]
default = false

[options.postgres]
default = false

[options.db-client]
kind = "enum"
default = "postgres"
values = ["postgres", "postgresql10"]

[dependencies.postgres]
when = "postgres"

[[flags]]
emit = ["-DCMAKE_BUILD_TYPE=Release", "-DCMAKE_INSTALL_PREFIX=${install_root}"]

[[flags]]
when = "server"
emit = ["-DWITH_SERVER=TRUE"]

[[flags]]
when = "postgres"
emit = ["-DPOSTGRES_LIBRARY=${postgres.lib}/libpq.${libext}"]

[[flags]]
when = { option = "db-client", value = "postgresql10" }
emit = ["-DPOSTGRES_PREFIX=${postgres.prefix}"]
"#;

    fn flags_for(enabled: &[&str]) -> Vec<String> {
        let recipe = crate::core::recipe::Recipe::parse(RECIPE).unwrap();
        let registry = OptionRegistry::from_recipe(&recipe).unwrap();
        let overrides: BTreeMap<_, _> = enabled
            .iter()
            .map(|n| (n.to_string(), true.into()))
            .collect();
        let selection = registry.resolve(&overrides).unwrap();

        let mut catalog = DependencyCatalog::new();
        catalog.insert_prefix("postgres", "/opt/pg");
        let deps = resolve_dependencies(&recipe, &selection, &catalog).unwrap();

        let root = PathBuf::from("/opt/qgis");
        let platform = Platform::for_os("linux");
        let ctx = TemplateContext::new(&deps, &root, &platform);
        assemble_flags(&recipe, &selection, &ctx).unwrap()
    }

    #[test]
    fn test_unconditional_flags_always_emitted() {
        let flags = flags_for(&[]);
        assert_eq!(
            flags,
            vec![
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_INSTALL_PREFIX=/opt/qgis",
            ]
        );
    }

    #[test]
    fn test_triggered_flags_in_declaration_order() {
        let flags = flags_for(&["postgres", "server"]);
        assert_eq!(
            flags,
            vec![
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_INSTALL_PREFIX=/opt/qgis",
                "-DWITH_SERVER=TRUE",
                "-DPOSTGRES_LIBRARY=/opt/pg/lib/libpq.so",
            ]
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(flags_for(&["server", "postgres"]), flags_for(&["postgres", "server"]));
    }

    #[test]
    fn test_disabled_rules_leave_no_trace() {
        let flags = flags_for(&[]);
        assert!(!flags.iter().any(|f| f.contains("WITH_SERVER")));
        assert!(!flags.iter().any(|f| f.contains("POSTGRES")));
    }
}
