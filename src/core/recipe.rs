//! Rigging.toml recipe parsing and schema.
//!
//! A recipe is the whole declarative description of one package build:
//! its options, dependency contributions, and the flag/patch/env rule
//! tables. Recipes are validated on load so that every later stage can
//! assume internally consistent references.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::dependency::DependencySpec;
use crate::core::option::{OptionKind, OptionSpec};
use crate::core::rules::{EnvRule, FlagRule, PatchRule, When};

/// Canonical recipe filename.
pub const RECIPE_NAME: &str = "Rigging.toml";

/// Recipe metadata from the `[recipe]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeMetadata {
    /// Package name this recipe builds.
    pub name: String,

    /// Upstream version being built.
    pub version: Version,

    /// One-line description.
    #[serde(default)]
    pub description: Option<String>,

    /// Upstream homepage.
    #[serde(default)]
    pub homepage: Option<String>,
}

/// On-disk recipe schema.
#[derive(Debug, Clone, Deserialize)]
struct RecipeSchema {
    recipe: RecipeMetadata,

    #[serde(default)]
    options: BTreeMap<String, OptionSpec>,

    #[serde(default)]
    dependencies: BTreeMap<String, DependencySpec>,

    #[serde(default)]
    flags: Vec<FlagRule>,

    #[serde(default)]
    patches: Vec<PatchRule>,

    #[serde(default)]
    env: Vec<EnvRule>,
}

/// A loaded, validated recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// `[recipe]` metadata.
    pub meta: RecipeMetadata,

    /// Declared options, keyed by name.
    options: BTreeMap<String, OptionSpec>,

    /// Declared dependency contributions, keyed by name.
    dependencies: BTreeMap<String, DependencySpec>,

    /// Flag rules in declaration order.
    pub flags: Vec<FlagRule>,

    /// Patch rules in declaration order.
    pub patches: Vec<PatchRule>,

    /// Env rules in declaration order.
    pub env: Vec<EnvRule>,
}

impl Recipe {
    /// Load and validate a recipe from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid recipe: {}", path.display()))
    }

    /// Parse and validate a recipe from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut schema: RecipeSchema =
            toml::from_str(text).context("failed to parse recipe TOML")?;

        // Table keys become the authoritative names.
        for (name, opt) in schema.options.iter_mut() {
            opt.name = name.clone();
        }
        for (name, dep) in schema.dependencies.iter_mut() {
            dep.name = name.clone();
        }

        let recipe = Recipe {
            meta: schema.recipe,
            options: schema.options,
            dependencies: schema.dependencies,
            flags: schema.flags,
            patches: schema.patches,
            env: schema.env,
        };
        recipe.validate()?;
        Ok(recipe)
    }

    /// Get an option spec by name.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    /// Iterate over option specs in name order.
    pub fn options(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.values()
    }

    /// Get a dependency spec by name.
    pub fn dependency(&self, name: &str) -> Option<&DependencySpec> {
        self.dependencies.get(name)
    }

    /// Iterate over dependency specs in name order.
    pub fn dependencies(&self) -> impl Iterator<Item = &DependencySpec> {
        self.dependencies.values()
    }

    /// Validate internal consistency. Collects every problem rather than
    /// stopping at the first, so a recipe author fixes one round of
    /// errors, not one error per round.
    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        for opt in self.options.values() {
            match opt.kind {
                OptionKind::Bool => {
                    if !opt.values.is_empty() {
                        problems.push(format!(
                            "option `{}` is a bool but declares `values`",
                            opt.name
                        ));
                    }
                    if let Some(default) = &opt.default {
                        if default.as_bool().is_none() {
                            problems.push(format!(
                                "option `{}` is a bool but its default is `{}`",
                                opt.name, default
                            ));
                        }
                    }
                }
                OptionKind::Enum => {
                    if opt.values.is_empty() {
                        problems.push(format!(
                            "enum option `{}` declares no `values`",
                            opt.name
                        ));
                    }
                    match &opt.default {
                        None => problems.push(format!(
                            "enum option `{}` must declare a default",
                            opt.name
                        )),
                        Some(default) => {
                            if !opt.accepts(default) {
                                problems.push(format!(
                                    "enum option `{}` default `{}` is not in its values",
                                    opt.name, default
                                ));
                            }
                        }
                    }
                }
            }

            for (relation, names) in [("conflicts", &opt.conflicts), ("requires", &opt.requires)] {
                for target in names {
                    match self.options.get(target) {
                        None => problems.push(format!(
                            "option `{}` {} unknown option `{}`",
                            opt.name, relation, target
                        )),
                        Some(t) if t.kind != OptionKind::Bool => problems.push(format!(
                            "option `{}` {} `{}`, which is not a bool option; \
                             enum alternatives belong in the enum's value set",
                            opt.name, relation, target
                        )),
                        Some(_) => {}
                    }
                }
            }
        }

        for dep in self.dependencies.values() {
            for req in &dep.requires {
                if !self.dependencies.contains_key(req) {
                    problems.push(format!(
                        "dependency `{}` requires undeclared dependency `{}`",
                        dep.name, req
                    ));
                }
            }
            if let Some(when) = &dep.when {
                self.check_trigger(when, &format!("dependency `{}`", dep.name), &mut problems);
            }
        }

        for (i, rule) in self.flags.iter().enumerate() {
            if let Some(when) = &rule.when {
                self.check_trigger(when, &format!("flag rule #{}", i + 1), &mut problems);
            }
            if rule.emit.is_empty() {
                problems.push(format!("flag rule #{} emits nothing", i + 1));
            }
        }

        for (i, rule) in self.patches.iter().enumerate() {
            if let Some(when) = &rule.when {
                self.check_trigger(when, &format!("patch rule #{}", i + 1), &mut problems);
            }
        }

        for (i, rule) in self.env.iter().enumerate() {
            if let Some(when) = &rule.when {
                self.check_trigger(when, &format!("env rule #{}", i + 1), &mut problems);
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            bail!("recipe validation failed:\n  - {}", problems.join("\n  - "));
        }
    }

    fn check_trigger(&self, when: &When, owner: &str, problems: &mut Vec<String>) {
        let name = when.option_name();
        match self.options.get(name) {
            None => {
                problems.push(format!("{} triggers on unknown option `{}`", owner, name));
            }
            Some(opt) => match when.required_value() {
                None => {
                    if opt.kind != OptionKind::Bool {
                        problems.push(format!(
                            "{} uses the short trigger form on enum option `{}`; \
                             spell out the value to match",
                            owner, name
                        ));
                    }
                }
                Some(value) => {
                    if !opt.accepts(value) {
                        problems.push(format!(
                            "{} triggers on `{} = {}`, which option `{}` never takes",
                            owner, name, value, name
                        ));
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[recipe]
name = "qgis"
version = "3.4.5"
description = "Open Source Geographic Information System"

[options.server]
kind = "bool"
default = false
requires = ["postgres"]
description = "Build the map server"

[options.postgres]
kind = "bool"
default = false

[options.oracle]
kind = "bool"
default = false
conflicts = ["postgres"]

[options.db-client]
kind = "enum"
default = "postgres"
values = ["postgres", "postgresql10"]

[dependencies.cmake]
kind = "build"

[dependencies.postgres]
capability = "database-client"
when = "postgres"

[[flags]]
emit = ["-DCMAKE_BUILD_TYPE=Release"]

[[flags]]
when = "server"
emit = ["-DWITH_SERVER=TRUE"]

[[patches]]
when = "server"
source = "patches/server.diff"
target = "src/server/CMakeLists.txt"
order = 10

[[env]]
when = "postgres"
variable = "PATH"
value = "${postgres.bin}"
prepend = true
"#;

    #[test]
    fn test_parse_sample() {
        let recipe = Recipe::parse(SAMPLE).unwrap();
        assert_eq!(recipe.meta.name, "qgis");
        assert_eq!(recipe.meta.version, "3.4.5".parse().unwrap());
        assert_eq!(recipe.options().count(), 4);
        assert_eq!(recipe.dependencies().count(), 2);
        assert_eq!(recipe.flags.len(), 2);
        assert_eq!(recipe.patches.len(), 1);
        assert_eq!(recipe.env.len(), 1);

        let server = recipe.option("server").unwrap();
        assert_eq!(server.requires, vec!["postgres"]);
        assert_eq!(server.name, "server");
    }

    #[test]
    fn test_unknown_trigger_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[[flags]]
when = "nonexistent"
emit = ["-DX=1"]
"#;
        let err = Recipe::parse(text).unwrap_err();
        assert!(err.to_string().contains("unknown option `nonexistent`"));
    }

    #[test]
    fn test_enum_requires_value_in_trigger() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[options.db]
kind = "enum"
default = "a"
values = ["a", "b"]

[[flags]]
when = "db"
emit = ["-DX=1"]
"#;
        let err = Recipe::parse(text).unwrap_err();
        assert!(err.to_string().contains("short trigger form on enum option"));
    }

    #[test]
    fn test_enum_default_outside_values_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[options.db]
kind = "enum"
default = "c"
values = ["a", "b"]
"#;
        let err = Recipe::parse(text).unwrap_err();
        assert!(err.to_string().contains("not in its values"));
    }

    #[test]
    fn test_requires_on_enum_target_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[options.db]
kind = "enum"
default = "a"
values = ["a"]

[options.server]
requires = ["db"]
"#;
        let err = Recipe::parse(text).unwrap_err();
        assert!(err.to_string().contains("not a bool option"));
    }

    #[test]
    fn test_undeclared_dep_requirement_rejected() {
        let text = r#"
[recipe]
name = "demo"
version = "1.0.0"

[dependencies.postgres]
requires = ["openssl"]
"#;
        let err = Recipe::parse(text).unwrap_err();
        assert!(err
            .to_string()
            .contains("requires undeclared dependency `openssl`"));
    }
}
