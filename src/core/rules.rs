//! Declarative rule tables: flag, patch, and environment rules.
//!
//! The source recipes this design replaces expressed option effects as
//! nested conditional branches; here every effect is a data row with a
//! `when` trigger, so new options are added by registering rules, not by
//! editing control flow.

use serde::{Deserialize, Serialize};

use crate::core::option::OptionValue;
use crate::core::selection::SelectionSet;

/// An option trigger shared by dependency contributions and all rules.
///
/// The short form names a bool option that must be enabled; the detailed
/// form matches an exact value (required for enum options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum When {
    /// Bool option that must be enabled: `when = "server"`.
    Enabled(String),

    /// Exact value match: `when = { option = "db-client", value = "postgres" }`.
    Equals {
        option: String,
        #[serde(default)]
        value: Option<OptionValue>,
    },
}

impl When {
    /// Trigger on a bool option being enabled.
    pub fn option(name: impl Into<String>) -> Self {
        When::Enabled(name.into())
    }

    /// Trigger on an option holding an exact value.
    pub fn value(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        When::Equals {
            option: name.into(),
            value: Some(value.into()),
        }
    }

    /// The option this trigger reads.
    pub fn option_name(&self) -> &str {
        match self {
            When::Enabled(name) => name,
            When::Equals { option, .. } => option,
        }
    }

    /// The exact value required, if any.
    pub fn required_value(&self) -> Option<&OptionValue> {
        match self {
            When::Enabled(_) => None,
            When::Equals { value, .. } => value.as_ref(),
        }
    }

    /// Evaluate the trigger against a selection.
    pub fn matches(&self, selection: &SelectionSet) -> bool {
        match self.required_value() {
            Some(value) => selection.has_value(self.option_name(), value),
            None => selection.is_enabled(self.option_name()),
        }
    }
}

/// A declarative build-flag rule.
///
/// Rules are evaluated in declaration order regardless of how the caller
/// specified overrides, which is what makes the assembled flag list
/// byte-stable for a given selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagRule {
    /// Option trigger; absent means the rule always fires.
    #[serde(default)]
    pub when: Option<When>,

    /// Flag templates emitted when the rule fires, in order.
    /// Templates may reference dependency paths (`${postgres.lib}`),
    /// `${install_root}`, and `${libext}`.
    pub emit: Vec<String>,
}

/// What a patch does to its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchAction {
    /// Stages a new file or tree at the target path.
    Add,
    /// Edits a file that must already exist (possibly added by an
    /// earlier patch).
    Edit,
}

/// A declarative source-patch rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRule {
    /// Option trigger; absent means the patch always applies.
    #[serde(default)]
    pub when: Option<When>,

    /// Patch source locator (diff file, staged resource).
    pub source: String,

    /// Path the patch touches, relative to the build tree.
    pub target: String,

    /// Application order. Lower runs first; ties keep declaration order.
    #[serde(default)]
    pub order: i64,

    /// Add vs edit, used to validate ordering between rules that touch
    /// the same target.
    #[serde(default = "default_patch_action")]
    pub action: PatchAction,
}

fn default_patch_action() -> PatchAction {
    PatchAction::Edit
}

/// A declarative environment-variable rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvRule {
    /// Option trigger; absent means the rule always contributes.
    #[serde(default)]
    pub when: Option<When>,

    /// Variable name (`PATH`, `PYTHONPATH`, `GRASS_PREFIX`, ...).
    pub variable: String,

    /// Value template; same placeholder syntax as flag rules, plus
    /// `${env:VAR}` which renders as a literal `$VAR` reference for the
    /// launcher script to expand.
    pub value: String,

    /// When true, the value is one segment of a first-match-wins path
    /// list; earlier-declared contributions take precedence and
    /// duplicates are dropped. When false, the rule sets a scalar value.
    #[serde(default)]
    pub prepend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn selection() -> SelectionSet {
        let mut values = BTreeMap::new();
        values.insert("server".to_string(), OptionValue::Bool(true));
        values.insert("grass".to_string(), OptionValue::Bool(false));
        values.insert(
            "db-client".to_string(),
            OptionValue::Choice("postgres".to_string()),
        );
        SelectionSet::new(values)
    }

    #[test]
    fn test_when_enabled() {
        let sel = selection();
        assert!(When::option("server").matches(&sel));
        assert!(!When::option("grass").matches(&sel));
        assert!(!When::option("unknown").matches(&sel));
    }

    #[test]
    fn test_when_equals() {
        let sel = selection();
        assert!(When::value("db-client", "postgres").matches(&sel));
        assert!(!When::value("db-client", "postgresql10").matches(&sel));
        assert!(When::value("server", true).matches(&sel));
        assert!(When::value("grass", false).matches(&sel));
    }

    #[test]
    fn test_when_deserializes_both_forms() {
        #[derive(Deserialize)]
        struct Row {
            when: When,
        }

        let short: Row = toml::from_str(r#"when = "server""#).unwrap();
        assert_eq!(short.when, When::option("server"));

        let full: Row =
            toml::from_str(r#"when = { option = "db-client", value = "postgres" }"#).unwrap();
        assert_eq!(full.when, When::value("db-client", "postgres"));
    }

    #[test]
    fn test_patch_action_default_is_edit() {
        let rule: PatchRule = toml::from_str(
            r#"
source = "patches/fix.diff"
target = "src/CMakeLists.txt"
"#,
        )
        .unwrap();
        assert_eq!(rule.action, PatchAction::Edit);
        assert_eq!(rule.order, 0);
    }
}
