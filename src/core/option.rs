//! Build option specifications.
//!
//! An option is a named build-time toggle (bool) or enumerated choice
//! declared by a recipe. Option specs are immutable once registered;
//! only the resolver reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a build option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// On/off toggle (`with-server` style).
    Bool,
    /// One value out of a declared set (`db-client = postgres|postgresql10`).
    Enum,
}

impl Default for OptionKind {
    fn default() -> Self {
        OptionKind::Bool
    }
}

/// A concrete option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Value of a bool option.
    Bool(bool),
    /// Value of an enum option.
    Choice(String),
}

impl OptionValue {
    /// Whether this value counts as "enabled" for trigger purposes.
    ///
    /// A bool option is enabled when true; an enum option always carries
    /// a value and so is always enabled.
    pub fn is_enabled(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Choice(_) => true,
        }
    }

    /// Get the bool value, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Choice(_) => None,
        }
    }

    /// Get the choice string, if this is an enum value.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Choice(c) => Some(c),
        }
    }

    /// Parse a CLI-style value string against an option kind.
    ///
    /// Bool options accept `true`/`false` spellings; enum options take
    /// the string verbatim (membership in `values` is checked by the
    /// resolver).
    pub fn parse_for_kind(kind: OptionKind, raw: &str) -> Option<OptionValue> {
        match kind {
            OptionKind::Bool => match raw {
                "true" | "on" | "yes" => Some(OptionValue::Bool(true)),
                "false" | "off" | "no" => Some(OptionValue::Bool(false)),
                _ => None,
            },
            OptionKind::Enum => Some(OptionValue::Choice(raw.to_string())),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Choice(c) => write!(f, "{}", c),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Choice(s.to_string())
    }
}

/// Declaration of a single build option.
///
/// The `name` field is filled in from the `[options.NAME]` table key when
/// the recipe is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Option name, unique within a recipe.
    #[serde(skip)]
    pub name: String,

    /// Bool toggle or enumerated choice.
    #[serde(default)]
    pub kind: OptionKind,

    /// Default value. Bool options default to `false` when omitted;
    /// enum options must declare a default.
    #[serde(default)]
    pub default: Option<OptionValue>,

    /// Allowed values for enum options.
    #[serde(default)]
    pub values: Vec<String>,

    /// Bool options that may not be enabled together with this one.
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Bool options that must be enabled when this one is.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Human-readable description shown by `rigging options`.
    #[serde(default)]
    pub description: Option<String>,
}

impl OptionSpec {
    /// Create a bool option spec (off by default).
    pub fn bool(name: impl Into<String>) -> Self {
        OptionSpec {
            name: name.into(),
            kind: OptionKind::Bool,
            default: Some(OptionValue::Bool(false)),
            values: Vec::new(),
            conflicts: Vec::new(),
            requires: Vec::new(),
            description: None,
        }
    }

    /// Create an enum option spec.
    pub fn choice(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
        default: impl Into<String>,
    ) -> Self {
        OptionSpec {
            name: name.into(),
            kind: OptionKind::Enum,
            default: Some(OptionValue::Choice(default.into())),
            values: values.into_iter().map(|v| v.into()).collect(),
            conflicts: Vec::new(),
            requires: Vec::new(),
            description: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add conflicting options.
    pub fn with_conflicts(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.conflicts.extend(names.into_iter().map(|n| n.into()));
        self
    }

    /// Add required options.
    pub fn with_requires(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requires.extend(names.into_iter().map(|n| n.into()));
        self
    }

    /// The effective default value (bool options fall back to `false`).
    pub fn effective_default(&self) -> OptionValue {
        match (&self.default, self.kind) {
            (Some(v), _) => v.clone(),
            (None, OptionKind::Bool) => OptionValue::Bool(false),
            // Load-time validation rejects enum options without a
            // default, so validated recipes never reach this arm.
            (None, OptionKind::Enum) => OptionValue::Choice(String::new()),
        }
    }

    /// Check whether a value is acceptable for this option.
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match (self.kind, value) {
            (OptionKind::Bool, OptionValue::Bool(_)) => true,
            (OptionKind::Enum, OptionValue::Choice(c)) => self.values.iter().any(|v| v == c),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_enabled() {
        assert!(OptionValue::Bool(true).is_enabled());
        assert!(!OptionValue::Bool(false).is_enabled());
        assert!(OptionValue::Choice("postgres".to_string()).is_enabled());
    }

    #[test]
    fn test_parse_for_kind() {
        assert_eq!(
            OptionValue::parse_for_kind(OptionKind::Bool, "true"),
            Some(OptionValue::Bool(true))
        );
        assert_eq!(
            OptionValue::parse_for_kind(OptionKind::Bool, "off"),
            Some(OptionValue::Bool(false))
        );
        assert_eq!(OptionValue::parse_for_kind(OptionKind::Bool, "maybe"), None);
        assert_eq!(
            OptionValue::parse_for_kind(OptionKind::Enum, "postgres"),
            Some(OptionValue::Choice("postgres".to_string()))
        );
    }

    #[test]
    fn test_accepts() {
        let server = OptionSpec::bool("server");
        assert!(server.accepts(&OptionValue::Bool(true)));
        assert!(!server.accepts(&OptionValue::Choice("yes".to_string())));

        let db = OptionSpec::choice("db-client", ["postgres", "postgresql10"], "postgres");
        assert!(db.accepts(&OptionValue::Choice("postgresql10".to_string())));
        assert!(!db.accepts(&OptionValue::Choice("oracle".to_string())));
        assert!(!db.accepts(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_effective_default() {
        let opt = OptionSpec {
            name: "debug".to_string(),
            kind: OptionKind::Bool,
            default: None,
            values: Vec::new(),
            conflicts: Vec::new(),
            requires: Vec::new(),
            description: None,
        };
        assert_eq!(opt.effective_default(), OptionValue::Bool(false));

        let opt = OptionSpec::bool("server").with_default(true);
        assert_eq!(opt.effective_default(), OptionValue::Bool(true));
    }
}
