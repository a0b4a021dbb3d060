//! SelectionSet - the immutable resolved option values.
//!
//! Once created by the option registry, a SelectionSet is read-only.
//! Every downstream stage (dependency resolution, flag assembly, patch
//! planning, environment composition) is a pure function of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::option::OptionValue;

/// The fully resolved, validated set of option values for one build.
///
/// Iteration order is option name order (BTreeMap), so serialized
/// selections are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    values: BTreeMap<String, OptionValue>,
}

impl SelectionSet {
    /// Construct a selection from resolved values. Only the option
    /// registry should call this; callers receive it validated.
    pub(crate) fn new(values: BTreeMap<String, OptionValue>) -> Self {
        SelectionSet { values }
    }

    /// Get the value of an option, if the recipe declares it.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Whether an option is enabled (bool true, or any enum value).
    pub fn is_enabled(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| v.is_enabled())
    }

    /// Whether an option holds exactly the given value.
    pub fn has_value(&self, name: &str, value: &OptionValue) -> bool {
        self.values.get(name) == Some(value)
    }

    /// Iterate over all option values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over enabled options in name order.
    pub fn enabled(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.iter().filter(|(_, v)| v.is_enabled())
    }

    /// Number of options in the selection.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
