//! OptionRegistry - the authority on declared options.
//!
//! The registry owns every option spec a recipe declares and turns a set
//! of caller overrides into a validated, closed `SelectionSet`. All
//! option-level failure modes (unknown names, bad values, conflicts,
//! unsatisfied or cyclic requirements) are detected here, before any
//! flag or patch work starts.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::core::option::{OptionKind, OptionSpec, OptionValue};
use crate::core::recipe::Recipe;
use crate::core::selection::SelectionSet;
use crate::resolver::errors::ResolveError;

/// Registry of the options one recipe declares.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    specs: BTreeMap<String, OptionSpec>,
}

impl OptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        OptionRegistry::default()
    }

    /// Build a registry from a loaded recipe.
    ///
    /// Recipe loading already guarantees name uniqueness (TOML table
    /// keys), so this cannot fail for a validated recipe; the duplicate
    /// check still guards programmatic construction.
    pub fn from_recipe(recipe: &Recipe) -> Result<Self, ResolveError> {
        let mut registry = OptionRegistry::new();
        for spec in recipe.options() {
            registry.register(spec.clone())?;
        }
        Ok(registry)
    }

    /// Register one option spec.
    pub fn register(&mut self, spec: OptionSpec) -> Result<(), ResolveError> {
        if self.specs.contains_key(&spec.name) {
            return Err(ResolveError::DuplicateOption {
                option: spec.name.clone(),
            });
        }
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Look up an option spec by name.
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.get(name)
    }

    /// Iterate over specs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.values()
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parse a raw CLI override (`name` or `name=value`) into a typed
    /// option value.
    pub fn parse_override(
        &self,
        name: &str,
        raw: Option<&str>,
    ) -> Result<OptionValue, ResolveError> {
        let spec = self.specs.get(name).ok_or_else(|| self.unknown(name))?;
        match raw {
            None => match spec.kind {
                // Bare `--with server` enables a bool option.
                OptionKind::Bool => Ok(OptionValue::Bool(true)),
                OptionKind::Enum => Err(ResolveError::InvalidValue {
                    option: name.to_string(),
                    value: String::new(),
                    accepted: spec.values.clone(),
                }),
            },
            Some(raw) => OptionValue::parse_for_kind(spec.kind, raw).ok_or_else(|| {
                ResolveError::InvalidValue {
                    option: name.to_string(),
                    value: raw.to_string(),
                    accepted: self.accepted_values(spec),
                }
            }),
        }
    }

    /// Resolve caller overrides into a complete, validated selection.
    ///
    /// Resolution proceeds in fixed stages: defaults, overrides,
    /// requirement-cycle check, requirement closure, conflict check.
    /// The result covers every declared option, so downstream stages
    /// never consult defaults again.
    pub fn resolve(
        &self,
        overrides: &BTreeMap<String, OptionValue>,
    ) -> Result<SelectionSet, ResolveError> {
        // Stage 1: seed every option with its default.
        let mut values: BTreeMap<String, OptionValue> = self
            .specs
            .values()
            .map(|spec| (spec.name.clone(), spec.effective_default()))
            .collect();

        // Stage 2: apply and validate overrides.
        for (name, value) in overrides {
            let spec = self.specs.get(name).ok_or_else(|| self.unknown(name))?;
            if !spec.accepts(value) {
                return Err(ResolveError::InvalidValue {
                    option: name.clone(),
                    value: value.to_string(),
                    accepted: self.accepted_values(spec),
                });
            }
            values.insert(name.clone(), value.clone());
        }

        // Stage 3: requirement edges must form a DAG, even between
        // options that are currently disabled.
        self.check_requirement_cycles()?;

        // Stage 4: requirement closure. Enabling an option enables what
        // it requires, transitively, unless the caller explicitly pinned
        // the required option off.
        let mut worklist: Vec<String> = values
            .iter()
            .filter(|(_, v)| v.is_enabled())
            .map(|(n, _)| n.clone())
            .collect();

        while let Some(name) = worklist.pop() {
            let Some(spec) = self.specs.get(&name) else {
                continue;
            };
            for required in &spec.requires {
                if values.get(required).is_some_and(|v| v.is_enabled()) {
                    continue;
                }
                let pinned_off = overrides
                    .get(required)
                    .is_some_and(|v| v == &OptionValue::Bool(false));
                if pinned_off {
                    return Err(ResolveError::UnsatisfiedRequirement {
                        requirer: name.clone(),
                        required: required.clone(),
                    });
                }
                debug!(option = %required, because = %name, "enabling required option");
                values.insert(required.clone(), OptionValue::Bool(true));
                worklist.push(required.clone());
            }
        }

        // Stage 5: no two enabled options may conflict. Name-order
        // iteration keeps the reported pair deterministic.
        for spec in self.specs.values() {
            if !values.get(&spec.name).is_some_and(|v| v.is_enabled()) {
                continue;
            }
            for other in &spec.conflicts {
                if values.get(other).is_some_and(|v| v.is_enabled()) {
                    return Err(ResolveError::OptionConflict {
                        first: spec.name.clone(),
                        second: other.clone(),
                    });
                }
            }
        }

        Ok(SelectionSet::new(values))
    }

    fn unknown(&self, name: &str) -> ResolveError {
        ResolveError::UnknownOption {
            option: name.to_string(),
            available: self.specs.keys().cloned().collect(),
        }
    }

    fn accepted_values(&self, spec: &OptionSpec) -> Vec<String> {
        match spec.kind {
            OptionKind::Bool => vec!["true".to_string(), "false".to_string()],
            OptionKind::Enum => spec.values.clone(),
        }
    }

    /// Reject cyclic `requires` edges. Uses Tarjan's SCC: any component
    /// larger than one node, or a self-edge, is a cycle.
    fn check_requirement_cycles(&self) -> Result<(), ResolveError> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for name in self.specs.keys() {
            let node = graph.add_node(name.as_str());
            nodes.insert(name.as_str(), node);
        }
        for spec in self.specs.values() {
            for required in &spec.requires {
                if let (Some(&from), Some(&to)) = (
                    nodes.get(spec.name.as_str()),
                    nodes.get(required.as_str()),
                ) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let is_cycle = component.len() > 1
                || graph.contains_edge(component[0], component[0]);
            if is_cycle {
                let mut cycle: Vec<String> = component
                    .iter()
                    .map(|&n| graph[n].to_string())
                    .collect();
                cycle.sort();
                let first = cycle[0].clone();
                cycle.push(first);
                return Err(ResolveError::CyclicRequirement { cycle });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OptionRegistry {
        let mut reg = OptionRegistry::new();
        reg.register(OptionSpec::bool("server").with_requires(["postgres"]))
            .unwrap();
        reg.register(OptionSpec::bool("postgres")).unwrap();
        reg.register(OptionSpec::bool("oracle").with_conflicts(["postgres"]))
            .unwrap();
        reg.register(OptionSpec::choice(
            "db-client",
            ["postgres", "postgresql10"],
            "postgres",
        ))
        .unwrap();
        reg
    }

    fn overrides(pairs: &[(&str, OptionValue)]) -> BTreeMap<String, OptionValue> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut reg = registry();
        let err = reg.register(OptionSpec::bool("server")).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateOption { option } if option == "server"));
    }

    #[test]
    fn test_defaults_cover_every_option() {
        let sel = registry().resolve(&BTreeMap::new()).unwrap();
        assert_eq!(sel.len(), 4);
        assert!(!sel.is_enabled("server"));
        assert_eq!(sel.get("db-client"), Some(&OptionValue::from("postgres")));
    }

    #[test]
    fn test_unknown_override_lists_available() {
        let err = registry()
            .resolve(&overrides(&[("sevrer", true.into())]))
            .unwrap_err();
        match err {
            ResolveError::UnknownOption { option, available } => {
                assert_eq!(option, "sevrer");
                assert!(available.contains(&"server".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_enum_value() {
        let err = registry()
            .resolve(&overrides(&[("db-client", "mysql".into())]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidValue { option, .. } if option == "db-client"));
    }

    #[test]
    fn test_requirement_closure_enables_transitively() {
        let sel = registry()
            .resolve(&overrides(&[("server", true.into())]))
            .unwrap();
        assert!(sel.is_enabled("server"));
        assert!(sel.is_enabled("postgres"));
    }

    #[test]
    fn test_explicit_disable_of_requirement_fails() {
        let err = registry()
            .resolve(&overrides(&[
                ("server", true.into()),
                ("postgres", false.into()),
            ]))
            .unwrap_err();
        match err {
            ResolveError::UnsatisfiedRequirement { requirer, required } => {
                assert_eq!(requirer, "server");
                assert_eq!(required, "postgres");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflict_names_both_options() {
        let err = registry()
            .resolve(&overrides(&[
                ("oracle", true.into()),
                ("postgres", true.into()),
            ]))
            .unwrap_err();
        match err {
            ResolveError::OptionConflict { first, second } => {
                assert_eq!(first, "oracle");
                assert_eq!(second, "postgres");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflict_triggered_through_closure() {
        // Enabling server pulls in postgres, which clashes with oracle.
        let err = registry()
            .resolve(&overrides(&[
                ("server", true.into()),
                ("oracle", true.into()),
            ]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::OptionConflict { .. }));
    }

    #[test]
    fn test_requirement_cycle_detected() {
        let mut reg = OptionRegistry::new();
        reg.register(OptionSpec::bool("a").with_requires(["b"])).unwrap();
        reg.register(OptionSpec::bool("b").with_requires(["c"])).unwrap();
        reg.register(OptionSpec::bool("c").with_requires(["a"])).unwrap();

        let err = reg.resolve(&BTreeMap::new()).unwrap_err();
        match err {
            ResolveError::CyclicRequirement { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_self_requirement_is_a_cycle() {
        let mut reg = OptionRegistry::new();
        reg.register(OptionSpec::bool("a").with_requires(["a"])).unwrap();
        let err = reg.resolve(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ResolveError::CyclicRequirement { .. }));
    }

    #[test]
    fn test_parse_override_forms() {
        let reg = registry();
        assert_eq!(
            reg.parse_override("server", None).unwrap(),
            OptionValue::Bool(true)
        );
        assert_eq!(
            reg.parse_override("server", Some("off")).unwrap(),
            OptionValue::Bool(false)
        );
        assert_eq!(
            reg.parse_override("db-client", Some("postgresql10")).unwrap(),
            OptionValue::from("postgresql10")
        );
        assert!(matches!(
            reg.parse_override("db-client", None),
            Err(ResolveError::InvalidValue { .. })
        ));
        assert!(matches!(
            reg.parse_override("nope", None),
            Err(ResolveError::UnknownOption { .. })
        ));
    }
}
