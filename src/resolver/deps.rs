//! Dependency graph builder.
//!
//! Computes which external packages a resolved selection needs, closes
//! over dependency-level requirements, checks capability conflicts, and
//! joins the result against the install catalog.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::core::catalog::{DependencyCatalog, ResolvedDependencySet};
use crate::core::dependency::ResolvedDependency;
use crate::core::recipe::Recipe;
use crate::core::selection::SelectionSet;
use crate::resolver::errors::ResolveError;

/// Resolve the dependency set for one selection.
///
/// Optional dependencies absent from the catalog are skipped; anything
/// else absent is an error naming what pulled it in.
pub fn resolve_dependencies(
    recipe: &Recipe,
    selection: &SelectionSet,
    catalog: &DependencyCatalog,
) -> Result<ResolvedDependencySet, ResolveError> {
    check_requirement_cycles(recipe)?;

    // Seed with unconditional contributions and those whose trigger
    // matched, tracking provenance for error reporting.
    let mut required: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for dep in recipe.dependencies() {
        let source = match &dep.when {
            None => "recipe".to_string(),
            Some(when) => {
                if !when.matches(selection) {
                    continue;
                }
                format!("option:{}", when.option_name())
            }
        };
        required.entry(dep.name.clone()).or_default().push(source);
    }

    // Close over dependency-level requirements.
    let mut worklist: Vec<String> = required.keys().cloned().collect();
    while let Some(name) = worklist.pop() {
        let Some(dep) = recipe.dependency(&name) else {
            continue;
        };
        for req in &dep.requires {
            let sources = required.entry(req.clone()).or_default();
            let source = format!("dep:{}", name);
            if !sources.contains(&source) {
                let first_visit = sources.is_empty();
                sources.push(source);
                if first_visit {
                    debug!(dependency = %req, because = %name, "pulling in transitive dependency");
                    worklist.push(req.clone());
                }
            }
        }
    }

    // Join against the catalog.
    let mut resolved = BTreeMap::new();
    for (name, mut sources) in required {
        let Some(dep) = recipe.dependency(&name) else {
            continue;
        };
        sources.sort();
        match catalog.get(&name) {
            Some(entry) => {
                resolved.insert(
                    name.clone(),
                    ResolvedDependency {
                        name,
                        kind: dep.kind,
                        capability: dep.capability.clone(),
                        paths: entry.paths.clone(),
                        version: entry.version.clone(),
                        required_by: sources,
                    },
                );
            }
            None if dep.is_optional() => {
                debug!(dependency = %name, "optional dependency not installed, skipping");
            }
            None => {
                return Err(ResolveError::MissingDependency {
                    name,
                    required_by: sources,
                });
            }
        }
    }

    // Two installed dependencies may not provide the same capability.
    // Runs after the join: an optional provider that is not installed
    // was skipped above and conflicts with nothing.
    let mut providers: BTreeMap<&str, &str> = BTreeMap::new();
    for dep in resolved.values() {
        if let Some(capability) = &dep.capability {
            if let Some(&first) = providers.get(capability.as_str()) {
                return Err(ResolveError::DependencyConflict {
                    capability: capability.clone(),
                    first: first.to_string(),
                    second: dep.name.clone(),
                });
            }
            providers.insert(capability, &dep.name);
        }
    }

    Ok(ResolvedDependencySet::new(resolved))
}

/// Reject cyclic dependency `requires` edges, declared-graph-wide.
fn check_requirement_cycles(recipe: &Recipe) -> Result<(), ResolveError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for dep in recipe.dependencies() {
        let node = graph.add_node(dep.name.as_str());
        nodes.insert(dep.name.as_str(), node);
    }
    for dep in recipe.dependencies() {
        for req in &dep.requires {
            if let (Some(&from), Some(&to)) =
                (nodes.get(dep.name.as_str()), nodes.get(req.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let is_cycle =
            component.len() > 1 || graph.contains_edge(component[0], component[0]);
        if is_cycle {
            let mut cycle: Vec<String> =
                component.iter().map(|&n| graph[n].to_string()).collect();
            cycle.sort();
            let first = cycle[0].clone();
            cycle.push(first);
            return Err(ResolveError::DependencyCycle { cycle });
        }
    }
    Ok(())
}
