//! Patch planner.
//!
//! Selects the patch rules whose trigger matches, orders them, and
//! validates that no patch edits a file before the patch that stages
//! it. The plan is a description only; applying patches is the build
//! driver's job.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::recipe::Recipe;
use crate::core::rules::PatchAction;
use crate::core::selection::SelectionSet;
use crate::planner::errors::PlanError;

/// One patch to apply, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Patch source locator.
    pub source: String,

    /// Path the patch touches, relative to the build tree.
    pub target: String,

    /// Application order as declared.
    pub order: i64,

    /// Whether the patch stages or edits the target.
    pub action: PatchAction,
}

/// Plan the ordered patch list for one resolved selection.
///
/// Sorting is stable on `order`, so rules with equal order keep their
/// declaration order.
pub fn plan_patches(
    recipe: &Recipe,
    selection: &SelectionSet,
) -> Result<Vec<PatchOperation>, PlanError> {
    let mut ops: Vec<PatchOperation> = recipe
        .patches
        .iter()
        .filter(|rule| rule.when.as_ref().is_none_or(|w| w.matches(selection)))
        .map(|rule| PatchOperation {
            source: rule.source.clone(),
            target: rule.target.clone(),
            order: rule.order,
            action: rule.action,
        })
        .collect();

    ops.sort_by_key(|op| op.order);

    // A target must be staged before anything edits it.
    for (i, edit) in ops.iter().enumerate() {
        if edit.action != PatchAction::Edit {
            continue;
        }
        for add in &ops[i..] {
            if add.action == PatchAction::Add && add.target == edit.target {
                return Err(PlanError::PatchOrdering {
                    target: edit.target.clone(),
                    add_order: add.order,
                    edit_order: edit.order,
                });
            }
        }
        trace!(target = %edit.target, order = edit.order, "planned edit");
    }

    Ok(ops)
}
