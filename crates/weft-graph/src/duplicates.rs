//! Duplicate-declaration detection.
//!
//! Multiple repositories may declare the same asset key. That is valid when
//! at most one declaration is materializable and at most one is observable,
//! with any number of unexecutable source declarations alongside. Violations
//! are a data-quality signal, not an error: construction proceeds with the
//! priority-selection rule and the duplicates are reported as structured
//! warnings attached to the built graph, plus one `tracing::warn!` per
//! build pass.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use weft_core::key::AssetKey;
use weft_core::repository::RepositoryHandle;
use weft_core::snap::ExecutionType;

use crate::scoped::RepositoryScopedAssetNode;

/// More than one declaration of one execution type exists for an asset key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateNodeWarning {
    /// Execution type of the offending declarations.
    pub execution_type: ExecutionType,
    /// The asset key declared more than once.
    pub asset_key: AssetKey,
    /// Code location names of every offending declaration, in input order.
    pub location_names: Vec<String>,
}

impl fmt::Display for DuplicateNodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {}: [{}]",
            self.asset_key,
            self.location_names.join(", ")
        )
    }
}

/// Warnings accumulated during one graph build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    warnings: Vec<DuplicateNodeWarning>,
}

impl BuildDiagnostics {
    /// The accumulated warnings, one per (execution type, asset key) pair.
    pub fn warnings(&self) -> &[DuplicateNodeWarning] {
        &self.warnings
    }

    /// Returns `true` if the build produced no warnings.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Renders all warnings as one message, grouped by execution type.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        for execution_type in [ExecutionType::Materialization, ExecutionType::Observation] {
            let lines: Vec<String> = self
                .warnings
                .iter()
                .filter(|warning| warning.execution_type == execution_type)
                .map(DuplicateNodeWarning::to_string)
                .collect();
            if !lines.is_empty() {
                sections.push(format!(
                    "Found {} nodes for some asset keys in multiple code locations. Only one \
                     {} node is allowed per asset key. Duplicates:\n{}",
                    execution_type.as_str(),
                    execution_type.as_str(),
                    lines.join("\n")
                ));
            }
        }
        sections.join("\n")
    }

    /// Emits the rendered message through `tracing`, once per build pass.
    /// No-op when there are no warnings.
    pub fn emit(&self) {
        if !self.is_empty() {
            tracing::warn!("{}", self.render());
        }
    }
}

/// Partitions the scoped nodes by execution type and reports every asset key
/// with more than one materializable or more than one observable
/// declaration. Unexecutable duplicates are allowed silently: many locations
/// may declare the same external source asset.
pub fn find_duplicate_declarations(
    scoped_nodes: &[RepositoryScopedAssetNode],
) -> BuildDiagnostics {
    let mut warnings = Vec::new();
    for execution_type in [ExecutionType::Materialization, ExecutionType::Observation] {
        let subset = scoped_nodes
            .iter()
            .filter(|node| node.asset.execution_type == execution_type);
        warnings.extend(duplicates_within_subset(subset, execution_type));
    }
    BuildDiagnostics { warnings }
}

fn duplicates_within_subset<'a>(
    subset: impl Iterator<Item = &'a RepositoryScopedAssetNode>,
    execution_type: ExecutionType,
) -> Vec<DuplicateNodeWarning> {
    // Insertion-ordered grouping keeps warning order stable across builds.
    let mut handles_by_key: IndexMap<&AssetKey, Vec<&RepositoryHandle>> = IndexMap::new();
    for node in subset {
        handles_by_key.entry(node.key()).or_default().push(&node.handle);
    }

    handles_by_key
        .into_iter()
        .filter(|(_, handles)| handles.len() > 1)
        .map(|(key, handles)| DuplicateNodeWarning {
            execution_type,
            asset_key: key.clone(),
            location_names: handles
                .iter()
                .map(|handle| handle.location_name.clone())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::snap::AssetNodeSnap;

    fn scoped(location: &str, name: &str, execution_type: ExecutionType) -> RepositoryScopedAssetNode {
        RepositoryScopedAssetNode::new(
            RepositoryHandle::new(location, "repo"),
            AssetNodeSnap::new(AssetKey::new([name]), execution_type),
            None,
        )
    }

    #[test]
    fn unexecutable_duplicates_are_silent() {
        // Scenario: two locations declare the same source asset, neither
        // materializable.
        let nodes = [
            scoped("loc_a", "x", ExecutionType::Unexecutable),
            scoped("loc_b", "x", ExecutionType::Unexecutable),
        ];
        let diagnostics = find_duplicate_declarations(&nodes);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn duplicate_materializable_declarations_warn() {
        let nodes = [
            scoped("loc_a", "y", ExecutionType::Materialization),
            scoped("loc_b", "y", ExecutionType::Materialization),
        ];
        let diagnostics = find_duplicate_declarations(&nodes);

        assert_eq!(diagnostics.warnings().len(), 1);
        let warning = &diagnostics.warnings()[0];
        assert_eq!(warning.execution_type, ExecutionType::Materialization);
        assert_eq!(warning.asset_key, AssetKey::new(["y"]));
        assert_eq!(warning.location_names, ["loc_a", "loc_b"]);
    }

    #[test]
    fn duplicate_observable_declarations_warn_independently() {
        let nodes = [
            scoped("loc_a", "x", ExecutionType::Observation),
            scoped("loc_b", "x", ExecutionType::Observation),
            // One materializable declaration of the same key is fine.
            scoped("loc_c", "x", ExecutionType::Materialization),
        ];
        let diagnostics = find_duplicate_declarations(&nodes);

        assert_eq!(diagnostics.warnings().len(), 1);
        assert_eq!(
            diagnostics.warnings()[0].execution_type,
            ExecutionType::Observation
        );
    }

    #[test]
    fn one_declaration_per_type_is_valid() {
        let nodes = [
            scoped("loc_a", "x", ExecutionType::Materialization),
            scoped("loc_b", "x", ExecutionType::Observation),
            scoped("loc_c", "x", ExecutionType::Unexecutable),
        ];
        assert!(find_duplicate_declarations(&nodes).is_empty());
    }

    #[test]
    fn rendered_message_enumerates_all_offenders() {
        let nodes = [
            scoped("loc_a", "y", ExecutionType::Materialization),
            scoped("loc_b", "y", ExecutionType::Materialization),
            scoped("loc_a", "z", ExecutionType::Materialization),
            scoped("loc_c", "z", ExecutionType::Materialization),
        ];
        let rendered = find_duplicate_declarations(&nodes).render();
        insta::assert_snapshot!(rendered, @r"
        Found materialization nodes for some asset keys in multiple code locations. Only one materialization node is allowed per asset key. Duplicates:
          y: [loc_a, loc_b]
          z: [loc_a, loc_c]
        ");
    }

    #[test]
    fn warnings_serde_roundtrip() {
        let nodes = [
            scoped("loc_a", "y", ExecutionType::Materialization),
            scoped("loc_b", "y", ExecutionType::Materialization),
        ];
        let diagnostics = find_duplicate_declarations(&nodes);
        let json = serde_json::to_string(&diagnostics).unwrap();
        let back: BuildDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(diagnostics, back);
    }

    #[test]
    fn empty_diagnostics_render_empty() {
        let diagnostics = find_duplicate_declarations(&[]);
        assert_eq!(diagnostics.render(), "");
        // Emitting nothing is a no-op.
        diagnostics.emit();
    }
}
