//! The four ONEX node kinds that an `Action` or `Intent` can target.

use serde::{Deserialize, Serialize};

/// Effect, Compute, Reducer, Orchestrator — the node taxonomy named in
/// the framework's purpose & scope (§1). The core only ever produces
/// values tagged with one of these; it never constructs or drives a node
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Compute,
    Effect,
    Reducer,
    Orchestrator,
}

impl NodeKind {
    /// The canonical `target_node_type` string for this kind, matching
    /// `contract::action::target_node_type`.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            NodeKind::Compute => "NodeCompute",
            NodeKind::Effect => "NodeEffect",
            NodeKind::Reducer => "NodeReducer",
            NodeKind::Orchestrator => "NodeOrchestrator",
        }
    }
}
