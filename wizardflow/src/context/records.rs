//! Plain data records carried by the execution state.

use crate::core::WizardState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clarifying question asked before the understanding is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyingQuestion {
    /// Question identifier, used as the key for answers.
    pub id: String,
    /// Question text.
    pub text: String,
    /// Suggested answers, if any.
    #[serde(default)]
    pub options: Vec<String>,
}

impl ClarifyingQuestion {
    /// Creates a free-form question.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// Sets the suggested answers.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A problem found while validating a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Issue category (e.g. "missing_connection").
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Human readable message.
    pub message: String,
    /// The offending node, when the issue is node specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl ValidationIssue {
    /// Creates a workflow-level issue.
    #[must_use]
    pub fn new(issue_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issue_type: issue_type.into(),
            message: message.into(),
            node_id: None,
        }
    }

    /// Attaches the issue to a node.
    #[must_use]
    pub fn on_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }
}

/// The generated workflow artifact.
///
/// Content is produced elsewhere; the machine only checks that `nodes` is a
/// non-empty list before declaring the workflow ready.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowBlueprint {
    /// Workflow nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<serde_json::Value>>,
    /// Connections between nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<serde_json::Value>>,
    /// Free-form structure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<serde_json::Value>,
}

impl WorkflowBlueprint {
    /// Creates an empty blueprint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nodes.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<serde_json::Value>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Sets the edges.
    #[must_use]
    pub fn with_edges(mut self, edges: Vec<serde_json::Value>) -> Self {
        self.edges = Some(edges);
        self
    }

    /// Sets the structure.
    #[must_use]
    pub fn with_structure(mut self, structure: serde_json::Value) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Returns true if the blueprint has at least one node.
    #[must_use]
    pub fn has_nodes(&self) -> bool {
        self.nodes.as_ref().is_some_and(|nodes| !nodes.is_empty())
    }

    /// Number of nodes, zero when absent.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, Vec::len)
    }
}

/// One entry of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The state entered.
    pub state: WizardState,
    /// When the state was entered.
    pub timestamp: DateTime<Utc>,
    /// Why the transition happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn now(state: WizardState, reason: Option<String>) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
            reason,
        }
    }
}
