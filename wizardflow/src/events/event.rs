//! Wizard event type.

use crate::core::WizardState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event type emitted when a transition is applied.
pub const TRANSITION_APPLIED: &str = "wizard.transition.applied";
/// Event type emitted when a transition is rejected.
pub const TRANSITION_REJECTED: &str = "wizard.transition.rejected";
/// Event type emitted when the machine is reset.
pub const SESSION_RESET: &str = "wizard.session.reset";

/// An event describing something that happened to a wizard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardEvent {
    /// The event type (e.g., "wizard.transition.applied").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (RFC 3339).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl WizardEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Creates a "wizard.transition.applied" event.
    #[must_use]
    pub fn applied(from: WizardState, to: WizardState, operation: &str) -> Self {
        Self::new(TRANSITION_APPLIED)
            .add_data("from", serde_json::json!(from))
            .add_data("to", serde_json::json!(to))
            .add_data("operation", serde_json::json!(operation))
    }

    /// Creates a "wizard.transition.rejected" event.
    #[must_use]
    pub fn rejected(from: WizardState, to: WizardState, operation: &str, error: &str) -> Self {
        Self::new(TRANSITION_REJECTED)
            .add_data("from", serde_json::json!(from))
            .add_data("to", serde_json::json!(to))
            .add_data("operation", serde_json::json!(operation))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "wizard.session.reset" event.
    #[must_use]
    pub fn reset(from: WizardState) -> Self {
        Self::new(SESSION_RESET).add_data("from", serde_json::json!(from))
    }

    /// Returns a data field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}
