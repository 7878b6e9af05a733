//! The execution state aggregate.

use super::{ClarifyingQuestion, HistoryEntry, ValidationIssue, WorkflowBlueprint};
use crate::core::WizardState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the wizard knows about one workflow generation session.
///
/// Fields are only writable from inside the crate; the state machine is the
/// sole writer. Callers receive clones through
/// [`WorkflowStateMachine::execution_state`](crate::machine::WorkflowStateMachine::execution_state)
/// and read them through the accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    pub(crate) current_state: WizardState,
    pub(crate) user_prompt: String,
    pub(crate) clarifying_questions: Vec<ClarifyingQuestion>,
    pub(crate) clarifying_answers: HashMap<String, String>,
    pub(crate) final_understanding: String,
    pub(crate) credentials_required: Vec<String>,
    pub(crate) credentials_provided: HashMap<String, String>,
    pub(crate) workflow_blueprint: Option<WorkflowBlueprint>,
    pub(crate) validation_errors: Vec<ValidationIssue>,
    pub(crate) retry_count: u32,
    pub(crate) last_error: Option<String>,
    pub(crate) state_history: Vec<HistoryEntry>,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionState {
    /// Creates a fresh state in [`WizardState::Idle`] with one history entry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_state: WizardState::Idle,
            user_prompt: String::new(),
            clarifying_questions: Vec::new(),
            clarifying_answers: HashMap::new(),
            final_understanding: String::new(),
            credentials_required: Vec::new(),
            credentials_provided: HashMap::new(),
            workflow_blueprint: None,
            validation_errors: Vec::new(),
            retry_count: 0,
            last_error: None,
            state_history: vec![HistoryEntry::now(
                WizardState::Idle,
                Some("Initial state".to_string()),
            )],
        }
    }

    /// The active state.
    #[must_use]
    pub fn current_state(&self) -> WizardState {
        self.current_state
    }

    /// The user's description of the workflow.
    #[must_use]
    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    /// The latest round of clarifying questions.
    #[must_use]
    pub fn clarifying_questions(&self) -> &[ClarifyingQuestion] {
        &self.clarifying_questions
    }

    /// Answers accumulated across every round, keyed by question id.
    #[must_use]
    pub fn clarifying_answers(&self) -> &HashMap<String, String> {
        &self.clarifying_answers
    }

    /// The confirmed understanding, empty until confirmed.
    #[must_use]
    pub fn final_understanding(&self) -> &str {
        &self.final_understanding
    }

    /// Credential names the workflow needs.
    #[must_use]
    pub fn credentials_required(&self) -> &[String] {
        &self.credentials_required
    }

    /// Credentials supplied so far, keyed by name.
    #[must_use]
    pub fn credentials_provided(&self) -> &HashMap<String, String> {
        &self.credentials_provided
    }

    /// The current blueprint, if one has been generated since the last retry.
    #[must_use]
    pub fn workflow_blueprint(&self) -> Option<&WorkflowBlueprint> {
        self.workflow_blueprint.as_ref()
    }

    /// Validation issues for the current blueprint.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationIssue] {
        &self.validation_errors
    }

    /// Build retries consumed.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// The message passed to the last `handle_error` call.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The audit log, oldest first.
    #[must_use]
    pub fn state_history(&self) -> &[HistoryEntry] {
        &self.state_history
    }

    /// Returns true if an understanding has been recorded.
    #[must_use]
    pub fn has_understanding(&self) -> bool {
        !self.final_understanding.is_empty()
    }

    /// Enters `state`, appending to the audit log. Callers check legality first.
    pub(crate) fn enter(&mut self, state: WizardState, reason: Option<String>) {
        self.state_history.push(HistoryEntry::now(state, reason));
        self.current_state = state;
    }

    /// Converts to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
