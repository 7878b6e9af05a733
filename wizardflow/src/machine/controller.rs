//! The guarded operation set.

use crate::config::{ConfigError, MachineConfig};
use crate::context::{
    ClarifyingQuestion, ExecutionState, HistoryEntry, ValidationIssue, WorkflowBlueprint,
};
use crate::core::{can_transition, map_state_to_wizard_step, WizardState, WizardStep};
use crate::errors::{WizardError, WizardResult};
use crate::events::{AttemptOutcome, TracingObserver, TransitionAttempt, TransitionObserver};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Drives one wizard session through the workflow generation pipeline.
///
/// Every mutation goes through a guarded operation that either applies
/// completely (data and transition) or returns an error having changed
/// nothing. Each transition attempt is reported to the configured
/// [`TransitionObserver`].
///
/// The machine does no locking: every mutating operation takes `&mut self`,
/// so one owner drives a session at a time. Share sessions across tasks with
/// [`SessionRegistry`](crate::session::SessionRegistry).
#[derive(Clone)]
pub struct WorkflowStateMachine {
    pub(super) state: ExecutionState,
    config: MachineConfig,
    observer: Arc<dyn TransitionObserver>,
}

impl Default for WorkflowStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkflowStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowStateMachine")
            .field("current_state", &self.state.current_state)
            .field("retry_count", &self.state.retry_count)
            .field("history_len", &self.state.state_history.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowStateMachine {
    /// Creates a machine in [`WizardState::Idle`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ExecutionState::new(),
            config: MachineConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Creates a machine with a validated configuration.
    pub fn with_config(config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Builds a machine from a configuration the caller already validated.
    #[cfg(feature = "sessions")]
    pub(crate) fn from_validated(config: MachineConfig, observer: Arc<dyn TransitionObserver>) -> Self {
        Self {
            state: ExecutionState::new(),
            config,
            observer,
        }
    }

    /// Replaces the transition observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The active state.
    #[must_use]
    pub fn current_state(&self) -> WizardState {
        self.state.current_state
    }

    /// The UI step for the active state.
    #[must_use]
    pub fn wizard_step(&self) -> WizardStep {
        map_state_to_wizard_step(self.state.current_state)
    }

    /// Returns an independent copy of the execution state.
    #[must_use]
    pub fn execution_state(&self) -> ExecutionState {
        self.state.clone()
    }

    /// Borrows the execution state read-only.
    #[must_use]
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Returns a copy of the audit log.
    #[must_use]
    pub fn state_history(&self) -> Vec<HistoryEntry> {
        self.state.state_history.clone()
    }

    /// Returns true in [`WizardState::WorkflowReady`] or [`WizardState::ErrorHandling`].
    #[must_use]
    pub fn is_terminal_state(&self) -> bool {
        self.state.current_state.is_terminal()
    }

    /// Checks whether `target` is reachable in one step. Mutates nothing.
    pub fn can_transition_to(&self, target: WizardState) -> WizardResult {
        let from = self.state.current_state;
        if can_transition(from, target) {
            Ok(())
        } else {
            Err(WizardError::invalid_transition(from, target))
        }
    }

    /// Moves to `target` if the transition table allows it.
    pub fn transition_to(&mut self, target: WizardState, reason: Option<&str>) -> WizardResult {
        self.apply("transition_to", target, reason.map(str::to_string))
    }

    // --- guarded operations ---

    /// Records the user's description and moves to [`WizardState::PromptReceived`].
    ///
    /// Calling this outside [`WizardState::Idle`] is a caller bug and yields
    /// [`WizardError::Misuse`].
    pub fn set_user_prompt(&mut self, prompt: impl Into<String>) -> WizardResult {
        const OPERATION: &str = "set_user_prompt";
        let from = self.state.current_state;
        if from != WizardState::Idle {
            let err = WizardError::Misuse {
                operation: OPERATION,
                expected: WizardState::Idle,
                actual: from,
            };
            return Err(self.reject(OPERATION, WizardState::PromptReceived, None, err));
        }
        self.check(OPERATION, WizardState::PromptReceived, None)?;

        self.state.user_prompt = prompt.into();
        self.apply(
            OPERATION,
            WizardState::PromptReceived,
            Some("User prompt received".to_string()),
        )
    }

    /// Replaces the clarifying questions.
    ///
    /// From [`WizardState::PromptReceived`] this also moves to
    /// [`WizardState::ClarificationActive`]; elsewhere it only updates data.
    pub fn set_clarifying_questions(&mut self, questions: Vec<ClarifyingQuestion>) -> WizardResult {
        let count = questions.len();
        self.state.clarifying_questions = questions;

        if self.state.current_state == WizardState::PromptReceived {
            self.apply(
                "set_clarifying_questions",
                WizardState::ClarificationActive,
                Some(format!("{count} clarifying question(s) generated")),
            )?;
        }
        Ok(())
    }

    /// Merges a round of answers into the accumulated answers.
    pub fn set_clarifying_answers(&mut self, answers: HashMap<String, String>) {
        self.state.clarifying_answers.extend(answers);
    }

    /// Records the confirmed understanding and moves to
    /// [`WizardState::UnderstandingConfirmed`].
    pub fn confirm_understanding(&mut self, understanding: impl Into<String>) -> WizardResult {
        const OPERATION: &str = "confirm_understanding";
        let target = WizardState::UnderstandingConfirmed;
        self.check(OPERATION, target, None)?;

        self.state.final_understanding = understanding.into();
        self.apply(OPERATION, target, Some("Understanding confirmed by user".to_string()))
    }

    /// Replaces the required credential names.
    ///
    /// From [`WizardState::UnderstandingConfirmed`] or
    /// [`WizardState::WorkflowBuilding`] this also moves to
    /// [`WizardState::CredentialCollection`].
    pub fn set_required_credentials(&mut self, credentials: Vec<String>) -> WizardResult {
        self.state.credentials_required = credentials;

        let reason = match self.state.current_state {
            WizardState::UnderstandingConfirmed => "Credentials required",
            WizardState::WorkflowBuilding => "Additional credentials discovered during build",
            _ => return Ok(()),
        };
        self.apply(
            "set_required_credentials",
            WizardState::CredentialCollection,
            Some(reason.to_string()),
        )
    }

    /// Merges provided credentials into the collected credentials.
    pub fn set_provided_credentials(&mut self, credentials: HashMap<String, String>) {
        self.state.credentials_provided.extend(credentials);
    }

    /// Starts building once every required credential is present and an
    /// understanding has been confirmed.
    pub fn start_building(&mut self) -> WizardResult {
        const OPERATION: &str = "start_building";
        let target = WizardState::WorkflowBuilding;

        let missing = self
            .config
            .credential_matching
            .missing(&self.state.credentials_required, &self.state.credentials_provided);
        if !missing.is_empty() {
            let err = WizardError::MissingCredentials { missing };
            return Err(self.reject(OPERATION, target, None, err));
        }

        if !self.state.has_understanding() {
            return Err(self.reject(OPERATION, target, None, WizardError::EmptyUnderstanding));
        }

        self.apply(OPERATION, target, Some("Starting workflow build".to_string()))
    }

    /// Stores a generated blueprint and moves to [`WizardState::WorkflowValidation`].
    ///
    /// The blueprint is only stored if the transition is legal.
    pub fn set_workflow_blueprint(&mut self, blueprint: WorkflowBlueprint) -> WizardResult {
        const OPERATION: &str = "set_workflow_blueprint";
        let target = WizardState::WorkflowValidation;
        self.check(OPERATION, target, None)?;

        let nodes = blueprint.node_count();
        self.state.workflow_blueprint = Some(blueprint);
        self.apply(
            OPERATION,
            target,
            Some(format!("Blueprint generated with {nodes} node(s)")),
        )
    }

    /// Appends a validation issue.
    pub fn add_validation_error(&mut self, issue: ValidationIssue) {
        self.state.validation_errors.push(issue);
    }

    /// Removes every validation issue.
    pub fn clear_validation_errors(&mut self) {
        self.state.validation_errors.clear();
    }

    /// Discards the current blueprint and goes back to building.
    ///
    /// Fails with [`WizardError::RetryBudgetExhausted`] once the configured
    /// budget is spent; the caller is expected to escalate with
    /// [`handle_error`](Self::handle_error).
    pub fn retry_building(&mut self) -> WizardResult {
        const OPERATION: &str = "retry_building";
        let target = WizardState::WorkflowBuilding;
        let max = self.config.max_retries;
        self.check(OPERATION, target, None)?;

        if self.state.retry_count >= max {
            let err = WizardError::RetryBudgetExhausted {
                attempts: self.state.retry_count,
                max,
            };
            return Err(self.reject(OPERATION, target, None, err));
        }

        self.state.retry_count += 1;
        self.state.workflow_blueprint = None;
        self.state.validation_errors.clear();
        let attempt = self.state.retry_count;
        self.apply(
            OPERATION,
            target,
            Some(format!("Retry attempt {attempt} of {max}")),
        )
    }

    /// Declares the validated blueprint ready. Terminal.
    pub fn mark_workflow_ready(&mut self) -> WizardResult {
        const OPERATION: &str = "mark_workflow_ready";
        let target = WizardState::WorkflowReady;

        let count = self.state.validation_errors.len();
        if count > 0 {
            let err = WizardError::UnresolvedValidationErrors { count };
            return Err(self.reject(OPERATION, target, None, err));
        }

        let has_nodes = self
            .state
            .workflow_blueprint
            .as_ref()
            .is_some_and(WorkflowBlueprint::has_nodes);
        if !has_nodes {
            return Err(self.reject(OPERATION, target, None, WizardError::EmptyBlueprint));
        }

        self.apply(OPERATION, target, Some("Workflow validated".to_string()))
    }

    /// Records `message` and moves to [`WizardState::ErrorHandling`] from any state.
    ///
    /// Already in error handling, only the message is updated.
    pub fn handle_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.state.last_error = Some(message.clone());

        if self.state.current_state != WizardState::ErrorHandling {
            // The wildcard error edge is always legal from here.
            let reason = self.config.record_reasons.then_some(message);
            self.record("handle_error", WizardState::ErrorHandling, reason);
        }
    }

    /// Discards all session data and returns to a fresh [`WizardState::Idle`].
    pub fn reset(&mut self) {
        let from = self.state.current_state;
        self.state = ExecutionState::new();
        self.notify("reset", from, WizardState::Idle, None, AttemptOutcome::Applied);
    }

    // --- transition primitives ---

    /// Checks the table and reports a rejection without mutating.
    fn check(&self, operation: &'static str, target: WizardState, reason: Option<&str>) -> WizardResult {
        self.can_transition_to(target)
            .map_err(|err| self.reject(operation, target, reason.map(str::to_string), err))
    }

    /// Checks the table and applies the transition.
    fn apply(&mut self, operation: &'static str, target: WizardState, reason: Option<String>) -> WizardResult {
        self.check(operation, target, reason.as_deref())?;
        let reason = if self.config.record_reasons { reason } else { None };
        self.record(operation, target, reason);
        Ok(())
    }

    /// Enters `target` unconditionally and reports it.
    fn record(&mut self, operation: &'static str, target: WizardState, reason: Option<String>) {
        let from = self.state.current_state;
        self.state.enter(target, reason.clone());
        self.notify(operation, from, target, reason, AttemptOutcome::Applied);
    }

    /// Reports a rejection and hands the error back.
    fn reject(
        &self,
        operation: &'static str,
        target: WizardState,
        reason: Option<String>,
        err: WizardError,
    ) -> WizardError {
        let from = self.state.current_state;
        self.notify(operation, from, target, reason, AttemptOutcome::Rejected(err.clone()));
        err
    }

    fn notify(
        &self,
        operation: &'static str,
        from: WizardState,
        to: WizardState,
        reason: Option<String>,
        outcome: AttemptOutcome,
    ) {
        self.observer.on_attempt(&TransitionAttempt {
            operation,
            from,
            to,
            reason,
            outcome,
            timestamp: Utc::now(),
        });
    }
}
