//! Test fixtures for wizard sessions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{ClarifyingQuestion, WorkflowBlueprint};
use crate::core::WizardState;
use crate::errors::WizardResult;
use crate::events::CollectingObserver;
use crate::machine::WorkflowStateMachine;

/// Prompt used by the fixtures.
pub const SAMPLE_PROMPT: &str = "When a new invoice lands in Gmail, post a summary to Slack";
/// Understanding used by the fixtures.
pub const SAMPLE_UNDERSTANDING: &str =
    "Watch Gmail for invoice emails and post sender, amount and due date to #billing";

/// Two clarifying questions.
#[must_use]
pub fn sample_questions() -> Vec<ClarifyingQuestion> {
    vec![
        ClarifyingQuestion::new("channel", "Which Slack channel should receive the summary?")
            .with_options(["#billing", "#finance"]),
        ClarifyingQuestion::new("filter", "How should invoice emails be recognised?"),
    ]
}

/// Answers to [`sample_questions`].
#[must_use]
pub fn sample_answers() -> HashMap<String, String> {
    HashMap::from([
        ("channel".to_string(), "#billing".to_string()),
        ("filter".to_string(), "Subject contains 'invoice'".to_string()),
    ])
}

/// A blueprint with two connected nodes.
#[must_use]
pub fn sample_blueprint() -> WorkflowBlueprint {
    WorkflowBlueprint::new()
        .with_nodes(vec![
            serde_json::json!({"id": "gmail_trigger", "type": "trigger"}),
            serde_json::json!({"id": "slack_post", "type": "action"}),
        ])
        .with_edges(vec![serde_json::json!({"from": "gmail_trigger", "to": "slack_post"})])
}

/// Drives `machine` from `Idle` to `target` through guarded operations only.
///
/// Credentials are never required on the way, except for
/// [`WizardState::CredentialCollection`] which requires `google`.
/// [`WizardState::ErrorHandling`] is reached from `PromptReceived`.
pub fn drive_to(machine: &mut WorkflowStateMachine, target: WizardState) -> WizardResult {
    if target == WizardState::Idle {
        return Ok(());
    }
    machine.set_user_prompt(SAMPLE_PROMPT)?;
    match target {
        WizardState::PromptReceived => return Ok(()),
        WizardState::ErrorHandling => {
            machine.handle_error("fixture error");
            return Ok(());
        }
        _ => {}
    }

    machine.set_clarifying_questions(sample_questions())?;
    if target == WizardState::ClarificationActive {
        return Ok(());
    }
    machine.set_clarifying_answers(sample_answers());
    machine.confirm_understanding(SAMPLE_UNDERSTANDING)?;
    match target {
        WizardState::UnderstandingConfirmed => return Ok(()),
        WizardState::CredentialCollection => {
            return machine.set_required_credentials(vec!["google".to_string()]);
        }
        _ => {}
    }

    machine.start_building()?;
    if target == WizardState::WorkflowBuilding {
        return Ok(());
    }
    machine.set_workflow_blueprint(sample_blueprint())?;
    if target == WizardState::WorkflowValidation {
        return Ok(());
    }
    machine.mark_workflow_ready()
}

/// Returns a fresh machine driven to `target`.
pub fn machine_in(target: WizardState) -> WizardResult<WorkflowStateMachine> {
    let mut machine = WorkflowStateMachine::new();
    drive_to(&mut machine, target)?;
    Ok(machine)
}

/// A machine paired with the observer recording its attempts.
#[derive(Debug)]
pub struct WizardFixture {
    /// The machine under test.
    pub machine: WorkflowStateMachine,
    /// Every attempt the machine reported.
    pub observer: Arc<CollectingObserver>,
}

impl WizardFixture {
    /// Creates an idle machine wired to a fresh observer.
    #[must_use]
    pub fn new() -> Self {
        let observer = Arc::new(CollectingObserver::new());
        let machine = WorkflowStateMachine::new().with_observer(observer.clone());
        Self { machine, observer }
    }

    /// Creates a fixture driven to `target`, with the observer cleared.
    pub fn at(target: WizardState) -> WizardResult<Self> {
        let mut fixture = Self::new();
        drive_to(&mut fixture.machine, target)?;
        fixture.observer.clear();
        Ok(fixture)
    }

    /// Number of history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.machine.state().state_history().len()
    }
}

impl Default for WizardFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_in_every_state() {
        for state in WizardState::ALL {
            let machine = machine_in(state).unwrap();
            assert_eq!(machine.current_state(), state);
        }
    }

    #[test]
    fn test_fixture_clears_observer() {
        let fixture = WizardFixture::at(WizardState::WorkflowValidation).unwrap();
        assert!(fixture.observer.is_empty());
        assert_eq!(fixture.history_len(), 6);
    }
}
