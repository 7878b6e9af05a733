//! Test assertions for wizard sessions.

use crate::core::WizardState;
use crate::errors::{ErrorCategory, WizardError, WizardResult};
use crate::machine::WorkflowStateMachine;

/// Asserts that the machine is in `expected`.
pub fn assert_state(machine: &WorkflowStateMachine, expected: WizardState) {
    assert_eq!(
        machine.current_state(),
        expected,
        "Expected state {:?}, got {:?}",
        expected,
        machine.current_state()
    );
}

/// Asserts the number of history entries.
pub fn assert_history_len(machine: &WorkflowStateMachine, expected: usize) {
    let actual = machine.state().state_history().len();
    assert_eq!(
        actual, expected,
        "Expected {expected} history entries, got {actual}"
    );
}

/// Asserts that the last history entry matches the current state.
pub fn assert_history_consistent(machine: &WorkflowStateMachine) {
    let history = machine.state().state_history();
    assert_eq!(
        history.first().map(|e| e.state),
        Some(WizardState::Idle),
        "History must start in IDLE"
    );
    assert_eq!(
        history.last().map(|e| e.state),
        Some(machine.current_state()),
        "Last history entry must match the current state"
    );
}

/// Asserts that `result` failed with an error of `expected` category.
pub fn assert_error_category(result: &WizardResult, expected: ErrorCategory) {
    match result {
        Ok(()) => panic!("Expected {expected} error, got Ok"),
        Err(err) => assert_eq!(
            err.category(),
            expected,
            "Expected {expected} error, got {err}"
        ),
    }
}

/// Runs `op` and asserts it failed without touching the execution state.
pub fn assert_rejected_unchanged<F>(machine: &mut WorkflowStateMachine, op: F) -> WizardError
where
    F: FnOnce(&mut WorkflowStateMachine) -> WizardResult,
{
    let before = machine.execution_state();
    let err = match op(machine) {
        Ok(()) => panic!("Expected the operation to be rejected"),
        Err(err) => err,
    };
    assert_eq!(
        machine.state(),
        &before,
        "Rejected operation must not mutate the execution state"
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::machine_in;

    #[test]
    fn test_assert_state() {
        let machine = WorkflowStateMachine::new();
        assert_state(&machine, WizardState::Idle);
        assert_history_len(&machine, 1);
        assert_history_consistent(&machine);
    }

    #[test]
    #[should_panic(expected = "Expected state")]
    fn test_assert_state_fails() {
        let machine = WorkflowStateMachine::new();
        assert_state(&machine, WizardState::WorkflowReady);
    }

    #[test]
    fn test_assert_rejected_unchanged() {
        let mut machine = machine_in(WizardState::PromptReceived).unwrap();
        let err = assert_rejected_unchanged(&mut machine, WorkflowStateMachine::start_building);
        assert_eq!(err.category(), ErrorCategory::Guard);
    }

    #[test]
    #[should_panic(expected = "Expected the operation to be rejected")]
    fn test_assert_rejected_unchanged_fails_on_success() {
        let mut machine = WorkflowStateMachine::new();
        assert_rejected_unchanged(&mut machine, |m| m.transition_to(WizardState::PromptReceived, None));
    }
}
