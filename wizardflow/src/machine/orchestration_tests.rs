//! Tests for the fast-forward helpers.

#[cfg(test)]
mod tests {
    use crate::context::{ValidationIssue, WorkflowBlueprint};
    use crate::core::WizardState;
    use crate::errors::{ErrorCategory, WizardError};
    use crate::machine::WorkflowStateMachine;
    use crate::testing::{
        assert_error_category, assert_history_consistent, assert_history_len,
        assert_rejected_unchanged, assert_state, machine_in, sample_blueprint, WizardFixture,
        SAMPLE_UNDERSTANDING,
    };
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// A machine back in clarification with an understanding already on record.
    fn resumed_with_understanding(required: &[&str]) -> WizardFixture {
        let mut fixture = WizardFixture::at(WizardState::UnderstandingConfirmed).unwrap();
        let machine = &mut fixture.machine;
        machine
            .set_required_credentials(required.iter().map(|s| (*s).to_string()).collect())
            .unwrap();
        machine.handle_error("generation timed out");
        machine
            .transition_to(WizardState::ClarificationActive, Some("resume"))
            .unwrap();
        fixture.observer.clear();
        fixture
    }

    #[test]
    fn test_ensure_fails_before_understanding() {
        for state in [WizardState::Idle, WizardState::PromptReceived] {
            let mut machine = machine_in(state).unwrap();
            let err = assert_rejected_unchanged(&mut machine, WorkflowStateMachine::ensure_state_for_building);
            assert!(matches!(err, WizardError::Orchestration { .. }), "{state}");
        }
    }

    #[test]
    fn test_ensure_from_clarification_requires_understanding() {
        let mut machine = machine_in(WizardState::ClarificationActive).unwrap();
        let err = assert_rejected_unchanged(&mut machine, WorkflowStateMachine::ensure_state_for_building);
        assert_eq!(err.category(), ErrorCategory::Guard);
    }

    #[test]
    fn test_ensure_from_clarification_without_credentials() {
        let fixture = resumed_with_understanding(&[]);
        let mut machine = fixture.machine;

        machine.ensure_state_for_building().unwrap();

        assert_state(&machine, WizardState::WorkflowBuilding);
        assert_eq!(machine.state().final_understanding(), SAMPLE_UNDERSTANDING);
        assert_eq!(
            fixture.observer.applied_path(),
            vec![
                (WizardState::ClarificationActive, WizardState::UnderstandingConfirmed),
                (WizardState::UnderstandingConfirmed, WizardState::WorkflowBuilding),
            ]
        );
        assert_history_consistent(&machine);
    }

    #[test]
    fn test_ensure_from_clarification_through_credentials() {
        let fixture = resumed_with_understanding(&["google"]);
        let mut machine = fixture.machine;
        machine.set_provided_credentials(HashMap::from([(
            "google".to_string(),
            "token".to_string(),
        )]));

        machine.ensure_state_for_building().unwrap();

        assert_state(&machine, WizardState::WorkflowBuilding);
        assert_eq!(
            fixture.observer.applied_path(),
            vec![
                (WizardState::ClarificationActive, WizardState::UnderstandingConfirmed),
                (WizardState::UnderstandingConfirmed, WizardState::CredentialCollection),
                (WizardState::CredentialCollection, WizardState::WorkflowBuilding),
            ]
        );
    }

    #[test]
    fn test_ensure_stops_at_credentials_when_missing() {
        let fixture = resumed_with_understanding(&["google"]);
        let mut machine = fixture.machine;

        let result = machine.ensure_state_for_building();
        assert_error_category(&result, ErrorCategory::Guard);
        assert_state(&machine, WizardState::CredentialCollection);

        // Resuming once the credential arrives finishes the job.
        machine.set_provided_credentials(HashMap::from([(
            "google".to_string(),
            "token".to_string(),
        )]));
        machine.ensure_state_for_building().unwrap();
        assert_state(&machine, WizardState::WorkflowBuilding);
    }

    #[test]
    fn test_ensure_is_noop_once_building() {
        for state in [
            WizardState::WorkflowBuilding,
            WizardState::WorkflowValidation,
            WizardState::WorkflowReady,
        ] {
            let fixture = WizardFixture::at(state).unwrap();
            let mut machine = fixture.machine;
            let before = machine.execution_state();

            machine.ensure_state_for_building().unwrap();

            assert_eq!(machine.state(), &before);
            assert!(fixture.observer.is_empty(), "{state}");
        }
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut machine = machine_in(WizardState::CredentialCollection).unwrap();
        machine.set_provided_credentials(HashMap::from([(
            "google".to_string(),
            "token".to_string(),
        )]));

        machine.ensure_state_for_building().unwrap();
        let len = machine.state_history().len();
        machine.ensure_state_for_building().unwrap();
        assert_history_len(&machine, len);
    }

    #[test]
    fn test_ensure_fails_while_handling_error() {
        let mut machine = machine_in(WizardState::ErrorHandling).unwrap();
        let err = assert_rejected_unchanged(&mut machine, WorkflowStateMachine::ensure_state_for_building);
        assert!(matches!(
            err,
            WizardError::Orchestration {
                from: WizardState::ErrorHandling,
                ..
            }
        ));
    }

    #[test]
    fn test_move_to_validation_from_building() {
        let mut machine = machine_in(WizardState::WorkflowBuilding).unwrap();
        machine.move_to_validation(sample_blueprint()).unwrap();
        assert_state(&machine, WizardState::WorkflowValidation);
        assert_eq!(machine.state().workflow_blueprint(), Some(&sample_blueprint()));
    }

    #[test]
    fn test_move_to_validation_fast_forwards() {
        let mut machine = machine_in(WizardState::UnderstandingConfirmed).unwrap();
        machine.move_to_validation(sample_blueprint()).unwrap();
        assert_state(&machine, WizardState::WorkflowValidation);
        assert_history_consistent(&machine);
    }

    #[test]
    fn test_move_to_validation_propagates_ensure_failure() {
        let mut machine = machine_in(WizardState::PromptReceived).unwrap();
        let err = assert_rejected_unchanged(&mut machine, |m| m.move_to_validation(sample_blueprint()));
        assert!(matches!(err, WizardError::Orchestration { .. }));
    }

    #[test]
    fn test_move_to_validation_twice_is_rejected() {
        let mut machine = machine_in(WizardState::WorkflowValidation).unwrap();
        let err = assert_rejected_unchanged(&mut machine, |m| m.move_to_validation(sample_blueprint()));
        assert_eq!(err.category(), ErrorCategory::InvalidTransition);
    }

    #[test]
    fn test_move_to_ready_from_validation() {
        let mut machine = machine_in(WizardState::WorkflowValidation).unwrap();
        machine.move_to_ready().unwrap();
        assert_state(&machine, WizardState::WorkflowReady);
    }

    #[test]
    fn test_move_to_ready_from_building_without_blueprint() {
        let mut machine = machine_in(WizardState::WorkflowBuilding).unwrap();

        let err = machine.move_to_ready().unwrap_err();
        assert_eq!(err, WizardError::EmptyBlueprint);
        assert_state(&machine, WizardState::WorkflowValidation);
        assert_eq!(machine.state().workflow_blueprint(), Some(&WorkflowBlueprint::default()));
    }

    #[test]
    fn test_move_to_ready_from_building_after_retry_and_rebuild() {
        let mut machine = machine_in(WizardState::WorkflowValidation).unwrap();
        machine.add_validation_error(ValidationIssue::new("orphan", "node unreachable"));
        assert_error_category(&machine.move_to_ready(), ErrorCategory::Guard);

        machine.retry_building().unwrap();
        machine.move_to_validation(sample_blueprint()).unwrap();
        machine.move_to_ready().unwrap();
        assert_state(&machine, WizardState::WorkflowReady);
        assert_eq!(machine.state().retry_count(), 1);
    }

    #[test]
    fn test_move_to_ready_elsewhere_fails() {
        for state in [
            WizardState::Idle,
            WizardState::ClarificationActive,
            WizardState::CredentialCollection,
            WizardState::WorkflowReady,
            WizardState::ErrorHandling,
        ] {
            let mut machine = machine_in(state).unwrap();
            let err = assert_rejected_unchanged(&mut machine, WorkflowStateMachine::move_to_ready);
            assert!(matches!(err, WizardError::Orchestration { .. }), "{state}");
        }
    }

    #[test]
    fn test_full_fast_forward_from_clarification_to_ready() {
        let fixture = resumed_with_understanding(&[]);
        let mut machine = fixture.machine;

        machine.move_to_validation(sample_blueprint()).unwrap();
        machine.move_to_ready().unwrap();

        assert_state(&machine, WizardState::WorkflowReady);
        assert!(machine.is_terminal_state());
        assert!(fixture.observer.rejected().is_empty());
    }
}
