//! Fast-forward helpers built only from guarded operations.
//!
//! Each helper inspects the current state and performs the shortest legal
//! sequence of guarded operations towards its goal. Running a helper again
//! after it succeeded is a no-op. A failure part way leaves the machine in
//! whatever legal state the last successful step reached.

use super::WorkflowStateMachine;
use crate::context::WorkflowBlueprint;
use crate::core::WizardState;
use crate::errors::{WizardError, WizardResult};
use tracing::debug;

impl WorkflowStateMachine {
    /// Drives the machine to [`WizardState::WorkflowBuilding`] or later.
    ///
    /// - `Idle` / `PromptReceived`: fails, nothing is understood yet.
    /// - `ClarificationActive`: confirms the stored understanding, which must
    ///   already be set, then continues.
    /// - `UnderstandingConfirmed`: goes through credential collection when
    ///   credentials are required, then starts building.
    /// - `CredentialCollection`: starts building.
    /// - `WorkflowBuilding`, `WorkflowValidation`, `WorkflowReady`: nothing to do.
    /// - `ErrorHandling`: fails; resume clarification or reset first.
    pub fn ensure_state_for_building(&mut self) -> WizardResult {
        let from = self.current_state();
        debug!(from = %from, "Ensuring state for building");

        match from {
            WizardState::Idle | WizardState::PromptReceived => Err(WizardError::orchestration(
                from,
                WizardState::WorkflowBuilding,
                "understanding has not been established yet",
            )),
            WizardState::ClarificationActive => {
                if !self.state.has_understanding() {
                    return Err(WizardError::orchestration(
                        from,
                        WizardState::WorkflowBuilding,
                        "final understanding has not been provided",
                    ));
                }
                let understanding = self.state.final_understanding.clone();
                self.confirm_understanding(understanding)?;
                self.ensure_state_for_building()
            }
            WizardState::UnderstandingConfirmed => {
                if !self.state.credentials_required.is_empty() {
                    let required = self.state.credentials_required.clone();
                    self.set_required_credentials(required)?;
                }
                self.start_building()
            }
            WizardState::CredentialCollection => self.start_building(),
            state if state.is_building_or_later() => Ok(()),
            _ => Err(WizardError::orchestration(
                from,
                WizardState::WorkflowBuilding,
                "session is handling an error; resume clarification or reset first",
            )),
        }
    }

    /// Makes sure a build is underway, then submits `blueprint` for validation.
    pub fn move_to_validation(&mut self, blueprint: WorkflowBlueprint) -> WizardResult {
        if self.current_state() != WizardState::WorkflowBuilding {
            self.ensure_state_for_building()?;
        }
        self.set_workflow_blueprint(blueprint)
    }

    /// Drives a build in progress to [`WizardState::WorkflowReady`].
    ///
    /// From `WorkflowBuilding` the current blueprint (empty if none) is
    /// submitted for validation first. Any other state except
    /// `WorkflowValidation` fails.
    pub fn move_to_ready(&mut self) -> WizardResult {
        match self.current_state() {
            WizardState::WorkflowValidation => self.mark_workflow_ready(),
            WizardState::WorkflowBuilding => {
                let blueprint = self.state.workflow_blueprint.clone().unwrap_or_default();
                self.move_to_validation(blueprint)?;
                self.mark_workflow_ready()
            }
            from => Err(WizardError::orchestration(
                from,
                WizardState::WorkflowReady,
                "no build is in progress",
            )),
        }
    }
}
