//! Mapping between wizard states and the coarser UI step vocabulary.
//!
//! The mapping is lossy: `questioning` and `refining` both land on
//! [`WizardState::ClarificationActive`], validation shows up as `building`,
//! and [`WizardState::ErrorHandling`] shows up as `idle`.

use super::WizardState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A step in the UI wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    /// Waiting for a description.
    Idle,
    /// The description is being analyzed.
    Analyzing,
    /// Clarifying questions are shown.
    Questioning,
    /// Answers are being refined.
    Refining,
    /// The understanding is shown for confirmation.
    Confirmation,
    /// Credentials are requested.
    Credentials,
    /// The workflow is being built.
    Building,
    /// The workflow is done.
    Complete,
}

impl WizardStep {
    /// Every step.
    pub const ALL: [Self; 8] = [
        Self::Idle,
        Self::Analyzing,
        Self::Questioning,
        Self::Refining,
        Self::Confirmation,
        Self::Credentials,
        Self::Building,
        Self::Complete,
    ];

    /// Returns the lowercase step name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Questioning => "questioning",
            Self::Refining => "refining",
            Self::Confirmation => "confirmation",
            Self::Credentials => "credentials",
            Self::Building => "building",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown step name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown wizard step: '{0}'")]
pub struct UnknownWizardStep(pub String);

impl FromStr for WizardStep {
    type Err = UnknownWizardStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| UnknownWizardStep(s.to_string()))
    }
}

/// Maps an internal state to the UI step that renders it.
#[must_use]
pub const fn map_state_to_wizard_step(state: WizardState) -> WizardStep {
    match state {
        WizardState::Idle | WizardState::ErrorHandling => WizardStep::Idle,
        WizardState::PromptReceived => WizardStep::Analyzing,
        WizardState::ClarificationActive => WizardStep::Questioning,
        WizardState::UnderstandingConfirmed => WizardStep::Confirmation,
        WizardState::CredentialCollection => WizardStep::Credentials,
        WizardState::WorkflowBuilding | WizardState::WorkflowValidation => WizardStep::Building,
        WizardState::WorkflowReady => WizardStep::Complete,
    }
}

/// Maps a UI step back to the internal state it represents.
#[must_use]
pub const fn map_wizard_step_to_state(step: WizardStep) -> WizardState {
    match step {
        WizardStep::Idle => WizardState::Idle,
        WizardStep::Analyzing => WizardState::PromptReceived,
        WizardStep::Questioning | WizardStep::Refining => WizardState::ClarificationActive,
        WizardStep::Confirmation => WizardState::UnderstandingConfirmed,
        WizardStep::Credentials => WizardState::CredentialCollection,
        WizardStep::Building => WizardState::WorkflowBuilding,
        WizardStep::Complete => WizardState::WorkflowReady,
    }
}

impl From<WizardState> for WizardStep {
    fn from(state: WizardState) -> Self {
        map_state_to_wizard_step(state)
    }
}

impl From<WizardStep> for WizardState {
    fn from(step: WizardStep) -> Self {
        map_wizard_step_to_state(step)
    }
}
