//! Wizard state enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A state of the workflow generation wizard.
///
/// Exactly one state is active at a time. The happy path runs from
/// [`WizardState::Idle`] to [`WizardState::WorkflowReady`]; any state can
/// escape into [`WizardState::ErrorHandling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardState {
    /// Nothing has been described yet.
    Idle,
    /// The user described the workflow they want.
    PromptReceived,
    /// Clarifying questions are being asked and answered.
    ClarificationActive,
    /// The user confirmed the final understanding of the request.
    UnderstandingConfirmed,
    /// Credentials needed by the workflow are being collected.
    CredentialCollection,
    /// A blueprint is being generated.
    WorkflowBuilding,
    /// A generated blueprint is being validated.
    WorkflowValidation,
    /// The blueprint passed validation. Terminal.
    WorkflowReady,
    /// Something went wrong; the wizard can resume clarification or restart.
    ErrorHandling,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WizardState {
    /// Every state, in pipeline order.
    pub const ALL: [Self; 9] = [
        Self::Idle,
        Self::PromptReceived,
        Self::ClarificationActive,
        Self::UnderstandingConfirmed,
        Self::CredentialCollection,
        Self::WorkflowBuilding,
        Self::WorkflowValidation,
        Self::WorkflowReady,
        Self::ErrorHandling,
    ];

    /// Returns the wire name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::PromptReceived => "PROMPT_RECEIVED",
            Self::ClarificationActive => "CLARIFICATION_ACTIVE",
            Self::UnderstandingConfirmed => "UNDERSTANDING_CONFIRMED",
            Self::CredentialCollection => "CREDENTIAL_COLLECTION",
            Self::WorkflowBuilding => "WORKFLOW_BUILDING",
            Self::WorkflowValidation => "WORKFLOW_VALIDATION",
            Self::WorkflowReady => "WORKFLOW_READY",
            Self::ErrorHandling => "ERROR_HANDLING",
        }
    }

    /// Returns true for [`WizardState::WorkflowReady`] and [`WizardState::ErrorHandling`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::WorkflowReady | Self::ErrorHandling)
    }

    /// Returns true once a blueprint build has started.
    #[must_use]
    pub const fn is_building_or_later(&self) -> bool {
        matches!(
            self,
            Self::WorkflowBuilding | Self::WorkflowValidation | Self::WorkflowReady
        )
    }
}
