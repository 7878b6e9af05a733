//! The static transition table.
//!
//! Successor sets are `'static` slices resolved by a `const fn`, so the table
//! exists once in the binary and is never rebuilt. Entry into
//! [`WizardState::ErrorHandling`] is an implicit wildcard edge available from
//! every other state; it is reported by [`can_transition`] but not listed in
//! [`successors`].

use super::WizardState;

/// Returns the explicitly listed successors of `state`.
#[must_use]
pub const fn successors(state: WizardState) -> &'static [WizardState] {
    use WizardState::{
        ClarificationActive, CredentialCollection, ErrorHandling, Idle, PromptReceived,
        UnderstandingConfirmed, WorkflowBuilding, WorkflowReady, WorkflowValidation,
    };

    match state {
        Idle => &[PromptReceived],
        PromptReceived => &[ClarificationActive],
        // Self-loop: answers may be revised before confirming.
        ClarificationActive => &[ClarificationActive, UnderstandingConfirmed],
        // Shortcut straight to building when nothing needs credentials.
        UnderstandingConfirmed => &[CredentialCollection, WorkflowBuilding],
        CredentialCollection => &[WorkflowBuilding],
        // Backward edge: credentials discovered mid-build.
        WorkflowBuilding => &[WorkflowValidation, CredentialCollection],
        WorkflowValidation => &[WorkflowReady, WorkflowBuilding],
        WorkflowReady => &[],
        ErrorHandling => &[ClarificationActive, Idle],
    }
}

/// Returns true if the wildcard error edge applies to `from`.
#[must_use]
pub const fn is_error_edge(from: WizardState, to: WizardState) -> bool {
    matches!(to, WizardState::ErrorHandling) && !matches!(from, WizardState::ErrorHandling)
}

/// Returns true if `from -> to` is a legal transition.
#[must_use]
pub fn can_transition(from: WizardState, to: WizardState) -> bool {
    is_error_edge(from, to) || successors(from).contains(&to)
}

/// Returns every legal target from `from`, including the error edge.
#[must_use]
pub fn allowed_targets(from: WizardState) -> Vec<WizardState> {
    let mut targets = successors(from).to_vec();
    if is_error_edge(from, WizardState::ErrorHandling) {
        targets.push(WizardState::ErrorHandling);
    }
    targets
}
