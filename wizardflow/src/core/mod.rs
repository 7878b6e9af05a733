//! Core domain model types for wizardflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The wizard state enum
//! - The static transition table
//! - The mapping onto the UI wizard step vocabulary

mod state;
pub mod transitions;
mod wizard_step;

pub use state::WizardState;
pub use transitions::{allowed_targets, can_transition, successors};
pub use wizard_step::{
    map_state_to_wizard_step, map_wizard_step_to_state, UnknownWizardStep, WizardStep,
};
