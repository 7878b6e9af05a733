//! # Wizardflow
//!
//! A guarded state machine for conversational workflow-generation wizards.
//!
//! A wizard session moves from a free-text prompt, through clarifying
//! questions and credential collection, to a validated workflow blueprint.
//! Wizardflow owns that lifecycle:
//!
//! - **Closed transition table**: every state change is checked against a
//!   static successor list, with an error-handling escape from any state
//! - **Guarded operations**: each operation records its data and moves the
//!   session only when its preconditions hold
//! - **Append-only history**: every applied transition is timestamped
//! - **Observability**: every attempt, applied or rejected, reaches a
//!   pluggable observer that can log, collect, or forward events
//!
//! ## Quick Start
//!
//! ```rust
//! use wizardflow::prelude::*;
//!
//! let mut machine = WorkflowStateMachine::new();
//! machine.set_user_prompt("Post new Gmail invoices to Slack")?;
//! machine.set_clarifying_questions(vec![ClarifyingQuestion::new("channel", "Which channel?")])?;
//! machine.confirm_understanding("Forward invoice summaries to #billing")?;
//! machine.start_building()?;
//! machine.move_to_validation(WorkflowBlueprint::new().with_nodes(vec![serde_json::json!({"id": "trigger"})]))?;
//! machine.move_to_ready()?;
//!
//! assert!(machine.is_terminal_state());
//! assert_eq!(machine.wizard_step(), WizardStep::Complete);
//! # Ok::<(), WizardError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod machine;
pub mod observability;
#[cfg(feature = "sessions")]
pub mod session;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{CredentialMatching, MachineConfig};
    pub use crate::context::{
        ClarifyingQuestion, ExecutionState, HistoryEntry, ValidationIssue, WorkflowBlueprint,
    };
    pub use crate::core::{
        map_state_to_wizard_step, map_wizard_step_to_state, WizardState, WizardStep,
    };
    pub use crate::errors::{ErrorCategory, WizardError, WizardResult};
    pub use crate::events::{
        CollectingObserver, EventSink, TracingObserver, TransitionAttempt, TransitionObserver,
        WizardEvent,
    };
    pub use crate::machine::WorkflowStateMachine;
    #[cfg(feature = "sessions")]
    pub use crate::session::{SessionRegistry, SharedMachine};
}
