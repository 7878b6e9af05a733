//! Session data carried by the wizard.
//!
//! This module provides:
//! - The execution state aggregate owned by the state machine
//! - The plain records it carries (questions, issues, blueprint, history)

mod execution;
mod records;

pub use execution::ExecutionState;
pub use records::{ClarifyingQuestion, HistoryEntry, ValidationIssue, WorkflowBlueprint};
