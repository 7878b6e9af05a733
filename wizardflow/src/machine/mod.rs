//! The workflow wizard state machine.
//!
//! This module provides:
//! - [`WorkflowStateMachine`], the guarded operation set over one session
//! - Orchestration helpers that fast-forward a session through legal steps

mod controller;
mod orchestration;
#[cfg(test)]
mod orchestration_tests;

pub use controller::WorkflowStateMachine;
