//! Testing utilities for wizard sessions.
//!
//! This module provides:
//! - Fixtures that drive a machine into any state through legal operations
//! - Assertions for state, history, and rejected operations

mod assertions;
mod fixtures;

pub use assertions::{
    assert_error_category, assert_history_consistent, assert_history_len,
    assert_rejected_unchanged, assert_state,
};
pub use fixtures::{
    drive_to, machine_in, sample_answers, sample_blueprint, sample_questions, WizardFixture,
    SAMPLE_PROMPT, SAMPLE_UNDERSTANDING,
};
