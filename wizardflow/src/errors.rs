//! Error types for the wizardflow state machine.
//!
//! Every rejected operation returns a [`WizardError`]. Errors fall into four
//! categories (see [`ErrorCategory`]); only [`ErrorCategory::Misuse`] means the
//! caller itself is wrong rather than the session data.

use crate::core::WizardState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Result alias used by every state machine operation.
pub type WizardResult<T = ()> = Result<T, WizardError>;

/// Broad classification of a [`WizardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The transition table does not allow the move.
    InvalidTransition,
    /// A domain precondition was not met.
    Guard,
    /// The build retry budget is spent; the caller should escalate.
    RetryExhausted,
    /// The caller invoked an operation it should never invoke in this state.
    Misuse,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition => write!(f, "invalid_transition"),
            Self::Guard => write!(f, "guard"),
            Self::RetryExhausted => write!(f, "retry_exhausted"),
            Self::Misuse => write!(f, "misuse"),
        }
    }
}

/// The error type for wizard operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The requested transition is not in the table.
    #[error("Invalid transition from {from} to {to}. Allowed transitions: {}", format_states(.allowed))]
    InvalidTransition {
        /// The current state.
        from: WizardState,
        /// The rejected target.
        to: WizardState,
        /// Every legal target from `from`.
        allowed: Vec<WizardState>,
    },

    /// Required credentials have not been provided.
    #[error("Missing required credentials: {}", .missing.join(", "))]
    MissingCredentials {
        /// Missing names, in the order they were required.
        missing: Vec<String>,
    },

    /// Building was requested before an understanding was confirmed.
    #[error("Cannot start building without a confirmed understanding")]
    EmptyUnderstanding,

    /// The blueprint still has validation errors.
    #[error("Cannot mark workflow ready: {count} validation error(s) unresolved")]
    UnresolvedValidationErrors {
        /// Number of outstanding errors.
        count: usize,
    },

    /// The blueprint has no nodes.
    #[error("Cannot mark workflow ready: blueprint has no nodes")]
    EmptyBlueprint,

    /// An orchestration helper cannot reach the requested state from here.
    #[error("Cannot reach {target} from {from}: {reason}")]
    Orchestration {
        /// The current state.
        from: WizardState,
        /// The state the helper was driving towards.
        target: WizardState,
        /// Why it is unreachable.
        reason: String,
    },

    /// Every allowed build retry has been used.
    #[error("Retry budget exhausted after {attempts} of {max} retries")]
    RetryBudgetExhausted {
        /// Retries already consumed.
        attempts: u32,
        /// Retry budget.
        max: u32,
    },

    /// An operation was called from a state the caller should never be in.
    #[error("{operation} called in {actual}; only valid in {expected}")]
    Misuse {
        /// The operation name.
        operation: &'static str,
        /// The state the operation requires.
        expected: WizardState,
        /// The state the machine was in.
        actual: WizardState,
    },
}

fn format_states(states: &[WizardState]) -> String {
    if states.is_empty() {
        return "none".to_string();
    }
    states
        .iter()
        .map(WizardState::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl WizardError {
    /// Creates an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: WizardState, to: WizardState) -> Self {
        Self::InvalidTransition {
            from,
            to,
            allowed: crate::core::allowed_targets(from),
        }
    }

    /// Creates an orchestration error.
    #[must_use]
    pub fn orchestration(from: WizardState, target: WizardState, reason: impl Into<String>) -> Self {
        Self::Orchestration {
            from,
            target,
            reason: reason.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransition { .. } => ErrorCategory::InvalidTransition,
            Self::MissingCredentials { .. }
            | Self::EmptyUnderstanding
            | Self::UnresolvedValidationErrors { .. }
            | Self::EmptyBlueprint
            | Self::Orchestration { .. } => ErrorCategory::Guard,
            Self::RetryBudgetExhausted { .. } => ErrorCategory::RetryExhausted,
            Self::Misuse { .. } => ErrorCategory::Misuse,
        }
    }

    /// Returns false for caller logic errors.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Misuse { .. })
    }

    /// Returns true if the caller should escalate with `handle_error`.
    #[must_use]
    pub const fn should_escalate(&self) -> bool {
        matches!(self, Self::RetryBudgetExhausted { .. })
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "WIZARD-001-INVALID_TRANSITION",
            Self::MissingCredentials { .. } => "WIZARD-002-MISSING_CREDENTIALS",
            Self::EmptyUnderstanding => "WIZARD-002-EMPTY_UNDERSTANDING",
            Self::UnresolvedValidationErrors { .. } => "WIZARD-002-VALIDATION_ERRORS",
            Self::EmptyBlueprint => "WIZARD-002-EMPTY_BLUEPRINT",
            Self::Orchestration { .. } => "WIZARD-002-UNREACHABLE",
            Self::RetryBudgetExhausted { .. } => "WIZARD-003-RETRY_EXHAUSTED",
            Self::Misuse { .. } => "WIZARD-004-MISUSE",
        }
    }

    /// Builds the structured diagnostic record for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let info = ErrorInfo::new(self.code(), self.to_string());
        match self {
            Self::InvalidTransition { from, to, allowed } => info
                .with_context_entry("from", from.as_str())
                .with_context_entry("to", to.as_str())
                .with_context_entry("allowed", format_states(allowed)),
            Self::MissingCredentials { missing } => info
                .with_context_entry("missing", missing.join(","))
                .with_fix_hint("Provide every required credential before building."),
            Self::EmptyUnderstanding => {
                info.with_fix_hint("Confirm the understanding before building.")
            }
            Self::UnresolvedValidationErrors { count } => info
                .with_context_entry("count", count.to_string())
                .with_fix_hint("Clear the validation errors or retry the build."),
            Self::EmptyBlueprint => info.with_fix_hint("Generate a blueprint with at least one node."),
            Self::Orchestration { from, target, .. } => info
                .with_context_entry("from", from.as_str())
                .with_context_entry("target", target.as_str()),
            Self::RetryBudgetExhausted { attempts, max } => info
                .with_context_entry("attempts", attempts.to_string())
                .with_context_entry("max", max.to_string())
                .with_fix_hint("Escalate with handle_error."),
            Self::Misuse {
                operation,
                expected,
                actual,
            } => info
                .with_context_entry("operation", *operation)
                .with_context_entry("expected", expected.as_str())
                .with_context_entry("actual", actual.as_str()),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.error_info().to_dict();
        map.insert("category".to_string(), serde_json::json!(self.category()));
        map.insert("recoverable".to_string(), serde_json::json!(self.is_recoverable()));
        map
    }
}

/// Structured diagnostics attached to an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "WIZARD-003-RETRY_EXHAUSTED").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        map
    }
}
