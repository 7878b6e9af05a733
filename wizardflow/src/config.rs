//! Configuration for the wizard state machine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("Invalid config field '{field}': {reason}")]
    InvalidField {
        /// The field name.
        field: &'static str,
        /// Why it is invalid.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How required credential names are matched against provided keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMatching {
    /// A name is satisfied by a key equal to the name or to its lowercase form.
    #[default]
    Legacy,
    /// Names and keys are compared after lowercasing and collapsing every
    /// run of non-alphanumeric characters to a single underscore, so
    /// `Google-Sheets`, `google sheets` and `GOOGLE_SHEETS` all match.
    Normalized,
}

impl CredentialMatching {
    /// Returns true if `name` is satisfied by one of the `provided` keys.
    #[must_use]
    pub fn is_provided(self, name: &str, provided: &HashMap<String, String>) -> bool {
        match self {
            Self::Legacy => {
                provided.contains_key(name) || provided.contains_key(&name.to_lowercase())
            }
            Self::Normalized => {
                let wanted = normalize_credential_name(name);
                provided
                    .keys()
                    .any(|key| normalize_credential_name(key) == wanted)
            }
        }
    }

    /// Returns the required names not satisfied by `provided`, in order.
    #[must_use]
    pub fn missing(self, required: &[String], provided: &HashMap<String, String>) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.is_provided(name, provided))
            .cloned()
            .collect()
    }
}

/// Canonical form used by [`CredentialMatching::Normalized`].
#[must_use]
pub fn normalize_credential_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

/// Configuration for a [`WorkflowStateMachine`](crate::machine::WorkflowStateMachine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Build retries allowed before `retry_building` reports exhaustion.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Credential name comparison used by `start_building`.
    #[serde(default)]
    pub credential_matching: CredentialMatching,
    /// Whether transition reasons are kept in the history.
    #[serde(default = "default_record_reasons")]
    pub record_reasons: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_record_reasons() -> bool {
    true
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            credential_matching: CredentialMatching::default(),
            record_reasons: default_record_reasons(),
        }
    }
}

impl MachineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the credential matching mode.
    #[must_use]
    pub fn with_credential_matching(mut self, matching: CredentialMatching) -> Self {
        self.credential_matching = matching;
        self
    }

    /// Sets whether reasons are recorded in the history.
    #[must_use]
    pub fn with_record_reasons(mut self, record: bool) -> Self {
        self.record_reasons = record;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries < 1 {
            return Err(ConfigError::InvalidField {
                field: "max_retries",
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
