//! Error types for the OutOfBound rule.
//!
//! All errors are strongly typed using thiserror. They never cross the
//! host plugin boundary: the `plugin` module logs them and maps them to
//! the no-op / `false` outcomes the notification service expects.

use thiserror::Error;

/// Validation errors raised while building triggers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Threshold for datapoint '{datapoint}' is not numeric")]
    NonNumericThreshold {
        datapoint: String,
    },

    #[error("Evaluation already attached to trigger for datapoint '{datapoint}'")]
    EvaluationAlreadySet {
        datapoint: String,
    },

    #[error("Asset name cannot be empty")]
    EmptyAssetName,

    #[error("Datapoint name cannot be empty")]
    EmptyDatapointName,
}

/// Errors reading the host configuration category or the rules document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration item '{item}' is missing")]
    MissingItem {
        item: String,
    },

    #[error("Invalid JSON in {context}: {message}")]
    InvalidJson {
        context: String,
        message: String,
    },

    #[error("Rules document has no 'rules' member")]
    MissingRules,

    #[error("'rules' member is not an array")]
    RulesNotArray,
}

impl ConfigError {
    pub(crate) fn invalid_json(context: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::InvalidJson {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// Top-level error type for the rule engine.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid evaluation input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl RuleError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the evaluation input was rejected.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;
