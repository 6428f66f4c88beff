//! Error types for the temporal-neuron runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the temporal-neuron runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Invalid unit configuration, rejected at construction
    #[error("invalid unit configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration was rejected
        reason: String,
    },

    /// Invalid parameter value
    #[error("invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },
}

impl RuntimeError {
    /// Create an invalid-configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}
