//! Unified error handling.
//!
//! Each module defines its own error enum; `Error` wraps them for callers
//! that drive several stores at once, such as the CLI.

use lecas_core::TransitionError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::refresh::SchedulerError;
use crate::storage::StorageError;
use crate::token::TokenError;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing client state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A bearer token could not be decoded.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// The refresh task could not start.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// An order status change is not allowed.
    #[error("Order status error: {0}")]
    Transition(#[from] TransitionError),

    /// Caller supplied invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Short message suitable for a user-facing toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Transition(e) => e.to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Storage(_) | Self::Token(_) | Self::Scheduler(_) => {
                "Something went wrong on this device".to_string()
            }
            Self::Config(e) => e.to_string(),
        }
    }
}

/// Result type alias for `Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use lecas_core::OrderStatus;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be positive");

        let err: Error = OrderStatus::Cancelled
            .transition(OrderStatus::Shipped)
            .unwrap_err()
            .into();
        assert_eq!(
            err.to_string(),
            "Order status error: cannot move order from cancelled to shipped"
        );
    }

    #[test]
    fn test_user_message_hides_storage_details() {
        let err: Error = StorageError::Poisoned.into();
        assert_eq!(err.user_message(), "Something went wrong on this device");
    }
}
