use std::fmt::Display;

use anyhow::Error;
use thiserror::Error;

use crate::error::WrapError;

/// The engine was used incorrectly.
///
/// Raised for operations called in the wrong field state, illegal commands returned by trainers,
/// and handles that do not refer to anything. The engine never recovers from these internally.
#[derive(Error, Debug)]
#[error("illegal usage: {message}")]
pub struct IllegalUsageError {
    message: String,
}

impl IllegalUsageError {
    /// Constructs a new illegal usage error.
    pub fn new<M>(message: M) -> Self
    where
        M: Display,
    {
        Self {
            message: message.to_string(),
        }
    }

    /// The message describing the misuse.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A not found error.
#[derive(Error, Debug)]
#[error("{target} not found")]
pub struct NotFoundError {
    target: String,
}

impl NotFoundError {
    /// Constructs a new not found error.
    pub fn new<M>(target: M) -> Self
    where
        M: Display,
    {
        Self {
            target: target.to_string(),
        }
    }
}

/// Helper for an [`struct@Error`] wrapping an [`IllegalUsageError`].
#[track_caller]
pub fn illegal_usage<M>(message: M) -> Error
where
    M: Display,
{
    IllegalUsageError::new(message).wrap_error()
}

/// Helper for an [`struct@Error`] wrapping a [`NotFoundError`].
#[track_caller]
pub fn not_found_error<M>(target: M) -> Error
where
    M: Display,
{
    NotFoundError::new(target).wrap_error()
}
