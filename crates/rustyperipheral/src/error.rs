//! Error types for the rustyperipheral library
//!
//! Every failure is scoped to the operation that produced it; there is no
//! global error channel.

use crate::uuid::UuidParseError;
use thiserror::Error;

/// Errors returned by the peripheral's application-facing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeripheralError {
    /// Malformed input: a bad UUID, a characteristic without a UUID,
    /// an unknown status name or a value that is not valid base64
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `respond` was called with a token that is not pending
    #[error("Request with the given id does not exist: {0}")]
    UnknownRequest(String),

    /// The radio rejected the advertise request with a platform failure code
    #[error("Advertising onStartFailure: {0}")]
    AdvertiseStartFailure(i32),

    /// The radio did not report an advertise outcome in time
    #[error("Advertising start timed out")]
    AdvertiseTimeout,

    /// Another start request is still waiting for its outcome
    #[error("Advertising start already in progress")]
    AdvertisingInProgress,

    #[error("Already advertising")]
    AlreadyAdvertising,

    /// Services cannot be declared while they are being advertised
    #[error("Attribute registry is frozen while advertising")]
    RegistryFrozen,

    /// A platform radio call failed
    #[error("Radio error: {0}")]
    Radio(String),
}

impl From<UuidParseError> for PeripheralError {
    fn from(err: UuidParseError) -> Self {
        PeripheralError::InvalidArgument(format!("invalid UUID: {}", err))
    }
}

impl From<base64::DecodeError> for PeripheralError {
    fn from(err: base64::DecodeError) -> Self {
        PeripheralError::InvalidArgument(format!("invalid base64 value: {}", err))
    }
}

/// Result type for peripheral operations
pub type PeripheralResult<T> = Result<T, PeripheralError>;
