//! Platform error types
//!
//! This module defines error types for the flash and crypto collaborators.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// Crypto operation failed
    Crypto(CryptoError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid address (out of bounds)
    InvalidAddress,
    /// Verify failed (data mismatch after write)
    VerifyFailed,
}

/// Crypto-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Encryption primitive failed
    EncryptFailed,
    /// Decryption primitive failed
    DecryptFailed,
    /// Device key is not provisioned
    KeyUnavailable,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {:?}", e),
            PlatformError::Crypto(e) => write!(f, "Crypto error: {:?}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

// From implementations for error conversion
impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

impl From<CryptoError> for PlatformError {
    fn from(error: CryptoError) -> Self {
        PlatformError::Crypto(error)
    }
}
