//! Zone manager error types
//!
//! One taxonomy for every public operation. Collaborator failures keep their
//! own error type as payload so callers can tell a flash fault from a crypto
//! fault without string matching.

use super::serializers::SerializerError;
use crate::platform::error::{CryptoError, FlashError, PlatformError};
use core::fmt;
use dcz_core::{FormatError, VersionError};

/// Result type for zone operations
pub type Result<T> = core::result::Result<T, DczError>;

/// Errors returned by [`DeviceConfigZones`](super::DeviceConfigZones)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DczError {
    /// Header or entry bytes could not be decoded or encoded
    Format(FormatError),
    /// Resource payload does not match the checksum recorded in its entry
    Checksum,
    /// No entry with the requested name in the selected slot
    ResourceNotFound,
    /// Entry format names a serializer that is not registered
    MissingSerializer,
    /// Caller supplied an out-of-range or ill-typed argument
    InvalidArgument,
    /// No slot passed checksum validation
    NoValidZone,
    /// Selected slot failed checksum validation during the last scan
    SlotInvalid(usize),
    /// Flash collaborator failed
    Flash(FlashError),
    /// Crypto collaborator failed
    Crypto(CryptoError),
    /// Serializer rejected the payload
    Serializer(SerializerError),
}

impl fmt::Display for DczError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DczError::Format(e) => write!(f, "Format error: {}", e),
            DczError::Checksum => write!(f, "Resource checksum mismatch"),
            DczError::ResourceNotFound => write!(f, "Resource not found"),
            DczError::MissingSerializer => write!(f, "No serializer registered for format"),
            DczError::InvalidArgument => write!(f, "Invalid argument"),
            DczError::NoValidZone => write!(f, "No valid configuration zone"),
            DczError::SlotInvalid(slot) => write!(f, "Zone slot {} is invalid", slot),
            DczError::Flash(e) => write!(f, "Flash error: {:?}", e),
            DczError::Crypto(e) => write!(f, "Crypto error: {:?}", e),
            DczError::Serializer(e) => write!(f, "Serializer error: {}", e),
        }
    }
}

impl From<FormatError> for DczError {
    fn from(error: FormatError) -> Self {
        DczError::Format(error)
    }
}

impl From<VersionError> for DczError {
    fn from(error: VersionError) -> Self {
        match error {
            VersionError::NoValidZone => DczError::NoValidZone,
            VersionError::InvalidReplicationFactor | VersionError::Exhausted => {
                DczError::InvalidArgument
            }
        }
    }
}

impl From<PlatformError> for DczError {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::Flash(e) => DczError::Flash(e),
            PlatformError::Crypto(e) => DczError::Crypto(e),
            PlatformError::InvalidConfig => DczError::InvalidArgument,
        }
    }
}

impl From<FlashError> for DczError {
    fn from(error: FlashError) -> Self {
        DczError::Flash(error)
    }
}

impl From<CryptoError> for DczError {
    fn from(error: CryptoError) -> Self {
        DczError::Crypto(error)
    }
}

impl From<SerializerError> for DczError {
    fn from(error: SerializerError) -> Self {
        DczError::Serializer(error)
    }
}
