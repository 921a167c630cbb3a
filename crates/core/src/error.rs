//! Zone error types
//!
//! Provides error types for directory decoding and version resolution.

/// Errors raised while decoding or encoding zone headers and entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Buffer is shorter than the fixed structure it must hold
    ShortBuffer,
    /// Resource name is not valid UTF-8 or does not fit 16 bytes
    InvalidName,
    /// Format tag is not valid UTF-8 or does not fit 4 bytes
    InvalidFormat,
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FormatError::ShortBuffer => write!(f, "buffer too short for zone structure"),
            FormatError::InvalidName => write!(f, "invalid resource name"),
            FormatError::InvalidFormat => write!(f, "invalid resource format tag"),
        }
    }
}

/// Errors from version resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionError {
    /// No slot passed checksum validation, so there is no latest version
    NoValidZone,
    /// Replication factor outside 1..=8
    InvalidReplicationFactor,
    /// Version counter cannot be incremented any further
    Exhausted,
}

impl core::fmt::Display for VersionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VersionError::NoValidZone => write!(f, "no valid configuration zone"),
            VersionError::InvalidReplicationFactor => write!(f, "replication factor out of range"),
            VersionError::Exhausted => write!(f, "version counter exhausted"),
        }
    }
}
