//! Flash interface trait
//!
//! This module defines the Flash storage interface that platform implementations must provide.
//! Flash holds the zone directories and every resource payload they point at.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for raw Flash access.
///
/// # Guarantees Expected
///
/// - A completed write is durable
/// - A read after a completed write returns what was written
/// - Nothing else: writes may tear on power loss and are not atomic
///
/// Sector erase is the implementation's business. Zone addresses and resource
/// addresses must be planned so that no two of them share an erase sector;
/// this is a provisioning constraint and is not checked at runtime.
///
/// # Safety Invariants
///
/// - Only one owner per Flash instance (no concurrent access)
/// - The zone manager assumes exclusive ownership of its configured ranges
///
/// # Memory Layout (example)
///
/// ```text
/// [Zone slot 0]        0x310000 - 0x311000 (4 KB)
/// [Zone slot 1]        0x311000 - 0x312000 (4 KB)
/// [Resource replicas]  0x320000 - ...      (one sector per resource per slot)
/// ```
pub trait FlashInterface {
    /// Read data from Flash
    ///
    /// Reads `buf.len()` bytes from Flash starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write data to Flash
    ///
    /// Writes `data` to Flash starting at `address`, erasing as the device requires.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;
}
