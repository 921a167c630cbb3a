//! Zone header format
//!
//! The header sits at the base address of every slot and describes the
//! directory that follows it.
//!
//! ```text
//! ┌────────────────────────────────┐
//! │ Checksum: u32                  │  Offset: 0
//! ├────────────────────────────────┤
//! │ Size: u32 (header + entries)   │  Offset: 4
//! ├────────────────────────────────┤
//! │ Version: u32                   │  Offset: 8
//! ├────────────────────────────────┤
//! │ Entry count: u8                │  Offset: 12
//! │ Replication factor: u8         │  Offset: 13
//! │ Reserved: [u8; 2]              │  Offset: 14
//! └────────────────────────────────┘
//! ```

use crate::error::FormatError;

/// Size of the zone header in bytes
pub const HEADER_SIZE: usize = 16;

const CHECKSUM_OFFSET: usize = 0;
const SIZE_OFFSET: usize = 4;
const VERSION_OFFSET: usize = 8;
const ENTRY_COUNT_OFFSET: usize = 12;
const REPLICATION_OFFSET: usize = 13;

/// Decoded zone header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneHeader {
    /// Fletcher-32 over every slot byte after this field
    pub checksum: u32,
    /// Bytes occupied by header and entries
    pub size: u32,
    /// Version stored in this slot
    pub version: u32,
    /// Number of resource entries following the header
    pub entry_count: u8,
    /// Number of configured slots, identical in every slot
    pub replication_factor: u8,
}

impl ZoneHeader {
    /// Size of header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Serialize header to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[CHECKSUM_OFFSET..SIZE_OFFSET].copy_from_slice(&self.checksum.to_le_bytes());
        buf[SIZE_OFFSET..VERSION_OFFSET].copy_from_slice(&self.size.to_le_bytes());
        buf[VERSION_OFFSET..ENTRY_COUNT_OFFSET].copy_from_slice(&self.version.to_le_bytes());
        buf[ENTRY_COUNT_OFFSET] = self.entry_count;
        buf[REPLICATION_OFFSET] = self.replication_factor;
        buf
    }

    /// Deserialize header from bytes (little-endian)
    pub fn from_bytes(buf: &[u8]) -> Result<Self, FormatError> {
        if buf.len() < Self::SIZE {
            return Err(FormatError::ShortBuffer);
        }

        Ok(Self {
            checksum: read_u32(buf, CHECKSUM_OFFSET),
            size: read_u32(buf, SIZE_OFFSET),
            version: read_u32(buf, VERSION_OFFSET),
            entry_count: buf[ENTRY_COUNT_OFFSET],
            replication_factor: buf[REPLICATION_OFFSET],
        })
    }
}

/// Decode the header at the start of `buf`
pub fn decode_header(buf: &[u8]) -> Result<ZoneHeader, FormatError> {
    ZoneHeader::from_bytes(buf)
}

/// Rewrite size, version and entry count of the header at the start of `buf`
///
/// Checksum and replication factor are left untouched; the zone store stamps
/// them with [`seal`] right before writing the slot.
pub fn encode_header(
    buf: &mut [u8],
    total_size: u32,
    version: u32,
    entry_count: u8,
) -> Result<(), FormatError> {
    if buf.len() < HEADER_SIZE {
        return Err(FormatError::ShortBuffer);
    }

    buf[SIZE_OFFSET..VERSION_OFFSET].copy_from_slice(&total_size.to_le_bytes());
    buf[VERSION_OFFSET..ENTRY_COUNT_OFFSET].copy_from_slice(&version.to_le_bytes());
    buf[ENTRY_COUNT_OFFSET] = entry_count;
    Ok(())
}

/// Stamp replication factor and checksum into a complete slot image
///
/// Returns the checksum written at offset 0.
pub fn seal(buf: &mut [u8], replication_factor: u8) -> Result<u32, FormatError> {
    if buf.len() < HEADER_SIZE {
        return Err(FormatError::ShortBuffer);
    }

    buf[REPLICATION_OFFSET] = replication_factor;
    let checksum = slot_checksum(buf)?;
    buf[CHECKSUM_OFFSET..SIZE_OFFSET].copy_from_slice(&checksum.to_le_bytes());
    Ok(checksum)
}

/// Recompute the checksum of a slot image (everything after the checksum field)
pub fn slot_checksum(buf: &[u8]) -> Result<u32, FormatError> {
    if buf.len() < HEADER_SIZE {
        return Err(FormatError::ShortBuffer);
    }
    Ok(super::checksum(&buf[SIZE_OFFSET..]))
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
