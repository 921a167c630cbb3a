//! Resource entry format
//!
//! Each slot directory holds `entry_count` fixed-size entries right after the
//! header. Entry `j` describes the same logical resource in every slot.
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Name: [u8; 16] (null padded)           │  Offset: 0
//! ├────────────────────────────────────────┤
//! │ Address table: [u32; 8]                │  Offset: 16
//! ├────────────────────────────────────────┤
//! │ Size: u32                              │  Offset: 48
//! ├────────────────────────────────────────┤
//! │ Format: [u8; 4] (null padded)          │  Offset: 52
//! ├────────────────────────────────────────┤
//! │ Checksum: u32 (plaintext payload)      │  Offset: 56
//! ├────────────────────────────────────────┤
//! │ Requires encryption: u8                │  Offset: 60
//! │ Is encrypted: u8                       │  Offset: 61
//! │ Reserved: [u8; 2]                      │  Offset: 62
//! └────────────────────────────────────────┘
//! ```

use super::{FormatTag, ResourceName, FORMAT_LEN, HEADER_SIZE, MAX_SLOTS, NAME_LEN};
use crate::error::FormatError;
use bitflags::bitflags;

/// Size of one resource entry in bytes
pub const ENTRY_SIZE: usize = 64;

const NAME_OFFSET: usize = 0;
const ADDRESS_OFFSET: usize = 16;
const SIZE_OFFSET: usize = 48;
const FORMAT_OFFSET: usize = 52;
const CHECKSUM_OFFSET: usize = 56;
const REQUIRED_OFFSET: usize = 60;
const APPLIED_OFFSET: usize = 61;

bitflags! {
    /// Encryption state of a resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EncryptionFlags: u8 {
        /// Resource was provisioned as sensitive and must be stored encrypted
        const REQUIRED = 0b0000_0001;
        /// Resource bytes on flash are currently encrypted
        const APPLIED = 0b0000_0010;
    }
}

/// Directory record for one resource within one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Resource name, unique within a slot
    pub name: ResourceName,
    /// Payload address for each slot index (unused slots are zero)
    pub address_table: [u32; MAX_SLOTS],
    /// Payload size in bytes for this slot
    pub size: u32,
    /// Serializer tag, or `"bin"` for raw bytes
    pub format: FormatTag,
    /// Fletcher-32 of the plaintext payload
    pub checksum: u32,
    /// Encryption state
    pub flags: EncryptionFlags,
}

impl ResourceEntry {
    /// Size of entry in bytes
    pub const SIZE: usize = ENTRY_SIZE;

    /// Payload address of this resource in slot `slot`
    pub fn address(&self, slot: usize) -> Option<u32> {
        self.address_table.get(slot).copied()
    }

    /// True if the resource was provisioned as sensitive
    pub fn requires_encryption(&self) -> bool {
        self.flags.contains(EncryptionFlags::REQUIRED)
    }

    /// True if the payload on flash is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.flags.contains(EncryptionFlags::APPLIED)
    }

    /// True if flash bytes must be decrypted before use
    pub fn is_sealed(&self) -> bool {
        self.flags.contains(EncryptionFlags::REQUIRED | EncryptionFlags::APPLIED)
    }

    /// True if the resource still waits for its first-boot encryption
    pub fn is_pending_encryption(&self) -> bool {
        self.requires_encryption() && !self.is_encrypted()
    }

    /// Serialize entry to bytes (little-endian)
    ///
    /// The encrypted flag only sticks on entries that require encryption.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];

        let name = self.name.as_bytes();
        buf[NAME_OFFSET..NAME_OFFSET + name.len()].copy_from_slice(name);

        for (i, address) in self.address_table.iter().enumerate() {
            let offset = ADDRESS_OFFSET + i * 4;
            buf[offset..offset + 4].copy_from_slice(&address.to_le_bytes());
        }

        buf[SIZE_OFFSET..FORMAT_OFFSET].copy_from_slice(&self.size.to_le_bytes());

        let format = self.format.as_bytes();
        buf[FORMAT_OFFSET..FORMAT_OFFSET + format.len()].copy_from_slice(format);

        buf[CHECKSUM_OFFSET..REQUIRED_OFFSET].copy_from_slice(&self.checksum.to_le_bytes());
        buf[REQUIRED_OFFSET] = self.requires_encryption() as u8;
        buf[APPLIED_OFFSET] = self.is_sealed() as u8;
        buf
    }

    /// Deserialize entry from bytes (little-endian)
    pub fn from_bytes(buf: &[u8]) -> Result<Self, FormatError> {
        if buf.len() < Self::SIZE {
            return Err(FormatError::ShortBuffer);
        }

        let name = padded_str(&buf[NAME_OFFSET..NAME_OFFSET + NAME_LEN])
            .and_then(|s| ResourceName::try_from(s).ok())
            .ok_or(FormatError::InvalidName)?;
        let format = padded_str(&buf[FORMAT_OFFSET..FORMAT_OFFSET + FORMAT_LEN])
            .and_then(|s| FormatTag::try_from(s).ok())
            .ok_or(FormatError::InvalidFormat)?;

        let mut address_table = [0u32; MAX_SLOTS];
        for (i, address) in address_table.iter_mut().enumerate() {
            *address = read_u32(buf, ADDRESS_OFFSET + i * 4);
        }

        let mut flags = EncryptionFlags::empty();
        flags.set(EncryptionFlags::REQUIRED, buf[REQUIRED_OFFSET] != 0);
        flags.set(EncryptionFlags::APPLIED, buf[APPLIED_OFFSET] != 0);

        Ok(Self {
            name,
            address_table,
            size: read_u32(buf, SIZE_OFFSET),
            format,
            checksum: read_u32(buf, CHECKSUM_OFFSET),
            flags,
        })
    }
}

/// Decode a single entry from `buf`
pub fn decode_entry(buf: &[u8]) -> Result<ResourceEntry, FormatError> {
    ResourceEntry::from_bytes(buf)
}

/// Write `entry` into a slot image at the position of entry `index`
pub fn encode_entry(buf: &mut [u8], index: usize, entry: &ResourceEntry) -> Result<(), FormatError> {
    let offset = entry_offset(index);
    let target = buf
        .get_mut(offset..offset + ENTRY_SIZE)
        .ok_or(FormatError::ShortBuffer)?;
    target.copy_from_slice(&entry.to_bytes());
    Ok(())
}

/// Byte offset of entry `index` from the slot base address
pub const fn entry_offset(index: usize) -> usize {
    HEADER_SIZE + index * ENTRY_SIZE
}

/// Read a null-padded string field
fn padded_str(field: &[u8]) -> Option<&str> {
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    core::str::from_utf8(&field[..len]).ok()
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}
