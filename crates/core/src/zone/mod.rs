//! Zone directory binary format
//!
//! A slot is a header followed by a flat list of entries:
//!
//! ```text
//! [header: 16 bytes][entry 0: 64 bytes][entry 1: 64 bytes]...[entry n-1: 64 bytes]
//! ```
//!
//! All multi-byte integers are little-endian. The layout is shared by every
//! slot of a replica set so any slot can be read with the same codec.

pub mod checksum;
pub mod entry;
pub mod header;

pub use checksum::{checksum, validate_checksum};
pub use entry::{
    decode_entry, encode_entry, entry_offset, EncryptionFlags, ResourceEntry, ENTRY_SIZE,
};
pub use header::{decode_header, encode_header, seal, slot_checksum, ZoneHeader, HEADER_SIZE};

use heapless::String;

/// Maximum number of slots (and therefore of replicas per resource)
pub const MAX_SLOTS: usize = 8;

/// Maximum resource name length in bytes
pub const NAME_LEN: usize = 16;

/// Maximum format tag length in bytes
pub const FORMAT_LEN: usize = 4;

/// Format tag for raw, unserialized payloads
pub const BIN_FORMAT: &str = "bin";

/// Resource name as stored in an entry
pub type ResourceName = String<NAME_LEN>;

/// Serializer tag as stored in an entry
pub type FormatTag = String<FORMAT_LEN>;

/// Bytes occupied by a slot directory holding `entry_count` entries
pub const fn slot_size(entry_count: u8) -> usize {
    HEADER_SIZE + entry_count as usize * ENTRY_SIZE
}
