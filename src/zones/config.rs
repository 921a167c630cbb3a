//! Zone slot configuration
//!
//! The slot list is the only runtime configuration the manager needs. Its
//! length is the replication factor, so the same list must be used by the
//! provisioning tool and by every boot of the device.
//!
//! A default list is baked in at build time from `DCZ_SLOT_ADDRESSES` (see
//! `build.rs`); applications with a board-specific layout pass their own.

use super::error::{DczError, Result};
use dcz_core::zone::MAX_SLOTS;
use heapless::Vec;

/// Slot addresses baked in by `build.rs`
pub const DEFAULT_SLOT_ADDRESSES: &str = env!("DCZ_SLOT_ADDRESSES");

/// Validated list of slot base addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    addresses: Vec<u32, MAX_SLOTS>,
}

impl ZoneConfig {
    /// Build a configuration from 1 to 8 strictly ascending addresses
    pub fn new(addresses: &[u32]) -> Result<Self> {
        if addresses.is_empty() || addresses.len() > MAX_SLOTS {
            return Err(DczError::InvalidArgument);
        }
        if addresses.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DczError::InvalidArgument);
        }

        let addresses = Vec::from_slice(addresses).map_err(|_| DczError::InvalidArgument)?;
        Ok(Self { addresses })
    }

    /// Parse a comma separated address list (`0x` hex or decimal)
    pub fn parse(list: &str) -> Result<Self> {
        let mut addresses: Vec<u32, MAX_SLOTS> = Vec::new();

        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            addresses
                .push(parse_address(item)?)
                .map_err(|_| DczError::InvalidArgument)?;
        }

        Self::new(&addresses)
    }

    /// Configuration baked in at build time
    pub fn from_build_env() -> Result<Self> {
        Self::parse(DEFAULT_SLOT_ADDRESSES)
    }

    /// Slot base addresses in slot order
    pub fn addresses(&self) -> &[u32] {
        &self.addresses
    }

    /// Base address of slot `slot`
    pub fn address(&self, slot: usize) -> Option<u32> {
        self.addresses.get(slot).copied()
    }

    /// Number of slots
    pub fn replication_factor(&self) -> usize {
        self.addresses.len()
    }
}

fn parse_address(text: &str) -> Result<u32> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| DczError::InvalidArgument)
}
