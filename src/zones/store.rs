//! Flash-backed slot store
//!
//! Owns the flash collaborator and the per-slot cache built by scanning.
//! Scanning never fails: a slot that cannot be read, decoded or checksummed
//! is recorded as invalid and the remaining slots keep serving requests.
//!
//! # Slot Image
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Header (16 bytes)                             │  Offset: 0
//! │   checksum covers every byte after offset 4   │
//! ├───────────────────────────────────────────────┤
//! │ Entry 0 (64 bytes)                            │  Offset: 16
//! ├───────────────────────────────────────────────┤
//! │ ...                                           │
//! ├───────────────────────────────────────────────┤
//! │ Entry n-1 (64 bytes)                          │  Offset: 16 + 64 * (n-1)
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Resource payloads live elsewhere on flash, at the per-slot addresses each
//! entry records.

use super::config::ZoneConfig;
use super::error::{DczError, Result};
use crate::platform::error::FlashError;
use crate::platform::traits::FlashInterface;
use crate::{log_debug, log_info, log_warn};
use alloc::{vec, vec::Vec};
use dcz_core::zone::{
    decode_entry, decode_header, entry_offset, seal, slot_checksum, slot_size, ResourceEntry,
    ZoneHeader, ENTRY_SIZE, HEADER_SIZE, MAX_SLOTS,
};
use dcz_core::SlotVersion;

/// Cached scan state of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMeta {
    /// Slot base address
    pub address: u32,
    /// Header as read from flash (zeroed if it could not be read)
    pub header: ZoneHeader,
    /// True if the slot passed checksum validation
    pub valid: bool,
    /// Decoded entries (empty for invalid slots)
    pub entries: Vec<ResourceEntry>,
}

impl SlotMeta {
    fn unreadable(address: u32) -> Self {
        Self {
            address,
            header: ZoneHeader::default(),
            valid: false,
            entries: Vec::new(),
        }
    }

    /// Version stored in this slot
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Version and validity as seen by the version resolver
    pub fn slot_version(&self) -> SlotVersion {
        SlotVersion {
            version: self.header.version,
            valid: self.valid,
        }
    }

    /// Cached entry named `name`, with its index
    pub fn find(&self, name: &str) -> Option<(usize, &ResourceEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name.as_str() == name)
    }
}

/// Slot store over a flash collaborator
pub struct ZoneStore<F: FlashInterface> {
    flash: F,
    config: ZoneConfig,
    slots: heapless::Vec<SlotMeta, MAX_SLOTS>,
}

impl<F: FlashInterface> ZoneStore<F> {
    /// Create a store and scan every configured slot
    pub fn new(flash: F, config: ZoneConfig) -> Self {
        let mut store = Self {
            flash,
            config,
            slots: heapless::Vec::new(),
        };
        store.scan_all();
        store
    }

    /// Number of configured slots
    pub fn replication_factor(&self) -> usize {
        self.config.replication_factor()
    }

    /// Cached state of every slot, in slot order
    pub fn slots(&self) -> &[SlotMeta] {
        &self.slots
    }

    /// Cached state of slot `slot`
    pub fn slot(&self, slot: usize) -> Result<&SlotMeta> {
        self.slots.get(slot).ok_or(DczError::InvalidArgument)
    }

    /// Flash collaborator
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Flash collaborator, mutably
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the flash collaborator
    pub fn into_flash(self) -> F {
        self.flash
    }

    /// Re-read every slot and rebuild the cache
    pub fn scan_all(&mut self) {
        self.slots.clear();
        for slot in 0..self.replication_factor() {
            let meta = self.scan_slot(slot);
            // Capacity equals the maximum replication factor
            self.slots.push(meta).ok();
        }

        let valid = self.slots.iter().filter(|slot| slot.valid).count();
        log_info!(
            "Scanned {} zone slots, {} valid",
            self.replication_factor(),
            valid
        );
    }

    /// Re-read slot `slot` and update its cache entry
    ///
    /// Returns the new validity.
    pub fn refresh_slot(&mut self, slot: usize) -> bool {
        if slot >= self.slots.len() {
            return false;
        }
        let meta = self.scan_slot(slot);
        let valid = meta.valid;
        self.slots[slot] = meta;
        valid
    }

    /// Read slot `slot` from flash and verify its checksum
    ///
    /// Unlike the cached validity, this always touches flash. The cache is
    /// left as is.
    pub fn check_slot(&mut self, slot: usize) -> Result<bool> {
        let address = self.slot_address(slot)?;
        let (header, blob) = self.load_image(address)?;
        Ok(slot_checksum(&blob)? == header.checksum)
    }

    /// Read the header of slot `slot` from flash
    pub fn read_header(&mut self, slot: usize) -> Result<ZoneHeader> {
        let address = self.slot_address(slot)?;
        let mut raw = [0u8; HEADER_SIZE];
        self.flash.read(address, &mut raw)?;
        Ok(decode_header(&raw)?)
    }

    /// Read entry `index` of slot `slot` from flash
    pub fn read_entry(&mut self, slot: usize, index: usize) -> Result<ResourceEntry> {
        let address = self.slot_address(slot)?;
        let mut raw = [0u8; ENTRY_SIZE];
        let address = u32::try_from(entry_offset(index))
            .ok()
            .and_then(|offset| address.checked_add(offset))
            .ok_or(FlashError::InvalidAddress)?;
        self.flash.read(address, &mut raw)?;
        Ok(decode_entry(&raw)?)
    }

    /// Read header and entries of slot `slot` as one image
    ///
    /// The image length follows the cached entry count.
    pub fn read_slot_blob(&mut self, slot: usize) -> Result<Vec<u8>> {
        let meta = self.slot(slot)?;
        let (address, entry_count) = (meta.address, meta.header.entry_count);
        let mut blob = vec![0u8; slot_size(entry_count)];
        self.flash.read(address, &mut blob)?;
        Ok(blob)
    }

    /// Read `len` payload bytes at `address`
    pub fn read_resource(&mut self, address: u32, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.flash.read(address, &mut bytes)?;
        Ok(bytes)
    }

    /// Write payload bytes at `address`
    pub fn write_resource_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<()> {
        self.flash.write(address, bytes)?;
        log_debug!("Wrote {} resource bytes at {}", bytes.len(), address);
        Ok(())
    }

    /// Seal and write a complete slot image, then re-read it
    ///
    /// Fails with `FlashError::VerifyFailed` if the slot does not validate
    /// after the write.
    pub fn write_slot(&mut self, slot: usize, blob: &mut [u8]) -> Result<()> {
        let address = self.slot_address(slot)?;
        seal(blob, self.replication_factor() as u8)?;
        self.flash.write(address, blob)?;

        if !self.refresh_slot(slot) {
            log_warn!("Zone slot {} failed verification after write", slot);
            return Err(FlashError::VerifyFailed.into());
        }
        Ok(())
    }

    fn slot_address(&self, slot: usize) -> Result<u32> {
        self.config.address(slot).ok_or(DczError::InvalidArgument)
    }

    fn load_image(&mut self, address: u32) -> Result<(ZoneHeader, Vec<u8>)> {
        let mut raw = [0u8; HEADER_SIZE];
        self.flash.read(address, &mut raw)?;
        let header = decode_header(&raw)?;

        let mut blob = vec![0u8; slot_size(header.entry_count)];
        self.flash.read(address, &mut blob)?;
        Ok((header, blob))
    }

    fn scan_slot(&mut self, slot: usize) -> SlotMeta {
        let Some(address) = self.config.address(slot) else {
            return SlotMeta::unreadable(0);
        };

        let (header, blob) = match self.load_image(address) {
            Ok(image) => image,
            Err(_) => {
                log_warn!("Zone slot {} unreadable", slot);
                return SlotMeta::unreadable(address);
            }
        };

        let mut meta = SlotMeta {
            address,
            header,
            valid: false,
            entries: Vec::new(),
        };

        if slot_checksum(&blob).ok() != Some(header.checksum) {
            log_warn!("Zone slot {} failed checksum", slot);
            return meta;
        }

        let entries: core::result::Result<Vec<_>, _> = (0..header.entry_count as usize)
            .map(|index| decode_entry(&blob[entry_offset(index)..]))
            .collect();
        match entries {
            Ok(entries) => meta.entries = entries,
            Err(_) => {
                log_warn!("Zone slot {} has undecodable entries", slot);
                return meta;
            }
        }

        if header.replication_factor as usize != self.replication_factor() {
            log_warn!(
                "Zone slot {} records replication factor {}, configured {}",
                slot,
                header.replication_factor,
                self.replication_factor()
            );
        }

        meta.valid = true;
        log_debug!(
            "Zone slot {} valid: version {}, {} entries",
            slot,
            header.version,
            header.entry_count
        );
        meta
    }
}
