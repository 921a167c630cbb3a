//! Read-only views over the cached scan state
//!
//! Nothing here touches flash or fails; call
//! [`DeviceConfigZones::init`] first to pick up external writes.

use super::store::SlotMeta;
use super::DeviceConfigZones;
use crate::platform::traits::{CryptoInterface, FlashInterface};
use alloc::vec::Vec;
use core::fmt;
use dcz_core::zone::MAX_SLOTS;

impl<F: FlashInterface, C: CryptoInterface> DeviceConfigZones<F, C> {
    /// Version recorded in each slot header, in slot order
    ///
    /// Invalid slots report whatever their header claims (zero if unreadable).
    pub fn versions(&self) -> heapless::Vec<u32, MAX_SLOTS> {
        self.store.slots().iter().map(SlotMeta::version).collect()
    }

    /// Resource names listed by the latest valid slot
    pub fn resources(&self) -> Vec<&str> {
        self.latest_slot()
            .map(|meta| {
                meta.entries
                    .iter()
                    .map(|entry| entry.name.as_str())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    /// True if the slot holding `version` (or the latest) passed validation
    pub fn is_valid(&self, version: Option<u32>) -> bool {
        self.slot_for(version)
            .ok()
            .and_then(|slot| self.store.slots().get(slot))
            .map_or(false, |meta| meta.valid)
    }

    /// Printable report of one slot (`Some(version)`) or all slots
    ///
    /// Entry details are included for valid slots when `entries` is set.
    pub fn dump(&self, version: Option<u32>, entries: bool) -> ZoneDump<'_> {
        ZoneDump {
            slots: self.store.slots(),
            only: version.map(|v| (v as usize) % self.replication_factor()),
            current: self.slot_for(None).ok(),
            entries,
        }
    }

    fn latest_slot(&self) -> Option<&SlotMeta> {
        let slot = self.slot_for(None).ok()?;
        self.store.slots().get(slot).filter(|meta| meta.valid)
    }
}

/// Slot report returned by [`DeviceConfigZones::dump`]
pub struct ZoneDump<'a> {
    slots: &'a [SlotMeta],
    only: Option<usize>,
    current: Option<usize>,
    entries: bool,
}

impl fmt::Display for ZoneDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selected = self
            .slots
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.only.map_or(true, |only| only == *slot));

        for (slot, meta) in selected {
            writeln!(f, "Zone slot {} @ {:#08x}", slot, meta.address)?;
            writeln!(f, "  version:            {}", meta.header.version)?;
            writeln!(f, "  entries:            {}", meta.header.entry_count)?;
            writeln!(f, "  size:               {}", meta.header.size)?;
            writeln!(f, "  checksum:           {:#010x}", meta.header.checksum)?;
            writeln!(f, "  replication factor: {}", meta.header.replication_factor)?;
            writeln!(f, "  valid:              {}", meta.valid)?;
            writeln!(f, "  current:            {}", self.current == Some(slot))?;

            if !self.entries || !meta.valid {
                continue;
            }
            for (index, entry) in meta.entries.iter().enumerate() {
                writeln!(f, "  [{}] {}", index, entry.name)?;
                writeln!(f, "      address:  {:#08x}", entry.address(slot).unwrap_or(0))?;
                writeln!(f, "      size:     {}", entry.size)?;
                writeln!(f, "      format:   {}", entry.format)?;
                writeln!(f, "      checksum: {:#010x}", entry.checksum)?;
                writeln!(
                    f,
                    "      encrypt:  required={} applied={}",
                    entry.requires_encryption(),
                    entry.is_sealed()
                )?;
            }
        }
        Ok(())
    }
}
