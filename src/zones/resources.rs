//! Named resource load and save
//!
//! Saves always write in the same order: payload bytes first, then the slot
//! directory that points at them. A torn payload write therefore leaves the
//! old directory (and its checksum) in place; a torn directory write is
//! caught by the slot checksum on the next scan.

use super::error::{DczError, Result};
use super::serializers::ResourceData;
use super::DeviceConfigZones;
use crate::platform::traits::{CryptoInterface, FlashInterface};
use crate::{log_debug, log_warn};
use alloc::vec::Vec;
use dcz_core::zone::{
    checksum, decode_entry, decode_header, encode_entry, encode_header, entry_offset,
    validate_checksum, EncryptionFlags, FormatTag, ResourceEntry, ZoneHeader, BIN_FORMAT,
    FORMAT_LEN, NAME_LEN,
};

/// Options for [`DeviceConfigZones::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Version to read, or the latest valid version
    pub version: Option<u32>,
    /// Fail with [`DczError::Checksum`] if the plaintext does not match its entry
    pub verify_checksum: bool,
    /// Run the entry's serializer; otherwise return raw bytes
    pub deserialize: bool,
    /// Return plaintext; only honored together with `deserialize = false`
    pub decrypt: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            version: None,
            verify_checksum: false,
            deserialize: true,
            decrypt: true,
        }
    }
}

impl LoadOptions {
    /// Read `version` instead of the latest one
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Verify the payload checksum
    pub fn verify(mut self) -> Self {
        self.verify_checksum = true;
        self
    }

    /// Return bytes as stored, without deserializing
    pub fn raw(mut self) -> Self {
        self.deserialize = false;
        self
    }

    /// Return raw bytes in their on-flash encrypted form
    pub fn encrypted(mut self) -> Self {
        self.deserialize = false;
        self.decrypt = false;
        self
    }
}

/// Options for [`DeviceConfigZones::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions<'a> {
    /// Version to store; `None` overwrites the latest slot in place
    pub version: Option<u32>,
    /// Format tag recorded in the entry (`"bin"` for raw bytes)
    pub format: &'a str,
    /// Run the format's serializer on the data
    pub serialize: bool,
}

impl Default for SaveOptions<'_> {
    fn default() -> Self {
        Self {
            version: None,
            format: BIN_FORMAT,
            serialize: true,
        }
    }
}

impl<'a> SaveOptions<'a> {
    /// Store as `version`, rotating onto slot `version % replication_factor`
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Record `format` in the entry
    pub fn format(mut self, format: &'a str) -> Self {
        self.format = format;
        self
    }

    /// Store bytes as given, skipping the serializer
    pub fn raw(mut self) -> Self {
        self.serialize = false;
        self
    }
}

/// Entry read through [`DeviceConfigZones::get_entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Slot the entry was read from
    pub slot: usize,
    /// Entry index within the slot directory
    pub index: usize,
    /// Decoded entry
    pub entry: ResourceEntry,
}

/// Where a resource lives, as reported by [`DeviceConfigZones::search_entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    /// Payload address in the searched slot
    pub address: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Format tag
    pub format: FormatTag,
    /// Plaintext checksum
    pub checksum: u32,
    /// True if the payload on flash is encrypted
    pub encrypted: bool,
}

impl<F: FlashInterface, C: CryptoInterface> DeviceConfigZones<F, C> {
    /// Load resource `name`
    ///
    /// Encrypted payloads are decrypted with the entry checksum as context.
    /// `"bin"` resources come back as [`ResourceData::Bytes`]; other formats
    /// go through their registered serializer.
    pub fn load(&mut self, name: &str, options: LoadOptions) -> Result<ResourceData> {
        let slot = self.slot_for(options.version)?;
        if !self.store.slot(slot)?.valid {
            return Err(DczError::SlotInvalid(slot));
        }

        let (_, entry) = self.find_entry(slot, name)?;
        let address = entry.address(slot).ok_or(DczError::InvalidArgument)?;
        let mut bytes = self.store.read_resource(address, entry.size as usize)?;

        let sealed = entry.is_sealed();
        if sealed {
            self.crypto.decrypt(entry.checksum, &mut bytes)?;
        }

        if options.verify_checksum && !validate_checksum(&bytes, entry.checksum) {
            log_warn!("Resource {} failed checksum in slot {}", name, slot);
            return Err(DczError::Checksum);
        }

        if !options.deserialize {
            if sealed && !options.decrypt {
                self.crypto.encrypt(entry.checksum, &mut bytes)?;
            }
            return Ok(ResourceData::Bytes(bytes));
        }

        if entry.format.as_str() == BIN_FORMAT {
            return Ok(ResourceData::Bytes(bytes));
        }

        let serializer = self
            .serializers
            .get(&entry.format)
            .ok_or(DczError::MissingSerializer)?;
        Ok(ResourceData::Value(serializer.deserialize(&bytes)?))
    }

    /// Save resource `name`
    ///
    /// With an explicit version the slot `version % replication_factor` is
    /// rewritten and stamped with that version. Without one the latest slot
    /// is overwritten in place and keeps its version; use
    /// [`next_version`](Self::next_version) to rotate instead.
    ///
    /// Returns the payload address and the slot address written.
    pub fn save(
        &mut self,
        name: &str,
        data: impl Into<ResourceData>,
        options: SaveOptions<'_>,
    ) -> Result<(u32, u32)> {
        if name.is_empty() || name.len() > NAME_LEN || options.format.len() > FORMAT_LEN {
            return Err(DczError::InvalidArgument);
        }
        let format = FormatTag::try_from(options.format).map_err(|_| DczError::InvalidArgument)?;

        let (slot, version) = match options.version {
            Some(version) => (self.slot_for(Some(version))?, version),
            None => {
                let latest = self.latest_version()?;
                (self.slot_for(Some(latest))?, latest)
            }
        };

        let mut bytes = self.encode_payload(data.into(), options.format, options.serialize)?;
        let payload_checksum = checksum(&bytes);

        let source = self.directory_source(slot)?;
        let blob = self.store.read_slot_blob(source)?;
        let header = decode_header(&blob)?;
        let (index, mut entry) = find_in_directory(&blob, &header, name)?;

        entry.size = bytes.len() as u32;
        entry.format = format;
        entry.checksum = payload_checksum;
        if entry.requires_encryption() {
            self.crypto.encrypt(payload_checksum, &mut bytes)?;
            entry.flags.insert(EncryptionFlags::APPLIED);
        }

        if source != slot {
            self.copy_payloads(&blob, &header, index, source, slot)?;
        }

        self.commit(slot, blob, index, &entry, version, &bytes)
    }

    /// Locate resource `name` in the slot holding `version`
    pub fn search_entry(&mut self, name: &str, version: Option<u32>) -> Result<ResourceLocation> {
        let slot = self.slot_for(version)?;
        let (_, entry) = self.find_entry(slot, name)?;

        Ok(ResourceLocation {
            address: entry.address(slot).ok_or(DczError::InvalidArgument)?,
            size: entry.size,
            format: entry.format.clone(),
            checksum: entry.checksum,
            encrypted: entry.is_sealed(),
        })
    }

    /// Read the header of the slot holding `version` from flash
    pub fn get_header(&mut self, version: Option<u32>) -> Result<ZoneHeader> {
        let slot = self.slot_for(version)?;
        self.store.read_header(slot)
    }

    /// Read entry `index` of the slot holding `version` from flash
    pub fn get_entry(&mut self, index: usize, version: Option<u32>) -> Result<ZoneEntry> {
        let slot = self.slot_for(version)?;
        if index >= self.store.slot(slot)?.header.entry_count as usize {
            return Err(DczError::InvalidArgument);
        }

        Ok(ZoneEntry {
            slot,
            index,
            entry: self.store.read_entry(slot, index)?,
        })
    }

    /// Payload bytes of `entry` exactly as stored (no decryption)
    pub fn load_entry(&mut self, entry: &ZoneEntry) -> Result<Vec<u8>> {
        let address = entry
            .entry
            .address(entry.slot)
            .ok_or(DczError::InvalidArgument)?;
        self.store.read_resource(address, entry.entry.size as usize)
    }

    /// Store `bytes` as is (no encryption) for the resource `entry` describes
    ///
    /// The entry is written back with its size set to `bytes.len()`; other
    /// fields are persisted as given. Without `new_version` the entry's own
    /// slot is rewritten at its current version.
    pub fn save_entry(
        &mut self,
        entry: ZoneEntry,
        bytes: &[u8],
        new_version: Option<u32>,
    ) -> Result<(u32, u32)> {
        let (slot, version) = match new_version {
            Some(version) => (self.slot_for(Some(version))?, version),
            None => (entry.slot, self.store.slot(entry.slot)?.version()),
        };
        if !self.store.slot(slot)?.valid {
            return Err(DczError::SlotInvalid(slot));
        }
        if entry.index >= self.store.slot(slot)?.header.entry_count as usize {
            return Err(DczError::InvalidArgument);
        }

        let ZoneEntry {
            index, entry: mut record, ..
        } = entry;
        record.size = bytes.len() as u32;

        let blob = self.store.read_slot_blob(slot)?;
        self.commit(slot, blob, index, &record, version, bytes)
    }

    /// Write payload, then directory, then re-read the slot
    pub(super) fn commit(
        &mut self,
        slot: usize,
        mut blob: Vec<u8>,
        index: usize,
        entry: &ResourceEntry,
        version: u32,
        bytes: &[u8],
    ) -> Result<(u32, u32)> {
        let address = entry.address(slot).ok_or(DczError::InvalidArgument)?;
        self.store.write_resource_bytes(address, bytes)?;

        let entry_count = decode_header(&blob)?.entry_count;
        let size = blob.len() as u32;
        encode_entry(&mut blob, index, entry)?;
        encode_header(&mut blob, size, version, entry_count)?;

        // A failed verify leaves the slot invalid; latest must move off it
        let written = self.store.write_slot(slot, &mut blob);
        self.recompute_latest();
        written?;

        let slot_address = self.store.slot(slot)?.address;
        log_debug!(
            "Saved {} ({} bytes) to slot {} at version {}",
            entry.name.as_str(),
            bytes.len(),
            slot,
            version
        );
        Ok((address, slot_address))
    }

    fn find_entry(&mut self, slot: usize, name: &str) -> Result<(usize, ResourceEntry)> {
        let entry_count = self.store.slot(slot)?.header.entry_count as usize;
        for index in 0..entry_count {
            let entry = self.store.read_entry(slot, index)?;
            if entry.name.as_str() == name {
                return Ok((index, entry));
            }
        }
        Err(DczError::ResourceNotFound)
    }

    fn encode_payload(&self, data: ResourceData, format: &str, serialize: bool) -> Result<Vec<u8>> {
        if !serialize || format == BIN_FORMAT {
            return data.into_bytes().ok_or(DczError::InvalidArgument);
        }

        let serializer = self
            .serializers
            .get(format)
            .ok_or(DczError::MissingSerializer)?;
        match data {
            ResourceData::Value(value) => Ok(serializer.serialize(&value)?),
            ResourceData::Bytes(_) => Err(DczError::InvalidArgument),
        }
    }

    /// Slot whose directory a save into `slot` starts from
    ///
    /// An invalid target is rebuilt from the latest valid slot, since every
    /// slot shares the same entry list. Never returns an invalid slot.
    fn directory_source(&self, slot: usize) -> Result<usize> {
        if self.store.slot(slot)?.valid {
            return Ok(slot);
        }

        let source = self.slot_for(None)?;
        if !self.store.slot(source)?.valid {
            return Err(DczError::NoValidZone);
        }
        log_warn!("Rebuilding zone slot {} from slot {}", slot, source);
        Ok(source)
    }

    /// Copy every payload except entry `skip` from slot `from` to slot `to`
    fn copy_payloads(
        &mut self,
        blob: &[u8],
        header: &ZoneHeader,
        skip: usize,
        from: usize,
        to: usize,
    ) -> Result<()> {
        for index in (0..header.entry_count as usize).filter(|&index| index != skip) {
            let entry = decode_entry(&blob[entry_offset(index)..])?;
            let source = entry.address(from).ok_or(DczError::InvalidArgument)?;
            let target = entry.address(to).ok_or(DczError::InvalidArgument)?;
            let bytes = self.store.read_resource(source, entry.size as usize)?;
            self.store.write_resource_bytes(target, &bytes)?;
        }
        Ok(())
    }
}

fn find_in_directory(
    blob: &[u8],
    header: &ZoneHeader,
    name: &str,
) -> Result<(usize, ResourceEntry)> {
    for index in 0..header.entry_count as usize {
        let entry = decode_entry(&blob[entry_offset(index)..])?;
        if entry.name.as_str() == name {
            return Ok((index, entry));
        }
    }
    Err(DczError::ResourceNotFound)
}
