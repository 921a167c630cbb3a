//! Device Configuration Zones
//!
//! Versioned, replicated, checksum-protected storage for device resources
//! (certificates, keys, network settings) provisioned at manufacturing time.
//!
//! A zone is a set of `replication_factor` slots at fixed flash addresses.
//! Each slot holds a directory (header plus one entry per resource); each
//! entry records where the resource's bytes live for every slot. Version `v`
//! is stored in slot `v % replication_factor`, so saving at
//! [`DeviceConfigZones::next_version`] always overwrites the oldest copy and
//! leaves the newest intact.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "mock")]
//! # {
//! use dcz::platform::mock::{MockCrypto, MockFlash};
//! use dcz::zones::{DeviceConfigZones, DczError, LoadOptions, SerializerRegistry, ZoneConfig};
//!
//! let config = ZoneConfig::new(&[0x310000, 0x311000]).unwrap();
//! let mut zones = DeviceConfigZones::new(
//!     MockFlash::new(),
//!     MockCrypto::new(),
//!     config,
//!     SerializerRegistry::with_defaults(),
//! )
//! .unwrap();
//!
//! // Erased flash holds no valid slot
//! assert_eq!(zones.latest_version(), Err(DczError::NoValidZone));
//! assert!(zones.load("cert", LoadOptions::default()).is_err());
//! # }
//! ```

pub mod config;
pub mod error;
mod introspect;
mod lifecycle;
mod resources;
pub mod serializers;
pub mod store;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod scenarios;

pub use config::ZoneConfig;
pub use error::{DczError, Result};
pub use introspect::ZoneDump;
pub use resources::{LoadOptions, ResourceLocation, SaveOptions, ZoneEntry};
pub use serializers::{
    JsonSerializer, ResourceData, Serializer, SerializerError, SerializerRegistry, StrSerializer,
};
pub use store::{SlotMeta, ZoneStore};

use crate::log_info;
use crate::platform::traits::{CryptoInterface, FlashInterface};
use dcz_core::VersionResolver;

/// Zone manager
///
/// Single owner of the flash and crypto collaborators. Every mutating
/// operation takes `&mut self`; hosts that share an instance wrap it in their
/// own mutex.
pub struct DeviceConfigZones<F: FlashInterface, C: CryptoInterface> {
    store: ZoneStore<F>,
    resolver: VersionResolver,
    crypto: C,
    serializers: SerializerRegistry,
}

impl<F: FlashInterface, C: CryptoInterface> DeviceConfigZones<F, C> {
    /// Create a manager and scan every slot
    ///
    /// Never fails because of slot contents; corrupt or erased slots are
    /// only marked invalid.
    pub fn new(
        flash: F,
        crypto: C,
        config: ZoneConfig,
        serializers: SerializerRegistry,
    ) -> Result<Self> {
        let resolver = VersionResolver::new(config.replication_factor())?;
        let mut zones = Self {
            store: ZoneStore::new(flash, config),
            resolver,
            crypto,
            serializers,
        };
        zones.recompute_latest();
        Ok(zones)
    }

    /// Re-scan every slot and recompute the latest version
    pub fn init(&mut self) {
        self.store.scan_all();
        self.recompute_latest();
    }

    /// Highest version among valid slots
    pub fn latest_version(&self) -> Result<u32> {
        Ok(self.resolver.latest_version()?)
    }

    /// Version to save at so the oldest slot is replaced
    pub fn next_version(&self) -> Result<u32> {
        Ok(self.resolver.next_version()?)
    }

    /// Number of slots
    pub fn replication_factor(&self) -> usize {
        self.resolver.replication_factor()
    }

    /// Slot holding `version`, or the latest valid slot
    pub fn slot_for(&self, version: Option<u32>) -> Result<usize> {
        Ok(self.resolver.resolve_or_latest(version)?)
    }

    /// Re-read the slot holding `version` and verify its checksum
    pub fn check_slot(&mut self, version: Option<u32>) -> Result<bool> {
        let slot = self.slot_for(version)?;
        self.store.check_slot(slot)
    }

    /// Serializer table
    pub fn serializers_mut(&mut self) -> &mut SerializerRegistry {
        &mut self.serializers
    }

    /// Underlying slot store
    pub fn store(&self) -> &ZoneStore<F> {
        &self.store
    }

    /// Flash collaborator
    pub fn flash_mut(&mut self) -> &mut F {
        self.store.flash_mut()
    }

    /// Crypto collaborator
    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    /// Release the collaborators
    pub fn into_parts(self) -> (F, C) {
        (self.store.into_flash(), self.crypto)
    }

    fn recompute_latest(&mut self) {
        self.resolver
            .recompute(self.store.slots().iter().map(SlotMeta::slot_version));

        match self.resolver.latest_version() {
            Ok(latest) => log_info!("Latest zone version {}", latest),
            Err(_) => log_info!("No valid zone slot"),
        }
    }
}
