#![cfg_attr(not(test), no_std)]

//! dcz - Device Configuration Zones for embedded flash
//!
//! Versioned, replicated, checksum-protected storage of device resources
//! (certificates, keys, network settings) at fixed flash addresses, with
//! first-boot encryption of sensitive resources.
//!
//! The wire format, checksum and version resolution live in the pure
//! `dcz_core` crate; this crate adds the flash and crypto collaborators and
//! the zone manager built on them.

extern crate alloc;

// Platform abstraction layer (flash and crypto collaborators)
pub mod platform;

// Logging macros
pub mod core;

// Zone manager
pub mod zones;

pub use dcz_core::zone::{EncryptionFlags, ResourceEntry, ZoneHeader};
pub use zones::{
    DczError, DeviceConfigZones, LoadOptions, ResourceData, SaveOptions, SerializerRegistry,
    ZoneConfig,
};
