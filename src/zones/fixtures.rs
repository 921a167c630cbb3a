//! Provisioned flash images for tests
//!
//! Lays slots and payloads out the way the provisioning tool does, writing
//! them with `MockFlash::program` so write counters start at zero.

use super::{DeviceConfigZones, SerializerRegistry, ZoneConfig};
use crate::platform::mock::{MockCrypto, MockFlash};
use alloc::{vec, vec::Vec};
use dcz_core::zone::{
    checksum, encode_entry, encode_header, seal, slot_size, EncryptionFlags, FormatTag,
    ResourceEntry, ResourceName, MAX_SLOTS,
};

pub const SLOT_ADDRESSES: [u32; 2] = [0x310000, 0x311000];

pub const CERT: &[u8] = b"-----BEGIN CERTIFICATE-----MIIBszCCAVmgAwIBAgIU";
pub const WIFI: &[u8] = br#"{"psk":"changeme","ssid":"factory"}"#;
pub const BANNER: &[u8] = b"hello";

/// One resource as the provisioning tool describes it
#[derive(Clone, Copy)]
pub struct Provision<'a> {
    pub name: &'a str,
    pub format: &'a str,
    pub payload: &'a [u8],
    pub encrypt: bool,
}

pub const STANDARD: [Provision<'static>; 3] = [
    Provision {
        name: "cert",
        format: "bin",
        payload: CERT,
        encrypt: true,
    },
    Provision {
        name: "wifi",
        format: "json",
        payload: WIFI,
        encrypt: false,
    },
    Provision {
        name: "banner",
        format: "str",
        payload: BANNER,
        encrypt: false,
    },
];

/// Payload address of resource `index` in slot `slot`
///
/// Each resource gets a 4 KB sector per slot.
pub fn resource_address(index: usize, slot: usize) -> u32 {
    0x320000 + index as u32 * 0x1000 + slot as u32 * 0x10000
}

/// Build the directory entry of resource `index`
pub fn entry(index: usize, resource: &Provision<'_>, replication_factor: usize) -> ResourceEntry {
    let mut address_table = [0u32; MAX_SLOTS];
    for (slot, address) in address_table.iter_mut().enumerate().take(replication_factor) {
        *address = resource_address(index, slot);
    }

    ResourceEntry {
        name: ResourceName::try_from(resource.name).unwrap(),
        address_table,
        size: resource.payload.len() as u32,
        format: FormatTag::try_from(resource.format).unwrap(),
        checksum: checksum(resource.payload),
        flags: if resource.encrypt {
            EncryptionFlags::REQUIRED
        } else {
            EncryptionFlags::empty()
        },
    }
}

/// Build a sealed slot image
pub fn slot_image(version: u32, replication_factor: usize, resources: &[Provision<'_>]) -> Vec<u8> {
    let count = resources.len() as u8;
    let mut blob = vec![0u8; slot_size(count)];
    let size = blob.len() as u32;
    encode_header(&mut blob, size, version, count).unwrap();
    for (index, resource) in resources.iter().enumerate() {
        encode_entry(&mut blob, index, &entry(index, resource, replication_factor)).unwrap();
    }
    seal(&mut blob, replication_factor as u8).unwrap();
    blob
}

/// Program every slot in `slots` with `versions` and the given resources
pub fn provision(flash: &mut MockFlash, slots: &[u32], versions: &[u32], resources: &[Provision<'_>]) {
    for (slot, (&address, &version)) in slots.iter().zip(versions).enumerate() {
        flash.program(address, &slot_image(version, slots.len(), resources));
        for (index, resource) in resources.iter().enumerate() {
            flash.program(resource_address(index, slot), resource.payload);
        }
    }
}

/// Two slots at versions 0 and 1 holding `cert`, `wifi` and `banner`
pub fn standard_flash() -> MockFlash {
    let mut flash = MockFlash::new();
    provision(&mut flash, &SLOT_ADDRESSES, &[0, 1], &STANDARD);
    flash
}

/// Manager over `flash` with the default slot pair and serializers
pub fn zones(flash: MockFlash) -> DeviceConfigZones<MockFlash, MockCrypto> {
    DeviceConfigZones::new(
        flash,
        MockCrypto::new(),
        ZoneConfig::new(&SLOT_ADDRESSES).unwrap(),
        SerializerRegistry::with_defaults(),
    )
    .unwrap()
}
