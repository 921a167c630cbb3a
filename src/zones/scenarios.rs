//! End-to-end device scenarios over provisioned mock flash

use super::fixtures::{self, resource_address, zones, CERT, SLOT_ADDRESSES, STANDARD};
use super::{DczError, DeviceConfigZones, LoadOptions, SaveOptions, SerializerRegistry, ZoneConfig};
use crate::platform::mock::{MockCrypto, MockFlash};
use serde_json::json;

#[test]
fn test_version_resolution_is_modulo() {
    let zones = zones(fixtures::standard_flash());
    for version in 0..20u32 {
        assert_eq!(zones.slot_for(Some(version)), Ok(version as usize % 2));
    }
    assert_eq!(zones.slot_for(None), Ok(1));
}

#[test]
fn test_rotation_with_two_slots() {
    let mut zones = zones(fixtures::standard_flash());
    assert_eq!(zones.versions().as_slice(), &[0, 1]);

    zones
        .save("banner", json!("v2"), SaveOptions::default().version(2).format("str"))
        .unwrap();
    assert_eq!(zones.versions().as_slice(), &[2, 1]);
    assert_eq!(zones.latest_version(), Ok(2));
    assert_eq!(zones.slot_for(None), Ok(0));

    let next = zones.next_version().unwrap();
    zones
        .save("banner", json!("v3"), SaveOptions::default().version(next).format("str"))
        .unwrap();
    assert_eq!(zones.versions().as_slice(), &[2, 3]);

    let latest = zones.load("banner", LoadOptions::default()).unwrap();
    assert_eq!(latest.as_value(), Some(&json!("v3")));
    let previous = zones.load("banner", LoadOptions::default().version(2)).unwrap();
    assert_eq!(previous.as_value(), Some(&json!("v2")));
}

#[test]
fn test_corrupt_slot_isolation() {
    let mut flash = fixtures::standard_flash();
    flash.flip_bit(SLOT_ADDRESSES[0], 0);
    let mut zones = zones(flash);

    assert!(!zones.is_valid(Some(0)));
    assert_eq!(zones.latest_version(), Ok(1));

    let wifi = zones.load("wifi", LoadOptions::default().verify()).unwrap();
    assert_eq!(wifi.as_value(), Some(&json!({ "ssid": "factory", "psk": "changeme" })));

    zones
        .save("wifi", json!({ "ssid": "field" }), SaveOptions::default().format("json"))
        .unwrap();
    let wifi = zones.load("wifi", LoadOptions::default()).unwrap();
    assert_eq!(wifi.as_value(), Some(&json!({ "ssid": "field" })));
    assert!(!zones.is_valid(Some(0)));
}

#[test]
fn test_torn_rotation_falls_back_to_previous_version() {
    let mut zones = zones(fixtures::standard_flash());
    zones
        .save("banner", json!("new"), SaveOptions::default().version(2).format("str"))
        .unwrap();

    // Directory write of version 2 torn by a power cut
    zones.flash_mut().inject_corruption(SLOT_ADDRESSES[0] + 40, 8);
    zones.init();

    assert_eq!(zones.latest_version(), Ok(1));
    let banner = zones.load("banner", LoadOptions::default().verify()).unwrap();
    assert_eq!(banner.as_value(), Some(&json!("hello")));
}

#[test]
fn test_device_lifecycle_across_reboots() {
    // Factory: provisioned plaintext, then finalized on first boot
    let mut zones = zones(fixtures::standard_flash());
    assert_eq!(zones.finalize(), Ok(2));
    let (flash, _) = zones.into_parts();

    // Reboot with a fresh crypto instance using the same device key
    let mut zones = DeviceConfigZones::new(
        flash,
        MockCrypto::new(),
        ZoneConfig::new(&SLOT_ADDRESSES).unwrap(),
        SerializerRegistry::with_defaults(),
    )
    .unwrap();
    assert_eq!(zones.finalize(), Ok(0));

    let cert = zones.load("cert", LoadOptions::default().verify()).unwrap();
    assert_eq!(cert.as_bytes(), Some(CERT));

    // Field update rotates onto the oldest slot
    let renewed = b"-----BEGIN CERTIFICATE-----renewed-in-field";
    let next = zones.next_version().unwrap();
    zones
        .save("cert", &renewed[..], SaveOptions::default().version(next))
        .unwrap();
    let (flash, _) = zones.into_parts();

    let mut zones = DeviceConfigZones::new(
        flash,
        MockCrypto::new(),
        ZoneConfig::new(&SLOT_ADDRESSES).unwrap(),
        SerializerRegistry::with_defaults(),
    )
    .unwrap();
    assert_eq!(zones.latest_version(), Ok(2));
    let cert = zones.load("cert", LoadOptions::default().verify()).unwrap();
    assert_eq!(cert.as_bytes(), Some(&renewed[..]));

    let stored = zones.flash_mut().get_contents(resource_address(0, 0), renewed.len());
    assert_ne!(stored, renewed);
    let old = zones.load("cert", LoadOptions::default().version(1)).unwrap();
    assert_eq!(old.as_bytes(), Some(CERT));
}

#[test]
fn test_init_picks_up_external_provisioning() {
    let mut zones = zones(MockFlash::new());
    assert_eq!(zones.latest_version(), Err(DczError::NoValidZone));

    fixtures::provision(zones.flash_mut(), &SLOT_ADDRESSES, &[4, 5], &STANDARD);
    assert_eq!(zones.latest_version(), Err(DczError::NoValidZone));

    zones.init();
    assert_eq!(zones.latest_version(), Ok(5));
    assert_eq!(zones.next_version(), Ok(6));
    assert_eq!(zones.resources(), ["cert", "wifi", "banner"]);
}

#[test]
fn test_single_slot_zone() {
    let mut flash = MockFlash::new();
    fixtures::provision(&mut flash, &SLOT_ADDRESSES[..1], &[7], &STANDARD);
    let mut zones = DeviceConfigZones::new(
        flash,
        MockCrypto::new(),
        ZoneConfig::new(&SLOT_ADDRESSES[..1]).unwrap(),
        SerializerRegistry::with_defaults(),
    )
    .unwrap();

    assert_eq!(zones.latest_version(), Ok(7));
    zones
        .save("banner", json!("only"), SaveOptions::default().version(8).format("str"))
        .unwrap();
    assert_eq!(zones.versions().as_slice(), &[8]);
    let banner = zones.load("banner", LoadOptions::default()).unwrap();
    assert_eq!(banner.as_value(), Some(&json!("only")));
}
