//! Public API walkthrough over the mock collaborators
//!
//! Run with `cargo test --features mock`.

#![cfg(feature = "mock")]

use dcz::platform::mock::{MockCrypto, MockFlash};
use dcz::platform::AesCtrCipher;
use dcz::zones::{DczError, LoadOptions, SaveOptions};
use dcz::{DeviceConfigZones, SerializerRegistry, ZoneConfig};

#[test]
fn test_erased_flash_reports_no_valid_zone() {
    let config = ZoneConfig::from_build_env().unwrap();
    let mut zones = DeviceConfigZones::new(
        MockFlash::new(),
        MockCrypto::new(),
        config,
        SerializerRegistry::with_defaults(),
    )
    .unwrap();

    assert_eq!(zones.latest_version(), Err(DczError::NoValidZone));
    assert_eq!(zones.next_version(), Err(DczError::NoValidZone));
    assert!(!zones.is_valid(None));
    assert!(zones.resources().is_empty());
    assert_eq!(
        zones.load("cert", LoadOptions::default()),
        Err(DczError::NoValidZone)
    );
    assert_eq!(
        zones.save("cert", &b"x"[..], SaveOptions::default()),
        Err(DczError::NoValidZone)
    );
    assert_eq!(zones.flash_mut().write_count(), 0);
}

#[test]
fn test_aes_cipher_plugs_in_as_collaborator() {
    let config = ZoneConfig::new(&[0x310000, 0x311000]).unwrap();
    let cipher = AesCtrCipher::new(*b"device-key-00001");
    let zones = DeviceConfigZones::new(
        MockFlash::new(),
        cipher,
        config,
        SerializerRegistry::new(),
    )
    .unwrap();

    assert_eq!(zones.replication_factor(), 2);
    assert!(zones.store().slots().iter().all(|slot| !slot.valid));
    // Erased headers read back as all ones
    assert_eq!(zones.versions().as_slice(), &[u32::MAX, u32::MAX]);
}
