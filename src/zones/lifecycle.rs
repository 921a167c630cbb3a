//! First-boot encryption
//!
//! Resources provisioned as sensitive are written in plaintext by the
//! provisioning tool and flagged `requires_encryption`. [`finalize`] encrypts
//! them in place with the device's own key, typically once at the end of
//! line testing.
//!
//! [`finalize`]: DeviceConfigZones::finalize

use super::error::Result;
use super::DeviceConfigZones;
use crate::platform::traits::{CryptoInterface, FlashInterface};
use crate::{log_info, log_warn};
use alloc::vec::Vec;
use dcz_core::zone::{EncryptionFlags, ResourceEntry};

impl<F: FlashInterface, C: CryptoInterface> DeviceConfigZones<F, C> {
    /// Encrypt every resource still waiting for encryption
    ///
    /// Each slot is re-verified first; a slot that fails its checksum is
    /// marked invalid and skipped. Slots keep their current version. Running
    /// it again finds nothing left to do.
    ///
    /// Returns the number of payloads encrypted.
    pub fn finalize(&mut self) -> Result<usize> {
        let encrypted = self.encrypt_pending();
        self.recompute_latest();

        let encrypted = encrypted?;
        log_info!("Finalize encrypted {} resources", encrypted);
        Ok(encrypted)
    }

    fn encrypt_pending(&mut self) -> Result<usize> {
        let mut encrypted = 0;

        for slot in 0..self.store.replication_factor() {
            if !self.store.refresh_slot(slot) {
                log_warn!("Skipping invalid zone slot {}", slot);
                continue;
            }

            let pending: Vec<(usize, ResourceEntry)> = self
                .store
                .slot(slot)?
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.is_pending_encryption())
                .map(|(index, entry)| (index, entry.clone()))
                .collect();

            for (index, mut entry) in pending {
                let Some(address) = entry.address(slot) else {
                    continue;
                };
                let mut bytes = self.store.read_resource(address, entry.size as usize)?;
                self.crypto.encrypt(entry.checksum, &mut bytes)?;
                entry.flags.insert(EncryptionFlags::APPLIED);

                let version = self.store.slot(slot)?.version();
                let blob = self.store.read_slot_blob(slot)?;
                self.commit(slot, blob, index, &entry, version, &bytes)?;
                encrypted += 1;
            }
        }

        Ok(encrypted)
    }
}

#[cfg(test)]
mod tests {
    use crate::platform::error::{CryptoError, FlashError};
    use crate::platform::mock::{MockCrypto, MockFlash};
    use crate::zones::fixtures::{
        self, resource_address, zones, CERT, SLOT_ADDRESSES, STANDARD,
    };
    use crate::zones::{DczError, DeviceConfigZones, LoadOptions, SerializerRegistry, ZoneConfig};

    #[test]
    fn test_finalize_encrypts_pending_resources() {
        let mut zones = zones(fixtures::standard_flash());

        assert_eq!(zones.finalize(), Ok(2));

        for slot in 0..2 {
            let meta = &zones.store().slots()[slot];
            assert!(meta.valid);
            assert_eq!(meta.version(), slot as u32);
            assert!(meta.entries[0].is_sealed());
            assert!(!meta.entries[1].is_encrypted());

            let on_flash = zones
                .flash_mut()
                .get_contents(resource_address(0, slot), CERT.len());
            assert_ne!(on_flash, CERT);
        }

        let plain = zones.load("cert", LoadOptions::default().verify()).unwrap();
        assert_eq!(plain.as_bytes(), Some(CERT));

        let cipher = zones.load("cert", LoadOptions::default().encrypted()).unwrap();
        let on_flash = zones
            .flash_mut()
            .get_contents(resource_address(0, 1), CERT.len());
        assert_eq!(cipher.as_bytes(), Some(&on_flash[..]));
        assert_ne!(cipher.as_bytes(), Some(CERT));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut zones = zones(fixtures::standard_flash());

        assert_eq!(zones.finalize(), Ok(2));
        let writes = zones.flash_mut().write_count();
        let snapshot = zones.flash_mut().get_contents(resource_address(0, 0), CERT.len());

        assert_eq!(zones.finalize(), Ok(0));
        assert_eq!(zones.flash_mut().write_count(), writes);
        assert_eq!(
            zones.flash_mut().get_contents(resource_address(0, 0), CERT.len()),
            snapshot
        );
        assert_eq!(zones.crypto().encrypt_calls(), 2);
    }

    #[test]
    fn test_finalize_skips_corrupt_slot() {
        let mut zones = zones(fixtures::standard_flash());
        zones.flash_mut().flip_bit(SLOT_ADDRESSES[0] + 20, 2);

        assert_eq!(zones.finalize(), Ok(1));
        assert!(!zones.store().slots()[0].valid);
        assert_eq!(
            zones.flash_mut().get_contents(resource_address(0, 0), CERT.len()),
            CERT
        );
        assert_eq!(zones.latest_version(), Ok(1));
    }

    #[test]
    fn test_finalize_crypto_failure() {
        let mut crypto = MockCrypto::new();
        crypto.set_failure(true);
        let mut failing = DeviceConfigZones::new(
            fixtures::standard_flash(),
            crypto,
            ZoneConfig::new(&SLOT_ADDRESSES).unwrap(),
            SerializerRegistry::with_defaults(),
        )
        .unwrap();

        assert_eq!(
            failing.finalize(),
            Err(DczError::Crypto(CryptoError::EncryptFailed))
        );
        assert_eq!(failing.flash_mut().write_count(), 0);
        assert!(!failing.store().slots()[0].entries[0].is_encrypted());
    }

    #[test]
    fn test_finalize_torn_directory_moves_latest() {
        // cert last, so its flags sit in the half a torn write leaves behind
        let mut flash = MockFlash::new();
        let resources = [STANDARD[1], STANDARD[2], STANDARD[0]];
        fixtures::provision(&mut flash, &SLOT_ADDRESSES, &[0, 1], &resources);
        let mut zones = zones(flash);
        assert_eq!(zones.latest_version(), Ok(1));

        // Slot 0 completes; the directory write of slot 1 is torn
        zones.flash_mut().simulate_power_loss_after(3);
        assert_eq!(
            zones.finalize(),
            Err(DczError::Flash(FlashError::VerifyFailed))
        );

        assert!(zones.store().slots()[0].valid);
        assert!(!zones.store().slots()[1].valid);
        assert_eq!(zones.latest_version(), Ok(0));

        let cert = zones.load("cert", LoadOptions::default().verify()).unwrap();
        assert_eq!(cert.as_bytes(), Some(CERT));

        // Nothing left to encrypt in the surviving slot
        assert_eq!(zones.finalize(), Ok(0));
        assert_eq!(zones.latest_version(), Ok(0));
    }
}
