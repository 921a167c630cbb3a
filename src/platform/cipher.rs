//! AES-128-CTR crypto collaborator
//!
//! Counter mode keeps ciphertext the same length as plaintext, so encrypted
//! payloads fit the space provisioned for them. The 16-byte counter block is:
//!
//! ```text
//! [nonce prefix: 8 bytes][context: u32 LE][block counter: u32 BE]
//! ```
//!
//! The context is the resource's plaintext checksum, so two resources only
//! share a keystream when their plaintexts checksum identically.

use crate::platform::{error::CryptoError, traits::CryptoInterface, Result};
use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

type Aes128Ctr = ctr::Ctr32BE<Aes128>;

/// Device key size in bytes
pub const KEY_LEN: usize = 16;

/// AES-128-CTR implementation of [`CryptoInterface`]
#[derive(Clone)]
pub struct AesCtrCipher {
    key: [u8; KEY_LEN],
    nonce_prefix: [u8; 8],
}

impl AesCtrCipher {
    /// Create a cipher from the device key
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self {
            key,
            nonce_prefix: [0; 8],
        }
    }

    /// Mix a per-device value (e.g. a unique chip id) into every counter block
    pub fn with_nonce_prefix(mut self, prefix: [u8; 8]) -> Self {
        self.nonce_prefix = prefix;
        self
    }

    fn counter_block(&self, context: u32) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..8].copy_from_slice(&self.nonce_prefix);
        iv[8..12].copy_from_slice(&context.to_le_bytes());
        iv
    }

    fn apply(&self, context: u32, buf: &mut [u8], error: CryptoError) -> Result<()> {
        let iv = self.counter_block(context);
        let mut cipher = Aes128Ctr::new(&self.key.into(), &iv.into());
        cipher.try_apply_keystream(buf).map_err(|_| error)?;
        Ok(())
    }
}

impl core::fmt::Debug for AesCtrCipher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print key material
        f.debug_struct("AesCtrCipher").finish_non_exhaustive()
    }
}

impl CryptoInterface for AesCtrCipher {
    fn encrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()> {
        self.apply(context, buf, CryptoError::EncryptFailed)
    }

    fn decrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()> {
        self.apply(context, buf, CryptoError::DecryptFailed)
    }
}
