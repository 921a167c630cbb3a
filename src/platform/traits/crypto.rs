//! Crypto interface trait
//!
//! The device's native encryption primitive. The zone manager only decides
//! *when* a payload is encrypted or decrypted; algorithm and key management
//! belong to the implementation.

use crate::platform::Result;

/// In-place, length-preserving payload encryption
///
/// `context` is the resource's plaintext checksum. It is an opaque token the
/// implementation may use for key selection or nonce derivation; the same
/// context is passed to `encrypt` and to the matching `decrypt`.
pub trait CryptoInterface {
    /// Encrypt `buf` in place
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Crypto(CryptoError::EncryptFailed)` if the primitive fails.
    fn encrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()>;

    /// Decrypt `buf` in place
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Crypto(CryptoError::DecryptFailed)` if the primitive fails.
    fn decrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()>;
}
