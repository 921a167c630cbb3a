//! Mock crypto implementation for testing
//!
//! XORs payloads with a keystream derived from the context token. Not secure;
//! it only needs to be deterministic, length-preserving and reversible.

use crate::platform::{error::CryptoError, traits::CryptoInterface, Result};

/// Mock crypto collaborator
///
/// # Example
///
/// ```
/// # #[cfg(feature = "mock")]
/// # {
/// use dcz::platform::mock::MockCrypto;
/// use dcz::platform::traits::CryptoInterface;
///
/// let mut crypto = MockCrypto::new();
/// let mut buf = *b"secret";
///
/// crypto.encrypt(0x1234, &mut buf).unwrap();
/// assert_ne!(&buf, b"secret");
///
/// crypto.decrypt(0x1234, &mut buf).unwrap();
/// assert_eq!(&buf, b"secret");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockCrypto {
    encrypt_calls: usize,
    decrypt_calls: usize,
    fail: bool,
}

impl MockCrypto {
    /// Create a new mock crypto instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `encrypt` calls so far
    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls
    }

    /// Number of `decrypt` calls so far
    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls
    }

    /// Make every subsequent operation fail until cleared
    pub fn set_failure(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Apply the context keystream to `buf`
    pub fn apply_keystream(context: u32, buf: &mut [u8]) {
        // xorshift32 must never be seeded with zero
        let mut state = (context ^ 0x9E37_79B9).max(1);
        for chunk in buf.chunks_mut(4) {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            for (byte, key) in chunk.iter_mut().zip(state.to_le_bytes()) {
                *byte ^= key;
            }
        }
    }
}

impl CryptoInterface for MockCrypto {
    fn encrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail {
            return Err(CryptoError::EncryptFailed.into());
        }
        self.encrypt_calls += 1;
        Self::apply_keystream(context, buf);
        Ok(())
    }

    fn decrypt(&mut self, context: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail {
            return Err(CryptoError::DecryptFailed.into());
        }
        self.decrypt_calls += 1;
        Self::apply_keystream(context, buf);
        Ok(())
    }
}
