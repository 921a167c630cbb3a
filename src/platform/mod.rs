//! Platform abstraction layer
//!
//! This module isolates everything the zone manager needs from the device:
//! raw flash access and the native encryption primitive.

pub mod cipher;
pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use cipher::AesCtrCipher;
pub use error::{CryptoError, FlashError, PlatformError, Result};
pub use traits::{CryptoInterface, FlashInterface};
