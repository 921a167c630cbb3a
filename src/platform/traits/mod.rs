//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod crypto;
pub mod flash;

// Re-export trait interfaces
pub use crypto::CryptoInterface;
pub use flash::FlashInterface;
