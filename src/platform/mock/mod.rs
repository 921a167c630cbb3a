//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the flash and crypto
//! collaborators that can be used for unit testing without actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod crypto;
mod flash;

pub use crypto::MockCrypto;
pub use flash::MockFlash;
