//! dcz_core - Pure no_std building blocks for Device Configuration Zones
//!
//! This crate contains the platform-agnostic parts of the zone manager
//! that can be tested on host without any feature flags or flash drivers.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies, no allocation
//! - **Fixed layout**: Every slot of a replica set is readable with the same codec
//!
//! # Modules
//!
//! - [`zone`]: Header and entry codec, Fletcher-32 checksum
//! - [`version`]: Version to slot resolution and latest version tracking
//! - [`error`]: Decode and resolution error types

#![no_std]

pub mod error;
pub mod version;
pub mod zone;

pub use error::{FormatError, VersionError};
pub use version::{SlotVersion, VersionResolver};
