//! Crate-wide infrastructure
//!
//! Currently only the logging macros shared by the platform and zone layers.

pub mod logging;
