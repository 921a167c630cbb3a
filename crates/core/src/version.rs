//! Version to slot resolution
//!
//! Versions are unbounded counters mapped onto a fixed ring of slots:
//! version `v` always lives in slot `v % replication_factor`. Saving at
//! `latest + 1` therefore lands on the slot holding the oldest data, which
//! gives round-robin replacement without any extra bookkeeping.

use crate::error::VersionError;
use crate::zone::MAX_SLOTS;

/// Version state observed for one slot during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotVersion {
    /// Version stored in the slot header
    pub version: u32,
    /// True if the slot passed checksum validation
    pub valid: bool,
}

/// Maps logical versions to slots and tracks the latest valid version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionResolver {
    replication_factor: u8,
    latest: Option<u32>,
}

impl VersionResolver {
    /// Create a resolver for `replication_factor` slots (1..=8)
    pub fn new(replication_factor: usize) -> Result<Self, VersionError> {
        if replication_factor == 0 || replication_factor > MAX_SLOTS {
            return Err(VersionError::InvalidReplicationFactor);
        }

        Ok(Self {
            replication_factor: replication_factor as u8,
            latest: None,
        })
    }

    /// Number of slots versions are spread over
    pub fn replication_factor(&self) -> usize {
        self.replication_factor as usize
    }

    /// Slot index holding `version`, or `default` when no version is given
    pub fn resolve(&self, version: Option<u32>, default: u32) -> usize {
        let version = version.unwrap_or(default);
        (version % self.replication_factor as u32) as usize
    }

    /// Slot index holding `version`, or the latest valid version
    pub fn resolve_or_latest(&self, version: Option<u32>) -> Result<usize, VersionError> {
        match version {
            Some(v) => Ok(self.resolve(Some(v), v)),
            None => Ok(self.resolve(None, self.latest_version()?)),
        }
    }

    /// Highest version among valid slots
    pub fn latest_version(&self) -> Result<u32, VersionError> {
        self.latest.ok_or(VersionError::NoValidZone)
    }

    /// Version that rotates onto the slot holding the oldest data
    pub fn next_version(&self) -> Result<u32, VersionError> {
        self.latest_version()?
            .checked_add(1)
            .ok_or(VersionError::Exhausted)
    }

    /// Recompute the latest version from a fresh view of all slots
    ///
    /// Invalid slots never contribute, whatever version their header claims.
    pub fn recompute<I>(&mut self, slots: I)
    where
        I: IntoIterator<Item = SlotVersion>,
    {
        self.latest = slots
            .into_iter()
            .filter(|slot| slot.valid)
            .map(|slot| slot.version)
            .max();
    }

    /// Raise the latest version if `version` exceeds it
    pub fn observe(&mut self, version: u32) {
        self.latest = Some(self.latest.map_or(version, |latest| latest.max(version)));
    }
}
