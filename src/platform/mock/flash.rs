//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use alloc::vec;
use alloc::vec::Vec;

/// Flash capacity (4 MB)
const FLASH_CAPACITY: u32 = 4 * 1024 * 1024;

/// Mock Flash implementation
///
/// Simulates Flash storage in memory for testing. Supports:
/// - Read/write operations with bounds checking
/// - Provisioning writes that bypass the write counter
/// - Corruption injection and single-bit flips for error handling tests
/// - Power-loss simulation for reliability testing
///
/// Writes overwrite in place; erase-before-write is the real driver's concern.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "mock")]
/// # {
/// use dcz::platform::mock::MockFlash;
/// use dcz::platform::traits::FlashInterface;
///
/// let mut flash = MockFlash::new();
///
/// let data = [0x64, 0x63, 0x7A, 0x00];
/// flash.write(0x310000, &data).unwrap();
///
/// let mut buf = [0u8; 4];
/// flash.read(0x310000, &mut buf).unwrap();
/// assert_eq!(buf, data);
/// assert_eq!(flash.write_count(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Number of completed `write` calls
    writes: usize,
    /// Writes left to complete before one is torn by simulated power loss
    power_loss_after: Option<usize>,
    /// Simulated read failure flag
    read_failure: bool,
}

impl MockFlash {
    /// Create a new mock Flash instance
    pub fn new() -> Self {
        Self {
            storage: vec![0xFF; FLASH_CAPACITY as usize],
            writes: 0,
            power_loss_after: None,
            read_failure: false,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        self.storage[address as usize..(address as usize + len)].to_vec()
    }

    /// Write contents directly, as provisioning tooling would
    ///
    /// Does not count as a write and ignores simulated power loss.
    pub fn program(&mut self, address: u32, data: &[u8]) {
        let start = address as usize;
        self.storage[start..start + data.len()].copy_from_slice(data);
    }

    /// Inject corruption at address (for testing error recovery)
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        for i in 0..len {
            self.storage[address as usize + i] = 0xAA; // Corrupt pattern
        }
    }

    /// Flip a single bit at address
    pub fn flip_bit(&mut self, address: u32, bit: u8) {
        self.storage[address as usize] ^= 1 << (bit % 8);
    }

    /// Number of `write` calls completed so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Simulate power loss during next write operation
    ///
    /// The next write will only partially complete, simulating
    /// power loss mid-operation for reliability testing.
    pub fn simulate_power_loss(&mut self) {
        self.simulate_power_loss_after(0);
    }

    /// Let `completed` writes finish, then tear the one after them
    pub fn simulate_power_loss_after(&mut self, completed: usize) {
        self.power_loss_after = Some(completed);
    }

    /// Make every subsequent read fail until cleared
    pub fn set_read_failure(&mut self, fail: bool) {
        self.read_failure = fail;
    }

    fn check_range(address: u32, len: usize) -> Result<()> {
        if address >= FLASH_CAPACITY || address as usize + len > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }
        Ok(())
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        Self::check_range(address, buf.len())?;

        if self.read_failure {
            return Err(FlashError::ReadFailed.into());
        }

        let start = address as usize;
        buf.copy_from_slice(&self.storage[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        Self::check_range(address, data.len())?;

        // Simulate power loss (partial write)
        let write_len = match self.power_loss_after {
            Some(0) => {
                // Only write half the data to simulate power loss
                self.power_loss_after = None;
                data.len() / 2
            }
            Some(remaining) => {
                self.power_loss_after = Some(remaining - 1);
                data.len()
            }
            None => data.len(),
        };

        let start = address as usize;
        self.storage[start..start + write_len].copy_from_slice(&data[..write_len]);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_flash_read_write() {
        let mut flash = MockFlash::new();

        let data = [0x64, 0x63, 0x7A, 0x00];
        flash.write(0x310000, &data).unwrap();

        let mut buf = [0u8; 4];
        flash.read(0x310000, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_mock_flash_starts_erased() {
        let flash = MockFlash::new();
        let contents = flash.get_contents(0x310000, 256);
        assert!(contents.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_mock_flash_overwrite() {
        let mut flash = MockFlash::new();
        flash.write(0x310000, &[0x0F]).unwrap();
        flash.write(0x310000, &[0xF0]).unwrap();
        assert_eq!(flash.get_contents(0x310000, 1), [0xF0]);
        assert_eq!(flash.write_count(), 2);
    }

    #[test]
    fn test_mock_flash_program_not_counted() {
        let mut flash = MockFlash::new();
        flash.program(0x320000, b"cert");
        assert_eq!(flash.write_count(), 0);
        assert_eq!(flash.get_contents(0x320000, 4), b"cert");
    }

    #[test]
    fn test_mock_flash_invalid_address() {
        let mut flash = MockFlash::new();

        let result = flash.write(FLASH_CAPACITY - 2, &[0x00; 4]);
        assert_eq!(result, Err(FlashError::InvalidAddress.into()));

        let mut buf = [0u8; 4];
        let result = flash.read(FLASH_CAPACITY, &mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_flash_read_failure() {
        let mut flash = MockFlash::new();
        let mut buf = [0u8; 4];

        flash.set_read_failure(true);
        assert_eq!(
            flash.read(0x310000, &mut buf),
            Err(FlashError::ReadFailed.into())
        );

        flash.set_read_failure(false);
        assert!(flash.read(0x310000, &mut buf).is_ok());
    }

    #[test]
    fn test_mock_flash_power_loss() {
        let mut flash = MockFlash::new();

        // Simulate power loss during write
        flash.simulate_power_loss();
        flash.write(0x310000, &[0x55; 256]).unwrap();

        // Only half should be written
        let contents = flash.get_contents(0x310000, 256);
        assert_eq!(&contents[..128], &[0x55; 128]);
        assert_eq!(&contents[128..], &[0xFF; 128]); // Rest still erased

        // Next write completes normally
        flash.write(0x310000, &[0x55; 256]).unwrap();
        assert_eq!(flash.get_contents(0x310000, 256), vec![0x55; 256]);
    }

    #[test]
    fn test_mock_flash_power_loss_after_writes() {
        let mut flash = MockFlash::new();

        flash.simulate_power_loss_after(1);
        flash.write(0x310000, &[0x11; 8]).unwrap();
        flash.write(0x311000, &[0x22; 8]).unwrap();

        assert_eq!(flash.get_contents(0x310000, 8), vec![0x11; 8]);
        assert_eq!(&flash.get_contents(0x311000, 8)[..4], &[0x22; 4]);
        assert_eq!(&flash.get_contents(0x311000, 8)[4..], &[0xFF; 4]);
        assert_eq!(flash.write_count(), 2);
    }

    #[test]
    fn test_mock_flash_flip_bit() {
        let mut flash = MockFlash::new();
        flash.program(0x310000, &[0x00]);
        flash.flip_bit(0x310000, 3);
        assert_eq!(flash.get_contents(0x310000, 1), [0x08]);
    }
}
