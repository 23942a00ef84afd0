//! Storage controller capability
//!
//! A logical block device as seen by the runtime. Sector numbers are
//! logical (zero-based within the device), addresses are the absolute
//! addresses the device is visible at.

use core::time::Duration;

use heapless::Vec;

use crate::flash::FlashError;

/// Maximum number of sectors a descriptor can report
pub const MAX_DESCRIPTOR_SECTORS: usize = 32;

/// Errors from storage controller operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The operation has no meaning for this device
    NotSupported,
    /// Logical sector outside the device
    InvalidSector,
    /// Address outside the device
    InvalidAddress,
    /// Failure reported by the underlying flash, unchanged
    Flash(FlashError),
}

impl From<FlashError> for StorageError {
    fn from(err: FlashError) -> Self {
        StorageError::Flash(err)
    }
}

/// One sector as reported by a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SectorInfo {
    /// Absolute start address
    pub address: u32,
    /// Size in bytes
    pub size: u32,
}

/// Geometry and capabilities of a storage device
///
/// Owned by the caller: changing it has no effect on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageDescriptor {
    /// Contents can be read through the memory bus
    pub can_read_direct: bool,
    /// Contents can be written through the memory bus
    pub can_write_direct: bool,
    /// Code can execute in place
    pub can_execute_direct: bool,
    /// Sectors must be erased before they can be reprogrammed
    pub erase_before_write: bool,
    /// Device can be removed at runtime
    pub removable: bool,
    /// Each sector starts where the previous one ends
    pub regions_contiguous: bool,
    /// Every sector has the same size
    pub regions_equal_sized: bool,
    /// Sectors, in logical order
    pub sectors: Vec<SectorInfo, MAX_DESCRIPTOR_SECTORS>,
}

impl StorageDescriptor {
    /// Number of sectors reported
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Total size in bytes
    pub fn total_size(&self) -> u64 {
        self.sectors.iter().map(|s| s.size as u64).sum()
    }
}

/// Called when a removable device appears or disappears
pub type PresenceChangedHandler = fn(present: bool);

/// Storage controller capability
///
/// `acquire` must be called before any other operation and `release` after
/// the last one. Calls outside that bracket are not checked.
pub trait StorageController {
    /// Claim the device
    fn acquire(&mut self) -> Result<(), StorageError>;

    /// Give the device back
    fn release(&mut self) -> Result<(), StorageError>;

    /// Read `buffer.len()` bytes at `address`
    ///
    /// # Returns
    /// The number of bytes read.
    fn read(&mut self, address: u32, buffer: &mut [u8], timeout: Duration)
        -> Result<usize, StorageError>;

    /// Write `data` at `address`
    ///
    /// # Returns
    /// The number of bytes written.
    fn write(&mut self, address: u32, data: &[u8], timeout: Duration)
        -> Result<usize, StorageError>;

    /// Erase one logical sector
    fn erase_block(&mut self, sector: u32) -> Result<(), StorageError>;

    /// Check that one logical sector is fully erased
    fn is_block_erased(&mut self, sector: u32) -> Result<bool, StorageError>;

    /// Describe the device geometry
    fn descriptor(&mut self) -> Result<StorageDescriptor, StorageError>;

    /// Check whether the device is currently present
    fn is_present(&mut self) -> Result<bool, StorageError>;

    /// Install a handler for presence changes
    fn set_presence_changed_handler(
        &mut self,
        handler: PresenceChangedHandler,
    ) -> Result<(), StorageError>;
}
