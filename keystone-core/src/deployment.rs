//! Deployment storage controller
//!
//! Exposes a fixed run of physical sectors as a zero-based logical block
//! device. Sector operations are translated by the layout's base sector;
//! byte addresses are already absolute and go to the primitive untouched.
//! Primitive failures come back unchanged.

use core::ops::Range;
use core::time::Duration;

use heapless::Vec;
use keystone_hal::storage::{PresenceChangedHandler, MAX_DESCRIPTOR_SECTORS};
use keystone_hal::{
    RawFlash, SectorInfo, StorageController, StorageDescriptor, StorageError,
};

use crate::config::DeploymentLayout;

/// Errors when binding a layout to a flash device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Layout has no sectors
    Empty,
    /// Layout extends past the last sector of the device
    OutOfDevice,
    /// Layout has more sectors than a descriptor can report
    TooManySectors,
}

/// Logical block device over the deployment region of a flash primitive
pub struct DeploymentController<F> {
    flash: F,
    layout: DeploymentLayout,
}

impl<F: RawFlash> DeploymentController<F> {
    /// Bind a layout to a flash device
    ///
    /// The layout must fit inside the device's geometry.
    pub fn new(flash: F, layout: DeploymentLayout) -> Result<Self, LayoutError> {
        if layout.sector_count == 0 {
            return Err(LayoutError::Empty);
        }
        if layout.sector_count as usize > MAX_DESCRIPTOR_SECTORS {
            return Err(LayoutError::TooManySectors);
        }
        let end = layout.end_sector().ok_or(LayoutError::OutOfDevice)?;
        if end as usize > flash.sector_map().len() {
            return Err(LayoutError::OutOfDevice);
        }

        Ok(Self { flash, layout })
    }

    /// Region placement
    pub fn layout(&self) -> DeploymentLayout {
        self.layout
    }

    /// Absolute address range covered by the region
    ///
    /// Widened to `u64` so a region ending at the top of the 32-bit address
    /// space has a representable end.
    pub fn region(&self) -> Range<u64> {
        let map = self.flash.sector_map();
        let sectors = self.sectors();
        let start = map.addresses()[sectors.start];
        let last = sectors.end - 1;
        u64::from(start)..u64::from(map.addresses()[last]) + u64::from(map.sizes()[last])
    }

    /// Size of the sector containing `address`
    ///
    /// Addresses outside the region are rejected.
    pub fn bytes_per_sector(&self, address: u32) -> Result<u32, StorageError> {
        let map = self.flash.sector_map();
        let index = map
            .sector_containing(address)
            .ok_or(StorageError::InvalidAddress)?;
        if !self.sectors().contains(&index) {
            return Err(StorageError::InvalidAddress);
        }
        Ok(map.sizes()[index])
    }

    /// Manufacturer/part identifier of the backing device
    pub fn part_id(&mut self) -> Result<u32, StorageError> {
        Ok(self.flash.part_id()?)
    }

    /// Underlying flash primitive
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Physical sector indices of the region; `new` checked they fit the map
    fn sectors(&self) -> Range<usize> {
        let start = self.layout.base_sector as usize;
        start..start + self.layout.sector_count as usize
    }

    fn physical_sector(&self, sector: u32) -> Result<u32, StorageError> {
        self.layout
            .physical_sector(sector)
            .ok_or(StorageError::InvalidSector)
    }
}

impl<F: RawFlash> StorageController for DeploymentController<F> {
    fn acquire(&mut self) -> Result<(), StorageError> {
        Ok(self.flash.acquire()?)
    }

    fn release(&mut self) -> Result<(), StorageError> {
        Ok(self.flash.release()?)
    }

    fn read(
        &mut self,
        address: u32,
        buffer: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, StorageError> {
        Ok(self.flash.read(address, buffer)?)
    }

    fn write(
        &mut self,
        address: u32,
        data: &[u8],
        _timeout: Duration,
    ) -> Result<usize, StorageError> {
        Ok(self.flash.write(address, data)?)
    }

    fn erase_block(&mut self, sector: u32) -> Result<(), StorageError> {
        let physical = self.physical_sector(sector)?;
        Ok(self.flash.erase_sector(physical)?)
    }

    fn is_block_erased(&mut self, sector: u32) -> Result<bool, StorageError> {
        let physical = self.physical_sector(sector)?;
        Ok(self.flash.is_sector_erased(physical)?)
    }

    fn descriptor(&mut self) -> Result<StorageDescriptor, StorageError> {
        let map = self.flash.sector_map();
        let window = self.sectors();

        // Copy the window out; the device's own tables stay as they are
        let mut sectors = Vec::new();
        for (&address, &size) in map.addresses()[window.clone()]
            .iter()
            .zip(&map.sizes()[window])
        {
            sectors
                .push(SectorInfo { address, size })
                .map_err(|_| StorageError::InvalidSector)?;
        }

        let regions_contiguous = sectors
            .windows(2)
            .all(|pair| pair[0].address.checked_add(pair[0].size) == Some(pair[1].address));
        let regions_equal_sized = sectors.windows(2).all(|pair| pair[0].size == pair[1].size);

        Ok(StorageDescriptor {
            can_read_direct: true,
            can_write_direct: false,
            can_execute_direct: true,
            erase_before_write: true,
            removable: false,
            regions_contiguous,
            regions_equal_sized,
            sectors,
        })
    }

    fn is_present(&mut self) -> Result<bool, StorageError> {
        Err(StorageError::NotSupported)
    }

    fn set_presence_changed_handler(
        &mut self,
        _handler: PresenceChangedHandler,
    ) -> Result<(), StorageError> {
        Err(StorageError::NotSupported)
    }
}
