//! NOR flash primitive over `embedded-storage`
//!
//! `embedded-storage` drivers address the device by offset from its start
//! and know nothing about non-uniform sectors. This adapter adds the
//! memory-mapped base address and a sector table so the device can be
//! driven by absolute address and physical sector index.

use embedded_storage::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash};
use keystone_hal::{FlashError, RawFlash, SectorMap};

/// Erased NOR cells read back as all ones
pub const ERASED_BYTE: u8 = 0xFF;

/// Bytes compared per read while verifying an erase
const VERIFY_CHUNK: usize = 64;

/// `RawFlash` over an `embedded-storage` NOR driver
pub struct NorFlashPrimitive<'g, F> {
    flash: F,
    base_address: u32,
    sectors: SectorMap<'g>,
    users: u32,
    part_id: Option<u32>,
}

impl<'g, F: NorFlash> NorFlashPrimitive<'g, F> {
    /// Wrap a driver
    ///
    /// # Arguments
    /// - `flash`: Driver addressing the device from offset 0
    /// - `base_address`: Address the device's first byte is mapped at
    /// - `sectors`: Every physical sector, contiguous from `base_address`
    ///
    /// Fails with `OutOfBounds` if the table has gaps, does not start at
    /// `base_address`, or is larger than the driver's capacity.
    pub fn new(flash: F, base_address: u32, sectors: SectorMap<'g>) -> Result<Self, FlashError> {
        let mut next = base_address as u64;
        for (&address, &size) in sectors.addresses().iter().zip(sectors.sizes()) {
            if address as u64 != next {
                return Err(FlashError::OutOfBounds);
            }
            next += size as u64;
        }
        if next - base_address as u64 > flash.capacity() as u64 {
            return Err(FlashError::OutOfBounds);
        }

        Ok(Self {
            flash,
            base_address,
            sectors,
            users: 0,
            part_id: None,
        })
    }

    /// Report a fixed part identifier from `part_id`
    pub fn with_part_id(mut self, part_id: u32) -> Self {
        self.part_id = Some(part_id);
        self
    }

    /// Number of outstanding `acquire` calls
    pub fn users(&self) -> u32 {
        self.users
    }

    /// Underlying driver
    pub fn inner(&mut self) -> &mut F {
        &mut self.flash
    }

    fn offset(&self, address: u32) -> Result<u32, FlashError> {
        address
            .checked_sub(self.base_address)
            .ok_or(FlashError::OutOfBounds)
    }

    /// Driver offsets `from..to` of a physical sector
    fn sector_bounds(&self, sector: u32) -> Result<(u32, u32), FlashError> {
        let (address, size) = self
            .sectors
            .sector(sector as usize)
            .ok_or(FlashError::InvalidSector)?;
        let from = self.offset(address)?;
        Ok((from, from + size))
    }
}

impl<F: NorFlash> RawFlash for NorFlashPrimitive<'_, F> {
    fn acquire(&mut self) -> Result<(), FlashError> {
        self.users += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), FlashError> {
        self.users = self.users.checked_sub(1).ok_or(FlashError::Device)?;
        Ok(())
    }

    fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let offset = self.offset(address)?;
        self.flash.read(offset, buffer).map_err(flash_error)?;
        Ok(buffer.len())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<usize, FlashError> {
        let offset = self.offset(address)?;
        self.flash.write(offset, data).map_err(flash_error)?;
        Ok(data.len())
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError> {
        let (from, to) = self.sector_bounds(sector)?;
        self.flash.erase(from, to).map_err(flash_error)
    }

    fn is_sector_erased(&mut self, sector: u32) -> Result<bool, FlashError> {
        let (from, to) = self.sector_bounds(sector)?;
        let mut chunk = [0u8; VERIFY_CHUNK];
        let mut offset = from;

        while offset < to {
            let len = ((to - offset) as usize).min(VERIFY_CHUNK);
            self.flash
                .read(offset, &mut chunk[..len])
                .map_err(flash_error)?;
            if chunk[..len].iter().any(|&b| b != ERASED_BYTE) {
                return Ok(false);
            }
            offset += len as u32;
        }

        Ok(true)
    }

    fn sector_map(&self) -> SectorMap<'_> {
        self.sectors
    }

    fn part_id(&mut self) -> Result<u32, FlashError> {
        self.part_id.ok_or(FlashError::Device)
    }
}

/// Map a driver error onto the primitive's failure codes
fn flash_error<E: NorFlashError>(err: E) -> FlashError {
    match err.kind() {
        NorFlashErrorKind::NotAligned => FlashError::NotAligned,
        NorFlashErrorKind::OutOfBounds => FlashError::OutOfBounds,
        _ => FlashError::Device,
    }
}
