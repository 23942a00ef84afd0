//! Raw flash primitive
//!
//! The contract a physical NOR flash device offers to the controllers
//! layered on top of it. Addresses are absolute (memory-mapped) addresses,
//! sectors are physical sector indices counted from the start of the device.

/// Native failure codes of a flash primitive
///
/// Controllers pass these through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Address or length not aligned to the device's program granularity
    NotAligned,
    /// Address range outside the device
    OutOfBounds,
    /// Sector index outside the device
    InvalidSector,
    /// Device still busy with a previous operation
    Busy,
    /// Program or erase did not complete
    Timeout,
    /// Write or erase protection is active
    Protected,
    /// Any other device failure
    Device,
}

/// Parallel address/size tables describing every physical sector
///
/// `addresses[i]` is the start address of sector `i`, `sizes[i]` its length
/// in bytes. Both slices always have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorMap<'a> {
    addresses: &'a [u32],
    sizes: &'a [u32],
}

impl<'a> SectorMap<'a> {
    /// Build a map from parallel tables
    ///
    /// Returns `None` when the tables differ in length.
    pub const fn new(addresses: &'a [u32], sizes: &'a [u32]) -> Option<Self> {
        if addresses.len() != sizes.len() {
            return None;
        }
        Some(Self { addresses, sizes })
    }

    /// Number of physical sectors
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Check if the device reports no sectors
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Start addresses of every sector
    pub fn addresses(&self) -> &'a [u32] {
        self.addresses
    }

    /// Sizes in bytes of every sector
    pub fn sizes(&self) -> &'a [u32] {
        self.sizes
    }

    /// Address and size of one sector
    pub fn sector(&self, index: usize) -> Option<(u32, u32)> {
        Some((*self.addresses.get(index)?, *self.sizes.get(index)?))
    }

    /// Index of the sector containing `address`
    pub fn sector_containing(&self, address: u32) -> Option<usize> {
        self.addresses
            .iter()
            .zip(self.sizes)
            .position(|(&start, &size)| address >= start && address - start < size)
    }
}

/// Physical NOR flash primitive
///
/// Byte-addressable read/write, sector erase, erase verification and
/// geometry enumeration over one physical device. Implementations may be
/// shared by several logical consumers; none of the methods lock.
pub trait RawFlash {
    /// Claim the device for use
    fn acquire(&mut self) -> Result<(), FlashError>;

    /// Give the device back
    fn release(&mut self) -> Result<(), FlashError>;

    /// Read `buffer.len()` bytes starting at `address`
    ///
    /// # Returns
    /// The number of bytes read.
    fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<usize, FlashError>;

    /// Program `data` starting at `address`
    ///
    /// Programming can only move bits towards the erased state's complement;
    /// write to erased cells to get the exact pattern back.
    ///
    /// # Returns
    /// The number of bytes written.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<usize, FlashError>;

    /// Erase one physical sector
    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError>;

    /// Check that every byte of a physical sector reads as erased
    fn is_sector_erased(&mut self, sector: u32) -> Result<bool, FlashError>;

    /// Geometry of the whole device
    ///
    /// The returned tables are the device's canonical geometry and are
    /// shared with every other consumer; copy what you need.
    fn sector_map(&self) -> SectorMap<'_>;

    /// Manufacturer/part identifier of the device
    fn part_id(&mut self) -> Result<u32, FlashError> {
        Err(FlashError::Device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESSES: [u32; 4] = [0x0800_0000, 0x0800_4000, 0x0800_8000, 0x0801_0000];
    const SIZES: [u32; 4] = [0x4000, 0x4000, 0x8000, 0x1_0000];

    #[test]
    fn test_mismatched_tables_rejected() {
        assert!(SectorMap::new(&ADDRESSES, &SIZES[..3]).is_none());
    }

    #[test]
    fn test_sector_lookup() {
        let map = SectorMap::new(&ADDRESSES, &SIZES).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.sector(2), Some((0x0800_8000, 0x8000)));
        assert_eq!(map.sector(4), None);
    }

    #[test]
    fn test_sector_containing() {
        let map = SectorMap::new(&ADDRESSES, &SIZES).unwrap();
        assert_eq!(map.sector_containing(0x0800_0000), Some(0));
        assert_eq!(map.sector_containing(0x0800_7FFF), Some(1));
        assert_eq!(map.sector_containing(0x0801_FFFF), Some(3));
        assert_eq!(map.sector_containing(0x0802_0000), None);
        assert_eq!(map.sector_containing(0x0000_0000), None);
    }
}
