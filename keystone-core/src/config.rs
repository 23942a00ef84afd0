//! Board configuration types
//!
//! Fixed per-board constants: where the deployment region lives in flash,
//! which other regions of the same device are reserved, and how the clock
//! tree is wired. Firmware builds generate these from `board.toml`.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum reserved regions per board
pub const MAX_RESERVED_REGIONS: usize = 4;

/// Maximum length of a reserved region label
pub const MAX_REGION_NAME_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A region has zero sectors
    EmptyRegion,
    /// A region runs past the last addressable sector number
    OutOfRange,
    /// Deployment region overlaps the reserved region at this index
    Overlap(usize),
}

/// Placement of the deployment region on the physical flash device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeploymentLayout {
    /// First physical sector of the region
    pub base_sector: u32,
    /// Number of sectors in the region
    pub sector_count: u32,
}

impl DeploymentLayout {
    /// Create a new layout
    pub const fn new(base_sector: u32, sector_count: u32) -> Self {
        Self {
            base_sector,
            sector_count,
        }
    }

    /// Physical sector backing a logical sector
    ///
    /// Returns `None` when the logical sector is outside the region.
    pub fn physical_sector(&self, logical: u32) -> Option<u32> {
        if logical < self.sector_count {
            self.base_sector.checked_add(logical)
        } else {
            None
        }
    }

    /// One past the last physical sector of the region
    ///
    /// Returns `None` when the region runs past `u32::MAX`.
    pub fn end_sector(&self) -> Option<u32> {
        self.base_sector.checked_add(self.sector_count)
    }

    /// Check if two sector ranges share any sector
    pub fn overlaps(&self, base_sector: u32, sector_count: u32) -> bool {
        let end = u64::from(base_sector) + u64::from(sector_count);
        let own_end = u64::from(self.base_sector) + u64::from(self.sector_count);
        u64::from(self.base_sector) < end && u64::from(base_sector) < own_end
    }
}

/// A range of physical sectors owned by another consumer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReservedRegion {
    /// Label for diagnostics (e.g. "bootloader")
    pub name: String<MAX_REGION_NAME_LEN>,
    /// First physical sector
    pub base_sector: u32,
    /// Number of sectors
    pub sector_count: u32,
}

/// Clock tree wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// Board has an external crystal feeding the PLL
    pub external_oscillator: bool,
}

/// RAM word the bootloader checks after a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootloaderHold {
    /// Retained RAM address
    pub address: u32,
    /// Value that keeps the bootloader resident
    pub value: u32,
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Deployment region placement
    pub deployment: DeploymentLayout,
    /// Other consumers' regions on the same device
    #[cfg_attr(feature = "serde", serde(default))]
    pub reserved: Vec<ReservedRegion, MAX_RESERVED_REGIONS>,
    /// Clock tree wiring
    #[cfg_attr(feature = "serde", serde(default))]
    pub clock: ClockConfig,
    /// Bootloader hold word, if the bootloader supports one
    #[cfg_attr(feature = "serde", serde(default))]
    pub bootloader_hold: Option<BootloaderHold>,
}

impl BoardConfig {
    /// Check the region placement
    ///
    /// The deployment region must be non-empty and must not share a sector
    /// with any reserved region.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deployment.sector_count == 0 {
            return Err(ConfigError::EmptyRegion);
        }
        if self.deployment.end_sector().is_none() {
            return Err(ConfigError::OutOfRange);
        }

        for (i, region) in self.reserved.iter().enumerate() {
            if region.sector_count == 0 {
                return Err(ConfigError::EmptyRegion);
            }
            if region.base_sector.checked_add(region.sector_count).is_none() {
                return Err(ConfigError::OutOfRange);
            }
            if self
                .deployment
                .overlaps(region.base_sector, region.sector_count)
            {
                return Err(ConfigError::Overlap(i));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str, base_sector: u32, sector_count: u32) -> ReservedRegion {
        ReservedRegion {
            name: String::try_from(name).unwrap(),
            base_sector,
            sector_count,
        }
    }

    fn board(deployment: DeploymentLayout) -> BoardConfig {
        BoardConfig {
            deployment,
            reserved: Vec::new(),
            clock: ClockConfig::default(),
            bootloader_hold: None,
        }
    }

    #[test]
    fn test_physical_sector_mapping() {
        let layout = DeploymentLayout::new(100, 4);
        assert_eq!(layout.physical_sector(0), Some(100));
        assert_eq!(layout.physical_sector(2), Some(102));
        assert_eq!(layout.physical_sector(3), Some(103));
        assert_eq!(layout.physical_sector(4), None);
    }

    #[test]
    fn test_overlap_edges() {
        let layout = DeploymentLayout::new(4, 4);
        assert!(!layout.overlaps(0, 4)); // ends right before
        assert!(!layout.overlaps(8, 2)); // starts right after
        assert!(layout.overlaps(3, 2));
        assert!(layout.overlaps(7, 1));
        assert!(layout.overlaps(0, 20));
    }

    #[test]
    fn test_validate_accepts_disjoint_regions() {
        let mut config = board(DeploymentLayout::new(5, 6));
        config.reserved.push(region("bootloader", 0, 4)).unwrap();
        config.reserved.push(region("config", 11, 1)).unwrap();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut config = board(DeploymentLayout::new(2, 6));
        config.reserved.push(region("bootloader", 0, 4)).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::Overlap(0)));
    }

    #[test]
    fn test_layout_at_top_of_sector_range() {
        let layout = DeploymentLayout::new(u32::MAX - 1, 4);
        assert_eq!(layout.end_sector(), None);
        assert_eq!(layout.physical_sector(1), Some(u32::MAX));
        assert_eq!(layout.physical_sector(2), None);

        assert!(!DeploymentLayout::new(0, 4).overlaps(u32::MAX, 2));
        assert!(layout.overlaps(u32::MAX, 2));
    }

    #[test]
    fn test_validate_rejects_wrapping_regions() {
        let config = board(DeploymentLayout::new(u32::MAX - 1, 4));
        assert_eq!(config.validate(), Err(ConfigError::OutOfRange));

        let mut config = board(DeploymentLayout::new(5, 6));
        config
            .reserved
            .push(region("scratch", u32::MAX - 1, 4))
            .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::OutOfRange));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let config = board(DeploymentLayout::new(2, 0));
        assert_eq!(config.validate(), Err(ConfigError::EmptyRegion));
    }
}
