//! Flash geometry for STM32F405/407
//!
//! 1MB single bank, three sector sizes:
//!
//! ```text
//! sector  0-3   16KB  0x0800_0000 - 0x0800_FFFF
//! sector  4     64KB  0x0801_0000 - 0x0801_FFFF
//! sector  5-11 128KB  0x0802_0000 - 0x080F_FFFF
//! ```

use embassy_stm32::flash::Flash;
use embassy_stm32::mode::Blocking;
use keystone_core::deployment::LayoutError;
use keystone_core::{DeploymentController, DeploymentLayout};
use keystone_drivers::NorFlashPrimitive;
use keystone_hal::{FlashError, SectorMap};

/// Address the flash bank is mapped at
pub const FLASH_BASE: u32 = 0x0800_0000;

/// Number of physical sectors
pub const SECTOR_COUNT: usize = 12;

const KB: u32 = 1024;

/// Start address of every sector
pub const SECTOR_ADDRESSES: [u32; SECTOR_COUNT] = [
    FLASH_BASE,
    FLASH_BASE + 16 * KB,
    FLASH_BASE + 32 * KB,
    FLASH_BASE + 48 * KB,
    FLASH_BASE + 64 * KB,
    FLASH_BASE + 128 * KB,
    FLASH_BASE + 256 * KB,
    FLASH_BASE + 384 * KB,
    FLASH_BASE + 512 * KB,
    FLASH_BASE + 640 * KB,
    FLASH_BASE + 768 * KB,
    FLASH_BASE + 896 * KB,
];

/// Size of every sector
pub const SECTOR_SIZES: [u32; SECTOR_COUNT] = [
    16 * KB,
    16 * KB,
    16 * KB,
    16 * KB,
    64 * KB,
    128 * KB,
    128 * KB,
    128 * KB,
    128 * KB,
    128 * KB,
    128 * KB,
    128 * KB,
];

/// Sector table of the whole bank
pub const SECTOR_MAP: SectorMap<'static> = match SectorMap::new(&SECTOR_ADDRESSES, &SECTOR_SIZES) {
    Some(map) => map,
    None => panic!("sector tables differ in length"),
};

/// Raw flash primitive for the internal bank
pub type Stm32f4Flash<'d> = NorFlashPrimitive<'static, Flash<'d, Blocking>>;

/// Errors while building the deployment controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Sector table does not fit the driver
    Flash(FlashError),
    /// Layout does not fit the bank
    Layout(LayoutError),
}

/// Deployment controller over the internal flash bank
///
/// # Arguments
/// - `flash`: embassy-stm32 blocking flash driver
/// - `layout`: Deployment region placement
/// - `part_id`: Identifier reported through `RawFlash::part_id`
pub fn deployment_flash(
    flash: Flash<'_, Blocking>,
    layout: DeploymentLayout,
    part_id: u32,
) -> Result<DeploymentController<Stm32f4Flash<'_>>, SetupError> {
    let primitive = NorFlashPrimitive::new(flash, FLASH_BASE, SECTOR_MAP)
        .map_err(SetupError::Flash)?
        .with_part_id(part_id);
    DeploymentController::new(primitive, layout).map_err(SetupError::Layout)
}
