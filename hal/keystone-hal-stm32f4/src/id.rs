//! Device identifier readout

/// DBGMCU_IDCODE register
const DBGMCU_IDCODE: *const u32 = 0xE004_2000 as *const u32;

/// Device and revision identifier (`REV_ID << 16 | DEV_ID`)
///
/// Reads 0 while the debug block is still held in reset on some parts;
/// callers should retry later rather than cache a zero.
pub fn device_id() -> u32 {
    // SAFETY: DBGMCU_IDCODE is a read-only, always-mapped system register
    unsafe { core::ptr::read_volatile(DBGMCU_IDCODE) }
}
