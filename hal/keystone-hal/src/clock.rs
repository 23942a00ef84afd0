//! Clock tree and low-power register access
//!
//! Every register touch of the power path goes through these traits so a
//! board backend can be swapped for a recording mock. Each method is one
//! hardware action; ordering is the caller's responsibility.

/// System clock source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal RC oscillator
    Internal,
    /// External crystal/oscillator
    External,
    /// PLL output
    Pll,
}

/// Snapshot of the clock tree state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfiguration {
    /// Active system clock source
    pub source: ClockSource,
    /// PLL reports lock
    pub pll_locked: bool,
    /// External oscillator reports ready
    pub external_oscillator_ready: bool,
}

/// Deep sleep flavour selected before halting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerMode {
    /// Clocks stopped, regulator in low-power mode, RAM retained
    Stop,
    /// Core domain powered down; only a reset wakes the device
    PowerDown,
}

/// Oscillator, PLL and system clock switch registers
pub trait ClockRegisters {
    /// Turn the external oscillator on
    fn enable_external_oscillator(&mut self);

    /// External oscillator reports stable output
    fn external_oscillator_ready(&self) -> bool;

    /// Turn the PLL on
    fn enable_pll(&mut self);

    /// PLL reports lock
    fn pll_locked(&self) -> bool;

    /// Request a system clock switch
    fn select_system_clock(&mut self, source: ClockSource);

    /// Clock source the switch currently reports as active
    fn system_clock(&self) -> ClockSource;

    /// Turn the internal oscillator off
    fn disable_internal_oscillator(&mut self);

    /// Read the clock tree state
    fn configuration(&self) -> ClockConfiguration {
        ClockConfiguration {
            source: self.system_clock(),
            pll_locked: self.pll_locked(),
            external_oscillator_ready: self.external_oscillator_ready(),
        }
    }
}

/// System control and power registers used around low-power transitions
pub trait PowerRegisters: ClockRegisters {
    /// Clear the wake-up flag left by a previous low-power exit
    fn clear_wakeup_flag(&mut self);

    /// Set or clear the core's deep-sleep bit
    fn set_deep_sleep(&mut self, enabled: bool);

    /// Select what deep sleep does on the next halt
    fn set_low_power_mode(&mut self, mode: LowPowerMode);

    /// Halt until an enabled interrupt fires
    fn wait_for_interrupt(&mut self);

    /// Ask the core to reset itself
    ///
    /// The reset takes effect some time after this returns.
    fn request_system_reset(&mut self);

    /// Store a word at a fixed RAM location that survives a core reset
    fn write_retained_word(&mut self, address: u32, value: u32);
}
