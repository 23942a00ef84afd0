//! Power controller capability

/// Requested sleep level, ordered by aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepLevel {
    /// Halt until any interrupt; clocks keep running
    Sleep,
    /// Stop clocks, keep RAM; resumes with the clock tree restored
    Hibernate,
    /// Power down; only a reset brings the system back
    Off,
}

/// Power states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Running normally
    Active,
    /// Halted in light sleep
    Sleeping,
    /// Halted in deep sleep
    Hibernating,
    /// Powered down until reset
    Off,
}

impl PowerState {
    /// State a sleep request halts in
    pub fn for_level(level: SleepLevel) -> Self {
        match level {
            SleepLevel::Sleep => PowerState::Sleeping,
            SleepLevel::Hibernate => PowerState::Hibernating,
            SleepLevel::Off => PowerState::Off,
        }
    }

    /// Check if this state can ever return to `Active` without a reset
    pub fn is_resumable(&self) -> bool {
        !matches!(self, PowerState::Off)
    }
}

/// Power controller capability
///
/// There is no error path once a transition starts: each call either
/// completes its hardware sequence or stays parked on a hardware wait.
pub trait PowerController {
    /// Claim the controller
    fn acquire(&mut self);

    /// Give the controller back
    fn release(&mut self);

    /// Current power state
    fn state(&self) -> PowerState;

    /// Enter a sleep level
    ///
    /// Returns once the system is `Active` again. `SleepLevel::Off` never
    /// returns.
    fn sleep(&mut self, level: SleepLevel);

    /// Power the system down; only an external reset recovers
    fn power_off(&mut self) -> !;

    /// Reset the core
    ///
    /// With `run_application == false` the bootloader is asked to stay
    /// resident after the reset.
    fn reset(&mut self, run_application: bool) -> !;
}
