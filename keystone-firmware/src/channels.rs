//! Inter-task communication
//!
//! Uses embassy-sync primitives; the power task is the only consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use keystone_hal::SleepLevel;

/// Requests for the power task
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum PowerRequest {
    /// Enter a sleep level
    Sleep(SleepLevel),
    /// Reset the core, optionally staying in the bootloader
    Reset { run_application: bool },
}

/// Latest power request (a newer request overwrites an unserved one)
pub static POWER_REQUEST: Signal<CriticalSectionRawMutex, PowerRequest> = Signal::new();
