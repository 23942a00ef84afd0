//! Power state machine
//!
//! Owns the register backend and the hook slot. Deep transitions run a
//! fixed sequence:
//!
//! ```text
//! Active ──sleep──▶ Sleeping ──irq──▶ Active
//!
//! Active ──hibernate──▶ quiesce ─▶ deep sleep + stop mode ─▶ WFI
//!                                                           │ irq
//!   Active ◀── resume ◀── HSI off* ◀── SYSCLK=PLL ◀── PLL lock ◀── HSE ready*
//!
//! Active ──off──▶ quiesce ─▶ deep sleep + power down ─▶ WFI (never returns)
//! ```
//!
//! `*` only when the board has an external oscillator. Each wait spins on
//! its hardware flag without a timeout: a clock that never comes up parks
//! the core rather than running it from an unknown source.

use keystone_hal::{
    ClockConfiguration, ClockSource, LowPowerMode, PowerController, PowerRegisters, PowerState,
    SleepLevel,
};

use super::hooks::{HookError, HookHandle, HookSlot, SleepHooks};
use crate::config::{BootloaderHold, ClockConfig};

/// Sleep-level state machine over a register backend
pub struct PowerStateMachine<R> {
    regs: R,
    clock: ClockConfig,
    bootloader_hold: Option<BootloaderHold>,
    state: PowerState,
    hooks: HookSlot,
}

impl<R: PowerRegisters> PowerStateMachine<R> {
    /// Create a new power controller in the `Active` state
    ///
    /// # Arguments
    /// - `regs`: Register backend for the clock tree and system control
    /// - `clock`: Board clock wiring (selects the external oscillator steps)
    /// - `bootloader_hold`: Retained word consulted by the bootloader, if any
    pub fn new(regs: R, clock: ClockConfig, bootloader_hold: Option<BootloaderHold>) -> Self {
        Self {
            regs,
            clock,
            bootloader_hold,
            state: PowerState::Active,
            hooks: HookSlot::new(),
        }
    }

    /// Install the quiesce/resume pair, displacing any previous one
    pub fn register_hooks(&mut self, hooks: SleepHooks) -> HookHandle {
        self.hooks.register(hooks)
    }

    /// Swap the installed pair, if `handle` is still the current registration
    pub fn replace_hooks(
        &mut self,
        handle: HookHandle,
        hooks: SleepHooks,
    ) -> Result<HookHandle, HookError> {
        self.hooks.replace(handle, hooks)
    }

    /// Remove the installed pair, if `handle` is still the current registration
    pub fn clear_hooks(&mut self, handle: HookHandle) -> Result<(), HookError> {
        self.hooks.clear(handle)
    }

    /// Check if a hook pair is installed
    pub fn hooks_registered(&self) -> bool {
        self.hooks.is_registered()
    }

    /// Check if `handle` refers to the installed pair
    pub fn is_current(&self, handle: &HookHandle) -> bool {
        self.hooks.is_current(handle)
    }

    /// Read the clock tree state
    pub fn clock_configuration(&self) -> ClockConfiguration {
        self.regs.configuration()
    }

    /// Register backend
    pub fn registers(&self) -> &R {
        &self.regs
    }

    fn enter_sleep(&mut self) {
        self.state = PowerState::Sleeping;
        self.regs.clear_wakeup_flag();
        self.regs.wait_for_interrupt();
        self.state = PowerState::Active;
    }

    fn enter_hibernate(&mut self) {
        self.hooks.quiesce();

        self.state = PowerState::Hibernating;
        self.regs.set_deep_sleep(true);
        self.regs.clear_wakeup_flag();
        self.regs.set_low_power_mode(LowPowerMode::Stop);

        self.regs.wait_for_interrupt();

        self.regs.set_deep_sleep(false);
        self.restore_clocks();
        self.state = PowerState::Active;

        self.hooks.resume();
    }

    /// Bring the clock tree back to PLL after a stop-mode wake
    fn restore_clocks(&mut self) {
        if self.clock.external_oscillator {
            self.regs.enable_external_oscillator();
            while !self.regs.external_oscillator_ready() {
                core::hint::spin_loop();
            }
        }

        self.regs.enable_pll();
        while !self.regs.pll_locked() {
            core::hint::spin_loop();
        }

        self.regs.select_system_clock(ClockSource::Pll);
        while self.regs.system_clock() != ClockSource::Pll {
            core::hint::spin_loop();
        }

        if self.clock.external_oscillator {
            self.regs.disable_internal_oscillator();
        }
    }
}

impl<R: PowerRegisters> PowerController for PowerStateMachine<R> {
    fn acquire(&mut self) {}

    fn release(&mut self) {}

    fn state(&self) -> PowerState {
        self.state
    }

    fn sleep(&mut self, level: SleepLevel) {
        #[cfg(feature = "defmt")]
        defmt::debug!("power: entering {}", level);

        match level {
            SleepLevel::Sleep => self.enter_sleep(),
            SleepLevel::Hibernate => self.enter_hibernate(),
            SleepLevel::Off => self.power_off(),
        }
    }

    fn power_off(&mut self) -> ! {
        self.hooks.quiesce();

        self.state = PowerState::Off;
        self.regs.set_deep_sleep(true);
        self.regs.clear_wakeup_flag();
        self.regs.set_low_power_mode(LowPowerMode::PowerDown);

        loop {
            self.regs.wait_for_interrupt();
        }
    }

    fn reset(&mut self, run_application: bool) -> ! {
        if !run_application {
            if let Some(hold) = self.bootloader_hold {
                self.regs.write_retained_word(hold.address, hold.value);
            }
        }

        self.regs.request_system_reset();

        // The reset request takes a few cycles to land
        loop {
            core::hint::spin_loop();
        }
    }
}
