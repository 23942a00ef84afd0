//! Power and clock registers for STM32F4
//!
//! Thin one-register-per-call backend; `keystone-core` decides the order.

use cortex_m::peripheral::SCB;
use keystone_hal::{ClockRegisters, ClockSource, LowPowerMode, PowerRegisters};

const RCC_BASE: usize = 0x4002_3800;
const RCC_CR: *mut u32 = RCC_BASE as *mut u32;
const RCC_CFGR: *mut u32 = (RCC_BASE + 0x08) as *mut u32;

const PWR_CR: *mut u32 = 0x4000_7000 as *mut u32;

// RCC_CR
const HSION: u32 = 1 << 0;
const HSEON: u32 = 1 << 16;
const HSERDY: u32 = 1 << 17;
const PLLON: u32 = 1 << 24;
const PLLRDY: u32 = 1 << 25;

// RCC_CFGR
const SW_MASK: u32 = 0b11;
const SWS_SHIFT: u32 = 2;

// PWR_CR
const LPDS: u32 = 1 << 0;
const PDDS: u32 = 1 << 1;
const CWUF: u32 = 1 << 2;
const FPDS: u32 = 1 << 9;

fn read(reg: *mut u32) -> u32 {
    // SAFETY: only called with the fixed RCC/PWR register addresses above
    unsafe { core::ptr::read_volatile(reg) }
}

fn modify(reg: *mut u32, f: impl FnOnce(u32) -> u32) {
    // SAFETY: as for `read`; single execution context, no concurrent writers
    unsafe { core::ptr::write_volatile(reg, f(core::ptr::read_volatile(reg))) }
}

fn sw_bits(source: ClockSource) -> u32 {
    match source {
        ClockSource::Internal => 0b00,
        ClockSource::External => 0b01,
        ClockSource::Pll => 0b10,
    }
}

/// STM32F4 register backend
///
/// Owns the SCB so nothing else flips SLEEPDEEP underneath it.
pub struct Stm32f4PowerRegisters {
    scb: SCB,
}

impl Stm32f4PowerRegisters {
    /// Create the backend from the core's SCB
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }
}

impl ClockRegisters for Stm32f4PowerRegisters {
    fn enable_external_oscillator(&mut self) {
        modify(RCC_CR, |v| v | HSEON);
    }

    fn external_oscillator_ready(&self) -> bool {
        read(RCC_CR) & HSERDY != 0
    }

    fn enable_pll(&mut self) {
        modify(RCC_CR, |v| v | PLLON);
    }

    fn pll_locked(&self) -> bool {
        read(RCC_CR) & PLLRDY != 0
    }

    fn select_system_clock(&mut self, source: ClockSource) {
        modify(RCC_CFGR, |v| (v & !SW_MASK) | sw_bits(source));
    }

    fn system_clock(&self) -> ClockSource {
        match (read(RCC_CFGR) >> SWS_SHIFT) & SW_MASK {
            0b01 => ClockSource::External,
            0b10 => ClockSource::Pll,
            _ => ClockSource::Internal,
        }
    }

    fn disable_internal_oscillator(&mut self) {
        modify(RCC_CR, |v| v & !HSION);
    }
}

impl PowerRegisters for Stm32f4PowerRegisters {
    fn clear_wakeup_flag(&mut self) {
        modify(PWR_CR, |v| v | CWUF);
    }

    fn set_deep_sleep(&mut self, enabled: bool) {
        if enabled {
            self.scb.set_sleepdeep();
        } else {
            self.scb.clear_sleepdeep();
        }
    }

    fn set_low_power_mode(&mut self, mode: LowPowerMode) {
        match mode {
            // Stop with flash powered down and the regulator in low-power mode
            LowPowerMode::Stop => modify(PWR_CR, |v| (v & !PDDS) | FPDS | LPDS),
            // Standby
            LowPowerMode::PowerDown => modify(PWR_CR, |v| v | PDDS),
        }
    }

    fn wait_for_interrupt(&mut self) {
        cortex_m::asm::dsb();
        cortex_m::asm::wfi();
    }

    fn request_system_reset(&mut self) {
        SCB::sys_reset();
    }

    fn write_retained_word(&mut self, address: u32, value: u32) {
        // SAFETY: address comes from board configuration and points at the
        // RAM word reserved for the bootloader hold flag
        unsafe { core::ptr::write_volatile(address as *mut u32, value) }
    }
}
