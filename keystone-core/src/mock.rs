//! Test doubles for the flash primitive and the power registers

use core::cell::{Cell, RefCell};
use std::vec;
use std::vec::Vec;

use keystone_hal::{
    ClockRegisters, ClockSource, FlashError, LowPowerMode, PowerRegisters, RawFlash, SectorMap,
};

/// Observable side effects, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Quiesce,
    Resume,
    ClearWakeup,
    DeepSleep(bool),
    LowPower(LowPowerMode),
    Wfi,
    EnableExternal,
    ExternalReady,
    EnablePll,
    PllLocked,
    SelectClock(ClockSource),
    ClockSwitched(ClockSource),
    DisableInternal,
    RetainedWrite(u32, u32),
    ResetRequest,
}

std::thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

pub fn record(event: Event) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

pub fn take_events() -> Vec<Event> {
    EVENTS.with(|events| core::mem::take(&mut *events.borrow_mut()))
}

pub fn quiesce_hook() {
    record(Event::Quiesce);
}

pub fn resume_hook() {
    record(Event::Resume);
}

pub const ERASED: u8 = 0xFF;

/// In-memory NOR flash with uniform sectors
///
/// Programming ANDs bits into the array like real NOR cells.
pub struct MockFlash {
    addresses: Vec<u32>,
    sizes: Vec<u32>,
    base: u32,
    data: Vec<u8>,
    pub erase_requests: Vec<u32>,
    pub verify_requests: Vec<u32>,
    pub acquired: i32,
    pub fail_next: Option<FlashError>,
    pub part_id: u32,
}

impl MockFlash {
    pub fn new(base: u32, sector_size: u32, sector_count: u32) -> Self {
        let addresses = (0..sector_count).map(|i| base + i * sector_size).collect();
        let sizes = vec![sector_size; sector_count as usize];
        Self {
            addresses,
            sizes,
            base,
            data: vec![ERASED; (sector_size * sector_count) as usize],
            erase_requests: Vec::new(),
            verify_requests: Vec::new(),
            acquired: 0,
            fail_next: None,
            part_id: 0x0041_1234,
        }
    }

    pub fn with_sizes(base: u32, sizes: &[u32]) -> Self {
        let mut addresses = Vec::new();
        let mut next = base;
        for &size in sizes {
            addresses.push(next);
            next += size;
        }
        Self {
            addresses,
            sizes: sizes.to_vec(),
            base,
            data: vec![ERASED; (next - base) as usize],
            erase_requests: Vec::new(),
            verify_requests: Vec::new(),
            acquired: 0,
            fail_next: None,
            part_id: 0x0041_1234,
        }
    }

    pub fn addresses(&self) -> &[u32] {
        &self.addresses
    }

    fn injected(&mut self) -> Result<(), FlashError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn span(&self, address: u32, len: usize) -> Result<core::ops::Range<usize>, FlashError> {
        let start = address
            .checked_sub(self.base)
            .ok_or(FlashError::OutOfBounds)? as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(FlashError::OutOfBounds);
        }
        Ok(start..end)
    }

    fn sector_span(&self, sector: u32) -> Result<core::ops::Range<usize>, FlashError> {
        let index = sector as usize;
        let (address, size) = match (self.addresses.get(index), self.sizes.get(index)) {
            (Some(&address), Some(&size)) => (address, size),
            _ => return Err(FlashError::InvalidSector),
        };
        self.span(address, size as usize)
    }
}

impl RawFlash for MockFlash {
    fn acquire(&mut self) -> Result<(), FlashError> {
        self.injected()?;
        self.acquired += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), FlashError> {
        self.injected()?;
        self.acquired -= 1;
        Ok(())
    }

    fn read(&mut self, address: u32, buffer: &mut [u8]) -> Result<usize, FlashError> {
        self.injected()?;
        let span = self.span(address, buffer.len())?;
        buffer.copy_from_slice(&self.data[span]);
        Ok(buffer.len())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<usize, FlashError> {
        self.injected()?;
        let span = self.span(address, data.len())?;
        for (cell, &byte) in self.data[span].iter_mut().zip(data) {
            *cell &= byte;
        }
        Ok(data.len())
    }

    fn erase_sector(&mut self, sector: u32) -> Result<(), FlashError> {
        self.erase_requests.push(sector);
        self.injected()?;
        let span = self.sector_span(sector)?;
        self.data[span].fill(ERASED);
        Ok(())
    }

    fn is_sector_erased(&mut self, sector: u32) -> Result<bool, FlashError> {
        self.verify_requests.push(sector);
        self.injected()?;
        let span = self.sector_span(sector)?;
        Ok(self.data[span].iter().all(|&b| b == ERASED))
    }

    fn sector_map(&self) -> SectorMap<'_> {
        SectorMap::new(&self.addresses, &self.sizes).expect("parallel tables")
    }

    fn part_id(&mut self) -> Result<u32, FlashError> {
        self.injected()?;
        Ok(self.part_id)
    }
}

/// Register model of an STM32-style clock tree
///
/// Panics where real hardware would stall or lose power, so tests can
/// observe both ordering violations and the non-returning paths.
pub struct MockRegisters {
    external_on: bool,
    external_polls_left: Cell<u32>,
    external_reported: Cell<bool>,
    internal_on: bool,
    pll_on: bool,
    pll_polls_left: Cell<u32>,
    pll_reported: Cell<bool>,
    source: Cell<ClockSource>,
    requested: ClockSource,
    switch_polls_left: Cell<u32>,
    clock_reads: Cell<u32>,
    deep_sleep: bool,
    mode: LowPowerMode,
    startup_polls: u32,
}

impl MockRegisters {
    /// Clock tree running from the PLL, as after boot
    pub fn running(startup_polls: u32) -> Self {
        Self {
            external_on: true,
            external_polls_left: Cell::new(0),
            external_reported: Cell::new(true),
            internal_on: false,
            pll_on: true,
            pll_polls_left: Cell::new(0),
            pll_reported: Cell::new(true),
            source: Cell::new(ClockSource::Pll),
            requested: ClockSource::Pll,
            switch_polls_left: Cell::new(0),
            clock_reads: Cell::new(0),
            deep_sleep: false,
            mode: LowPowerMode::Stop,
            startup_polls,
        }
    }

    pub fn internal_on(&self) -> bool {
        self.internal_on
    }

    pub fn deep_sleep(&self) -> bool {
        self.deep_sleep
    }

    /// Number of switch-status reads so far
    pub fn clock_reads(&self) -> u32 {
        self.clock_reads.get()
    }

    /// Stop mode exit: hardware falls back to the internal oscillator
    fn wake_from_stop(&mut self) {
        self.internal_on = true;
        self.source.set(ClockSource::Internal);
        self.requested = ClockSource::Internal;
        self.switch_polls_left.set(0);
        self.external_on = false;
        self.external_reported.set(false);
        self.pll_on = false;
        self.pll_reported.set(false);
    }
}

impl ClockRegisters for MockRegisters {
    fn enable_external_oscillator(&mut self) {
        record(Event::EnableExternal);
        self.external_on = true;
        self.external_polls_left.set(self.startup_polls);
    }

    fn external_oscillator_ready(&self) -> bool {
        if !self.external_on {
            return false;
        }
        let left = self.external_polls_left.get();
        if left > 0 {
            self.external_polls_left.set(left - 1);
            return false;
        }
        if !self.external_reported.replace(true) {
            record(Event::ExternalReady);
        }
        true
    }

    fn enable_pll(&mut self) {
        record(Event::EnablePll);
        self.pll_on = true;
        self.pll_polls_left.set(self.startup_polls);
    }

    fn pll_locked(&self) -> bool {
        if !self.pll_on {
            return false;
        }
        let left = self.pll_polls_left.get();
        if left > 0 {
            self.pll_polls_left.set(left - 1);
            return false;
        }
        if !self.pll_reported.replace(true) {
            record(Event::PllLocked);
        }
        true
    }

    fn select_system_clock(&mut self, source: ClockSource) {
        record(Event::SelectClock(source));
        if source == ClockSource::Pll {
            assert!(
                self.pll_on && self.pll_polls_left.get() == 0,
                "system clock switched to an unlocked PLL"
            );
        }
        // Switch status follows the request only after a few reads
        self.requested = source;
        self.switch_polls_left.set(self.startup_polls);
    }

    fn system_clock(&self) -> ClockSource {
        self.clock_reads.set(self.clock_reads.get() + 1);
        if self.source.get() != self.requested {
            let left = self.switch_polls_left.get();
            if left > 0 {
                self.switch_polls_left.set(left - 1);
            } else {
                self.source.set(self.requested);
                record(Event::ClockSwitched(self.requested));
            }
        }
        self.source.get()
    }

    fn disable_internal_oscillator(&mut self) {
        record(Event::DisableInternal);
        assert!(
            self.source.get() != ClockSource::Internal,
            "internal oscillator disabled while clocking the core"
        );
        self.internal_on = false;
    }
}

impl PowerRegisters for MockRegisters {
    fn clear_wakeup_flag(&mut self) {
        record(Event::ClearWakeup);
    }

    fn set_deep_sleep(&mut self, enabled: bool) {
        record(Event::DeepSleep(enabled));
        self.deep_sleep = enabled;
    }

    fn set_low_power_mode(&mut self, mode: LowPowerMode) {
        record(Event::LowPower(mode));
        self.mode = mode;
    }

    fn wait_for_interrupt(&mut self) {
        record(Event::Wfi);
        if self.deep_sleep {
            match self.mode {
                LowPowerMode::Stop => self.wake_from_stop(),
                LowPowerMode::PowerDown => panic!("core powered down"),
            }
        }
    }

    fn request_system_reset(&mut self) {
        record(Event::ResetRequest);
        panic!("system reset");
    }

    fn write_retained_word(&mut self, address: u32, value: u32) {
        record(Event::RetainedWrite(address, value));
    }
}
