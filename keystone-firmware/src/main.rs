//! Keystone - reference firmware for STM32F407 boards
//!
//! Builds the platform context (deployment storage and power controllers
//! behind the capability registry), reports the deployment region, and
//! hands the context to the power task.

#![no_std]
#![no_main]

use core::time::Duration;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, interrupt};
use keystone_core::registry::{ApiInfo, ApiType, CapabilityRegistry, Implementation};
use keystone_core::{DeploymentController, HookHandle, Platform, PowerStateMachine, SleepHooks};
use keystone_hal::StorageController;
use keystone_hal_stm32f4::{deployment_flash, id, Stm32f4Flash, Stm32f4PowerRegisters};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod tasks;

/// Constants generated from board.toml
mod board {
    include!(concat!(env!("OUT_DIR"), "/board.rs"));
}

use tasks::BoardPlatform;

const AUTHOR: &str = "Keystone Contributors";

bind_interrupts!(struct Irqs {
    EXTI0 => exti::InterruptHandler<interrupt::typelevel::EXTI0>;
});

// Controllers live for the whole program
static STORAGE: StaticCell<DeploymentController<Stm32f4Flash<'static>>> = StaticCell::new();
static POWER: StaticCell<PowerStateMachine<Stm32f4PowerRegisters>> = StaticCell::new();
static PLATFORM: StaticCell<BoardPlatform> = StaticCell::new();
static HOOKS: StaticCell<HookHandle> = StaticCell::new();

/// 168MHz from the PLL, fed by the crystal or by HSI
fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    if board::CLOCK.external_oscillator {
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2),
            divq: Some(PllQDiv::DIV7),
            divr: None,
        });
    } else {
        config.rcc.pll_src = PllSource::HSI;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV8,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2),
            divq: Some(PllQDiv::DIV7),
            divr: None,
        });
    }
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.sys = Sysclk::PLL1_P;
    config
}

/// Log the deployment region and check its first sector
fn report_deployment(storage: &mut dyn StorageController) {
    let descriptor = unwrap!(storage.descriptor());
    info!(
        "Deployment region: {} sectors, {} bytes",
        descriptor.sector_count(),
        descriptor.total_size()
    );

    if let Some(first) = descriptor.sectors.first() {
        let mut header = [0u8; 16];
        match storage.read(first.address, &mut header, Duration::from_millis(10)) {
            Ok(_) => info!("Deployment header at {:#x}: {:x}", first.address, header),
            Err(e) => warn!("Deployment header read failed: {}", e),
        }
    }

    match storage.is_block_erased(0) {
        Ok(true) => info!("No application deployed"),
        Ok(false) => info!("Application present"),
        Err(e) => warn!("Erase check failed: {}", e),
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Keystone firmware starting...");

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    let cp = unwrap!(cortex_m::Peripherals::take());

    let storage = STORAGE.init(unwrap!(deployment_flash(
        Flash::new_blocking(p.FLASH),
        board::DEPLOYMENT,
        id::device_id(),
    )));

    let power = POWER.init(PowerStateMachine::new(
        Stm32f4PowerRegisters::new(cp.SCB),
        board::CLOCK,
        board::BOOTLOADER_HOLD,
    ));
    // Kept so the registration can be replaced or cleared later
    let hooks = HOOKS.init(power.register_hooks(SleepHooks {
        quiesce: tasks::quiesce_peripherals,
        resume: tasks::resume_peripherals,
    }));
    debug!("Sleep hooks registered: {}", hooks);

    unwrap!(storage.acquire());
    report_deployment(storage);
    unwrap!(storage.release());

    // The on-chip flash reports the MCU id as its part id
    let mut platform = Platform::new(CapabilityRegistry::new());
    let device = unwrap!(platform.device_id(|| storage.part_id()));
    info!("Device id: {:#x}", device);

    let registry = platform.registry_mut();
    unwrap!(registry.register(ApiInfo {
        author: AUTHOR,
        name: "Keystone.STM32F4.DeploymentController",
        api_type: ApiType::DeploymentController,
        index: 0,
        version: 0,
        implementation: Implementation::Storage(storage),
    }));
    unwrap!(registry.register(ApiInfo {
        author: AUTHOR,
        name: "Keystone.STM32F4.PowerController",
        api_type: ApiType::PowerController,
        index: 0,
        version: 0,
        implementation: Implementation::Power(power),
    }));

    let platform = PLATFORM.init(platform);
    for api in platform.registry().iter() {
        info!("Capability {}[{}]: {} v{}", api.api_type, api.index, api.name, api.version);
    }

    let led = Output::new(p.PD12, Level::Low, Speed::Low);
    let button = ExtiInput::new(p.PA0, p.EXTI0, Pull::Down, Irqs);

    spawner.spawn(tasks::heartbeat_task(led)).unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();
    spawner.spawn(tasks::power_task(platform)).unwrap();

    info!("All tasks spawned, firmware running");
}
