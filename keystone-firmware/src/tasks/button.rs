//! User button
//!
//! Short press hibernates; holding past `LONG_PRESS_MS` resets into the
//! bootloader. The button sits on EXTI0, which is also what wakes the core
//! from stop mode: the time driver is halted there, so no timer can.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};
use keystone_hal::SleepLevel;

use crate::channels::{PowerRequest, POWER_REQUEST};

/// Contact bounce settle time
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Hold time that selects a bootloader reset
const LONG_PRESS: Duration = Duration::from_millis(2000);

#[embassy_executor::task]
pub async fn button_task(mut button: ExtiInput<'static>) {
    info!("Button task started");

    // Pressed is high (pull-down)
    if button.is_high() {
        button.wait_for_falling_edge().await;
    }

    loop {
        button.wait_for_rising_edge().await;

        let request = match select(button.wait_for_falling_edge(), Timer::after(LONG_PRESS)).await
        {
            Either::First(()) => PowerRequest::Sleep(SleepLevel::Hibernate),
            Either::Second(()) => PowerRequest::Reset {
                run_application: false,
            },
        };

        if button.is_high() {
            button.wait_for_falling_edge().await;
        }
        Timer::after(DEBOUNCE).await;

        info!("Button: {}", request);
        // The next loop iteration arms the rising edge before the power
        // task gets to run, so the press that follows can wake the core
        POWER_REQUEST.signal(request);
    }
}
