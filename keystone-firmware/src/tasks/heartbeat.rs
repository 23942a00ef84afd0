//! Heartbeat LED and wake counter

use defmt::*;
use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Ticker};

use super::power::wake_count;

/// Blink interval
const HEARTBEAT_INTERVAL_MS: u64 = 500;

#[embassy_executor::task]
pub async fn heartbeat_task(mut led: Output<'static>) {
    info!("Heartbeat task started");

    let mut ticker = Ticker::every(Duration::from_millis(HEARTBEAT_INTERVAL_MS));
    let mut seen_wakes = 0;

    loop {
        ticker.next().await;
        led.toggle();

        let wakes = wake_count();
        if wakes != seen_wakes {
            info!("Resumed from hibernate ({} total)", wakes);
            seen_wakes = wakes;
        }
    }
}
