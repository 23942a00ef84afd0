//! Power task
//!
//! Owns the platform context and serves power requests. Transitions block
//! the executor until the core wakes, which is what we want: nothing else
//! should run while the clock tree is down.

use core::sync::atomic::{AtomicU32, Ordering};

use defmt::*;
use keystone_core::Platform;

use crate::channels::{PowerRequest, POWER_REQUEST};

/// Registry capacity: one deployment controller, one power controller
pub const CAPABILITIES: usize = 2;

/// Platform context for this board
pub type BoardPlatform = Platform<'static, CAPABILITIES>;

static WAKES: AtomicU32 = AtomicU32::new(0);

/// Number of completed hibernate cycles
pub fn wake_count() -> u32 {
    WAKES.load(Ordering::Relaxed)
}

/// Quiesce hook: runs before the core halts
pub fn quiesce_peripherals() {
    info!("Quiescing peripherals");
}

/// Resume hook: runs once the PLL is back
pub fn resume_peripherals() {
    WAKES.fetch_add(1, Ordering::Relaxed);
}

#[embassy_executor::task]
pub async fn power_task(platform: &'static mut BoardPlatform) {
    info!("Power task started");

    loop {
        let request = POWER_REQUEST.wait().await;

        let Some(power) = platform.registry_mut().power(0) else {
            error!("No power controller registered");
            continue;
        };

        match request {
            PowerRequest::Sleep(level) => {
                power.acquire();
                power.sleep(level);
                power.release();
                debug!("Power state back to {}", power.state());
            }
            PowerRequest::Reset { run_application } => power.reset(run_application),
        }
    }
}
