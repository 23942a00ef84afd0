//! Embassy tasks

mod button;
mod heartbeat;
mod power;

pub use button::button_task;
pub use heartbeat::heartbeat_task;
pub use power::{power_task, resume_peripherals, quiesce_peripherals, BoardPlatform};
