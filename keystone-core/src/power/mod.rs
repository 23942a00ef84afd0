//! Power controller
//!
//! Sleep-level state machine that suspends and restores the clock tree
//! around low-power transitions, plus the quiesce/resume hook slot other
//! subsystems use to park their peripherals.

pub mod hooks;
pub mod machine;

pub use hooks::{HookError, HookHandle, SleepHooks};
pub use machine::PowerStateMachine;
