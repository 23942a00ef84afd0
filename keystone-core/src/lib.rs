//! Board-agnostic controllers for the firmware hardware boundary
//!
//! This crate contains everything above the register and flash primitives
//! that does not depend on a specific chip:
//!
//! - Capability registry keyed by controller type and instance index
//! - Deployment storage controller (logical window onto a NOR flash)
//! - Power state machine with quiesce/resume hooks
//! - Board configuration types
//! - The platform context object that owns all of the above

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod context;
pub mod deployment;
pub mod power;
pub mod registry;

#[cfg(test)]
mod mock;

pub use config::{BoardConfig, BootloaderHold, ClockConfig, DeploymentLayout};
pub use context::Platform;
pub use deployment::DeploymentController;
pub use power::{HookHandle, PowerStateMachine, SleepHooks};
pub use registry::{ApiInfo, ApiKey, ApiType, CapabilityRegistry, Implementation};
