//! Keystone Hardware Abstraction Layer
//!
//! This crate defines the capability traits a firmware runtime talks to,
//! and the lower-level contracts those controllers are built from. Chip
//! crates implement the lower-level contracts; `keystone-core` builds the
//! controllers on top of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Runtime (keystone-firmware, etc.)      │
//! └─────────────────────────────────────────┘
//!                     │  StorageController / PowerController
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keystone-core (registry, controllers)  │
//! └─────────────────────────────────────────┘
//!                     │  RawFlash / PowerRegisters
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  keystone-    │       │ keystone-hal- │
//! │  drivers      │       │   stm32f4     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::RawFlash`] - Physical NOR flash primitive
//! - [`storage::StorageController`] - Logical block device capability
//! - [`clock::ClockRegisters`], [`clock::PowerRegisters`] - Register access
//! - [`power::PowerController`] - Sleep level and reset capability

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod flash;
pub mod power;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use clock::{ClockConfiguration, ClockRegisters, ClockSource, LowPowerMode, PowerRegisters};
pub use flash::{FlashError, RawFlash, SectorMap};
pub use power::{PowerController, PowerState, SleepLevel};
pub use storage::{SectorInfo, StorageController, StorageDescriptor, StorageError};
