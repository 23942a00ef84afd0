//! STM32F4-specific backend for the Keystone controllers
//!
//! This crate provides the chip side of the `keystone-hal` contracts for
//! STM32F405/407 parts:
//!
//! - `PowerRegisters` over SCB, PWR and RCC
//! - Flash sector table and a `RawFlash` built on embassy-stm32's driver
//! - Device identifier readout
//!
//! # Features
//!
//! - `stm32f407vg` - STM32F407VG (1MB flash, single bank)
//! - `stm32f405rg` - STM32F405RG (1MB flash, single bank)
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod flash;
pub mod id;
pub mod power;

pub use flash::{deployment_flash, Stm32f4Flash, FLASH_BASE};
pub use power::Stm32f4PowerRegisters;
