//! Flash primitive implementations
//!
//! This crate provides concrete implementations of the `RawFlash` contract
//! defined in keystone-hal:
//!
//! - NOR flash over any `embedded-storage` driver with a sector table

#![no_std]
#![deny(unsafe_code)]

pub mod nor;

pub use nor::NorFlashPrimitive;
