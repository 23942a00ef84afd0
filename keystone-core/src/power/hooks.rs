//! Quiesce/resume hook slot
//!
//! One slot, one registration. A new registration displaces the previous
//! one; every registration hands back a handle so the owner can later
//! replace or clear exactly what it installed.

/// Callback pair run around deep low-power transitions
#[derive(Debug, Clone, Copy)]
pub struct SleepHooks {
    /// Runs before the core halts (stop DMA, park peripherals)
    pub quiesce: fn(),
    /// Runs after the clock tree is restored
    pub resume: fn(),
}

/// Errors from hook slot operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HookError {
    /// The handle's registration has since been displaced or cleared
    Stale,
}

/// Proof of a registration
///
/// Only the most recent handle is current.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "the handle is needed to replace or clear the hooks later"]
pub struct HookHandle {
    generation: u32,
}

impl HookHandle {
    /// Registration number this handle refers to
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Single-entry hook storage
#[derive(Debug, Default)]
pub(crate) struct HookSlot {
    hooks: Option<SleepHooks>,
    generation: u32,
}

impl HookSlot {
    pub(crate) const fn new() -> Self {
        Self {
            hooks: None,
            generation: 0,
        }
    }

    /// Install `hooks`, displacing whatever was there
    pub(crate) fn register(&mut self, hooks: SleepHooks) -> HookHandle {
        if self.hooks.is_some() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "sleep hooks of registration {} displaced",
                self.generation
            );
        }

        self.generation = self.generation.wrapping_add(1);
        self.hooks = Some(hooks);
        HookHandle {
            generation: self.generation,
        }
    }

    /// Install `hooks` only if `handle` is the current registration
    pub(crate) fn replace(
        &mut self,
        handle: HookHandle,
        hooks: SleepHooks,
    ) -> Result<HookHandle, HookError> {
        self.check(&handle)?;
        self.generation = self.generation.wrapping_add(1);
        self.hooks = Some(hooks);
        Ok(HookHandle {
            generation: self.generation,
        })
    }

    /// Empty the slot if `handle` is the current registration
    pub(crate) fn clear(&mut self, handle: HookHandle) -> Result<(), HookError> {
        self.check(&handle)?;
        self.hooks = None;
        // Bump so the consumed handle can never match again
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.hooks.is_some()
    }

    pub(crate) fn is_current(&self, handle: &HookHandle) -> bool {
        self.hooks.is_some() && handle.generation == self.generation
    }

    pub(crate) fn quiesce(&self) {
        if let Some(hooks) = self.hooks {
            (hooks.quiesce)();
        }
    }

    pub(crate) fn resume(&self) {
        if let Some(hooks) = self.hooks {
            (hooks.resume)();
        }
    }

    fn check(&self, handle: &HookHandle) -> Result<(), HookError> {
        if self.is_current(handle) {
            Ok(())
        } else {
            Err(HookError::Stale)
        }
    }
}
