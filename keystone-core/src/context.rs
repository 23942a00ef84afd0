//! Platform context
//!
//! Everything the runtime used to reach through globals lives here: the
//! capability registry and the cached device identifier. Build one at
//! startup and pass it to whoever needs a controller.

use crate::registry::CapabilityRegistry;

/// Explicitly owned platform state
pub struct Platform<'a, const N: usize> {
    registry: CapabilityRegistry<'a, N>,
    device_id: Option<u32>,
}

impl<'a, const N: usize> Platform<'a, N> {
    /// Create a platform around a populated registry
    pub fn new(registry: CapabilityRegistry<'a, N>) -> Self {
        Self {
            registry,
            device_id: None,
        }
    }

    /// Registered controllers
    pub fn registry(&self) -> &CapabilityRegistry<'a, N> {
        &self.registry
    }

    /// Registered controllers, mutably
    pub fn registry_mut(&mut self) -> &mut CapabilityRegistry<'a, N> {
        &mut self.registry
    }

    /// Device identifier, read once and then served from cache
    ///
    /// A zero identifier means the device has not answered yet and is
    /// not cached.
    pub fn device_id<E>(&mut self, read: impl FnOnce() -> Result<u32, E>) -> Result<u32, E> {
        if let Some(id) = self.device_id {
            return Ok(id);
        }

        let id = read()?;
        if id != 0 {
            self.device_id = Some(id);
        }
        Ok(id)
    }
}
