//! Capability registry
//!
//! Maps a `(type, index)` key to one controller implementation. Entries are
//! added once at startup and stay for the life of the program; lookups take
//! `&self` and never disturb earlier results.

use heapless::Vec;
use keystone_hal::{PowerController, StorageController};

/// Controller capability types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApiType {
    /// Deployment region block device
    DeploymentController,
    /// Sleep and reset control
    PowerController,
}

/// Registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ApiKey {
    /// Capability type
    pub api_type: ApiType,
    /// Instance index within the type
    pub index: u8,
}

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// An entry with this key is already registered
    Duplicate(ApiKey),
    /// No room for another entry
    Full,
    /// Implementation does not match the declared capability type
    TypeMismatch,
}

/// Controller implementation behind an entry
pub enum Implementation<'a> {
    /// A storage controller
    Storage(&'a mut dyn StorageController),
    /// A power controller
    Power(&'a mut dyn PowerController),
}

impl Implementation<'_> {
    fn api_type(&self) -> ApiType {
        match self {
            Implementation::Storage(_) => ApiType::DeploymentController,
            Implementation::Power(_) => ApiType::PowerController,
        }
    }
}

/// Registry entry
///
/// `author` and `name` are for display only and never used for lookup.
pub struct ApiInfo<'a> {
    /// Vendor string
    pub author: &'static str,
    /// Fully qualified platform/capability name
    pub name: &'static str,
    /// Capability type
    pub api_type: ApiType,
    /// Instance index within the type
    pub index: u8,
    /// Interface version
    pub version: u32,
    /// The controller itself
    pub implementation: Implementation<'a>,
}

impl ApiInfo<'_> {
    /// Key this entry is registered under
    pub fn key(&self) -> ApiKey {
        ApiKey {
            api_type: self.api_type,
            index: self.index,
        }
    }
}

/// Fixed-capacity registry of controller implementations
pub struct CapabilityRegistry<'a, const N: usize> {
    entries: Vec<ApiInfo<'a>, N>,
}

impl<'a, const N: usize> CapabilityRegistry<'a, N> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry
    ///
    /// Each `(type, index)` pair can be registered once.
    pub fn register(&mut self, info: ApiInfo<'a>) -> Result<ApiKey, RegistryError> {
        if info.implementation.api_type() != info.api_type {
            return Err(RegistryError::TypeMismatch);
        }

        let key = info.key();
        if self.entries.iter().any(|entry| entry.key() == key) {
            return Err(RegistryError::Duplicate(key));
        }

        self.entries.push(info).map_err(|_| RegistryError::Full)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("registry: {} registered as {}", key, self.entries[self.entries.len() - 1].name);

        Ok(key)
    }

    /// First instance of a capability type
    pub fn get_api(&self, api_type: ApiType) -> Option<&ApiInfo<'a>> {
        self.get_api_at(api_type, 0)
    }

    /// Specific instance of a capability type
    pub fn get_api_at(&self, api_type: ApiType, index: u8) -> Option<&ApiInfo<'a>> {
        let key = ApiKey { api_type, index };
        self.entries.iter().find(|entry| entry.key() == key)
    }

    /// Storage controller registered at `(DeploymentController, index)`
    pub fn storage(&mut self, index: u8) -> Option<&mut (dyn StorageController + 'a)> {
        let key = ApiKey {
            api_type: ApiType::DeploymentController,
            index,
        };
        match self.entries.iter_mut().find(|entry| entry.key() == key) {
            Some(ApiInfo {
                implementation: Implementation::Storage(storage),
                ..
            }) => Some(&mut **storage),
            _ => None,
        }
    }

    /// Power controller registered at `(PowerController, index)`
    pub fn power(&mut self, index: u8) -> Option<&mut (dyn PowerController + 'a)> {
        let key = ApiKey {
            api_type: ApiType::PowerController,
            index,
        };
        match self.entries.iter_mut().find(|entry| entry.key() == key) {
            Some(ApiInfo {
                implementation: Implementation::Power(power),
                ..
            }) => Some(&mut **power),
            _ => None,
        }
    }

    /// All entries, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ApiInfo<'a>> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> Default for CapabilityRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
