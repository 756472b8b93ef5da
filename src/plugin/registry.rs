//! Plugin Registries
//!
//! One registry per capability, mapping a plugin name to the descriptor that
//! constructs instances of it. Registries are filled at startup and only read
//! afterwards; a later registration under an existing name replaces the
//! earlier one.

use crate::plugin::builtin::api::{CollectorPluginEntry, CredentialPluginEntry, DataSourcePluginEntry};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Collector, Credential, DataSource};
use crate::plugin::types::{Capability, PluginDescriptor};
use std::collections::HashMap;

/// Plugin name to descriptor table for one capability
pub struct PluginRegistry<T: ?Sized> {
    capability: Capability,
    descriptors: HashMap<&'static str, PluginDescriptor<T>>,
}

impl<T: ?Sized> std::fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("capability", &self.capability)
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

impl<T: ?Sized> PluginRegistry<T> {
    /// Create a new empty registry
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            descriptors: HashMap::new(),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Register a plugin kind, replacing any descriptor with the same name
    pub fn register(&mut self, descriptor: PluginDescriptor<T>) {
        let plugin_name = descriptor.plugin_name();
        if self.descriptors.insert(plugin_name, descriptor).is_some() {
            log::debug!(
                "{} plugin '{}' registered again, replacing the earlier registration",
                self.capability,
                plugin_name
            );
        } else {
            log::trace!("Registered {} plugin '{}'", self.capability, plugin_name);
        }
    }

    /// Find the descriptor for a configured plugin name
    pub fn resolve(&self, plugin_name: &str) -> PluginResult<&PluginDescriptor<T>> {
        self.descriptors
            .get(plugin_name)
            .ok_or_else(|| PluginError::PluginNotFound {
                capability: self.capability,
                plugin_name: plugin_name.to_string(),
            })
    }

    /// Resolve and construct a fresh instance in one step
    pub fn instantiate(&self, plugin_name: &str) -> PluginResult<Box<T>> {
        self.resolve(plugin_name).map(PluginDescriptor::instantiate)
    }

    pub fn has_plugin(&self, plugin_name: &str) -> bool {
        self.descriptors.contains_key(plugin_name)
    }

    /// Registered plugin names, sorted
    pub fn plugin_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.descriptors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// The three process-wide plugin registries
#[derive(Debug)]
pub struct Registries {
    pub credentials: PluginRegistry<dyn Credential>,
    pub data_sources: PluginRegistry<dyn DataSource>,
    pub collectors: PluginRegistry<dyn Collector>,
}

impl Registries {
    /// Registries with nothing registered
    pub fn new() -> Self {
        Self {
            credentials: PluginRegistry::new(Capability::Credential),
            data_sources: PluginRegistry::new(Capability::DataSource),
            collectors: PluginRegistry::new(Capability::Collector),
        }
    }

    /// Registries holding every plugin that registered itself at build time
    pub fn builtin() -> Self {
        let mut registries = Self::new();

        for entry in inventory::iter::<CredentialPluginEntry> {
            registries.credentials.register((entry.descriptor)());
        }
        for entry in inventory::iter::<DataSourcePluginEntry> {
            registries.data_sources.register((entry.descriptor)());
        }
        for entry in inventory::iter::<CollectorPluginEntry> {
            registries.collectors.register((entry.descriptor)());
        }

        log::debug!(
            "Plugin registries ready: {} credential, {} datasource, {} collector",
            registries.credentials.len(),
            registries.data_sources.len(),
            registries.collectors.len()
        );
        registries
    }

    /// Registered plugin names for one capability, sorted
    pub fn plugin_names(&self, capability: Capability) -> Vec<&'static str> {
        match capability {
            Capability::Credential => self.credentials.plugin_names(),
            Capability::DataSource => self.data_sources.plugin_names(),
            Capability::Collector => self.collectors.plugin_names(),
        }
    }

    /// Check that a plugin name resolves for the given capability
    pub fn check(&self, capability: Capability, plugin_name: &str) -> PluginResult<()> {
        match capability {
            Capability::Credential => self.credentials.resolve(plugin_name).map(|_| ()),
            Capability::DataSource => self.data_sources.resolve(plugin_name).map(|_| ()),
            Capability::Collector => self.collectors.resolve(plugin_name).map(|_| ()),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
