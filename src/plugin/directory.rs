//! Instance Directories
//!
//! Ordered, append-only collections of configured and initialized instances,
//! one per capability. Lookup is a linear scan by instance name in append
//! order, so with duplicate names the earliest instance wins.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Collector, ConfigureContext, Credential, DataSource, Plugin};
use crate::plugin::types::Capability;
use std::sync::Arc;

/// Live instances of one capability
pub struct InstanceDirectory<T: ?Sized> {
    capability: Capability,
    instances: Vec<Arc<T>>,
}

impl<T: ?Sized + Plugin> InstanceDirectory<T> {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            instances: Vec::new(),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Add an initialized instance at the end
    ///
    /// Instance names are not required to be unique; a duplicate is kept but
    /// stays unreachable by name behind the earlier instance.
    pub fn append(&mut self, instance: Arc<T>) {
        if self.instances.iter().any(|i| i.name() == instance.name()) {
            log::warn!(
                "Duplicate {} instance name '{}': lookups will return the earlier instance",
                self.capability,
                instance.name()
            );
        }
        self.instances.push(instance);
    }

    /// First instance with the given name
    pub fn find_by_name(&self, name: &str) -> PluginResult<Arc<T>> {
        self.instances
            .iter()
            .find(|instance| instance.name() == name)
            .cloned()
            .ok_or_else(|| PluginError::InstanceNotFound {
                capability: self.capability,
                instance_name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance names in append order
    pub fn names(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.name().to_string()).collect()
    }
}

impl<T: ?Sized> std::fmt::Debug for InstanceDirectory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDirectory")
            .field("capability", &self.capability)
            .field("len", &self.instances.len())
            .finish()
    }
}

/// Process-scoped instance state for all three capabilities
///
/// Created empty, filled once by the lifecycle orchestrator, then only read.
#[derive(Debug)]
pub struct Instances {
    pub credentials: InstanceDirectory<dyn Credential>,
    pub data_sources: InstanceDirectory<dyn DataSource>,
    pub collectors: InstanceDirectory<dyn Collector>,
}

impl Instances {
    pub fn new() -> Self {
        Self {
            credentials: InstanceDirectory::new(Capability::Credential),
            data_sources: InstanceDirectory::new(Capability::DataSource),
            collectors: InstanceDirectory::new(Capability::Collector),
        }
    }

    /// Cross-reference view handed to `configure`
    pub fn configure_context(&self) -> ConfigureContext<'_> {
        ConfigureContext::new(&self.credentials, &self.data_sources)
    }

    pub fn len(&self, capability: Capability) -> usize {
        match capability {
            Capability::Credential => self.credentials.len(),
            Capability::DataSource => self.data_sources.len(),
            Capability::Collector => self.collectors.len(),
        }
    }

    /// True when no capability holds any instance
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty() && self.data_sources.is_empty() && self.collectors.is_empty()
    }
}

impl Default for Instances {
    fn default() -> Self {
        Self::new()
    }
}
