//! API for builtin plugin registration
//!
//! Plugins register themselves with the `collector_plugin!`,
//! `credential_plugin!` and `datasource_plugin!` macros. Entries are gathered
//! at link time and turned into registry descriptors by
//! [`Registries::builtin`](crate::plugin::registry::Registries::builtin).

use crate::plugin::traits::{Collector, Credential, DataSource};
use crate::plugin::types::PluginDescriptor;

/// Self-registration entry for a collector plugin
pub struct CollectorPluginEntry {
    pub descriptor: fn() -> PluginDescriptor<dyn Collector>,
}

/// Self-registration entry for a credential plugin
pub struct CredentialPluginEntry {
    pub descriptor: fn() -> PluginDescriptor<dyn Credential>,
}

/// Self-registration entry for a data source plugin
pub struct DataSourcePluginEntry {
    pub descriptor: fn() -> PluginDescriptor<dyn DataSource>,
}

inventory::collect!(CollectorPluginEntry);
inventory::collect!(CredentialPluginEntry);
inventory::collect!(DataSourcePluginEntry);

/// Register a collector plugin for automatic discovery
#[macro_export]
macro_rules! collector_plugin {
    ($descriptor_fn:expr) => {
        inventory::submit!($crate::plugin::builtin::api::CollectorPluginEntry {
            descriptor: $descriptor_fn
        });
    };
}

/// Register a credential plugin for automatic discovery
#[macro_export]
macro_rules! credential_plugin {
    ($descriptor_fn:expr) => {
        inventory::submit!($crate::plugin::builtin::api::CredentialPluginEntry {
            descriptor: $descriptor_fn
        });
    };
}

/// Register a data source plugin for automatic discovery
#[macro_export]
macro_rules! datasource_plugin {
    ($descriptor_fn:expr) => {
        inventory::submit!($crate::plugin::builtin::api::DataSourcePluginEntry {
            descriptor: $descriptor_fn
        });
    };
}
