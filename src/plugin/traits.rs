//! Capability traits
//!
//! Every plugin implements [`Plugin`] plus exactly one capability trait:
//! [`Collector`], [`Credential`] or [`DataSource`].
//!
//! # Lifecycle
//!
//! 1. The orchestrator builds a fresh instance from the registry descriptor
//! 2. `configure(name, params, context)` binds identity and parameters. It
//!    validates structure only and never performs I/O. Instances declared by
//!    earlier capabilities are reachable through the [`ConfigureContext`].
//! 3. `initialize()` performs all I/O-bound setup (files, tokens, connections)
//! 4. The instance is appended to its capability's instance directory and
//!    lives until the process exits
//!
//! Collectors are additionally run through `collect()` by the entry point.

use crate::plugin::directory::InstanceDirectory;
use crate::plugin::error::PluginResult;
use crate::plugin::types::Params;
use serde_json::Value;
use std::sync::Arc;

/// Base contract shared by all capabilities
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Instance name set by the most recent `configure` call
    fn name(&self) -> &str;

    /// Fixed identifier of the plugin kind, used as the registry key
    fn plugin_name(&self) -> &'static str;

    /// Bind the instance name and parameters
    ///
    /// Fails with `PluginError::Configuration` when a required parameter is
    /// missing or malformed, or when a referenced instance cannot be found.
    fn configure(
        &mut self,
        name: &str,
        params: Params,
        context: &ConfigureContext<'_>,
    ) -> PluginResult<()>;

    /// Perform I/O-bound setup; failures are `PluginError::Initialization`
    async fn initialize(&mut self) -> PluginResult<()>;

    /// All configured parameters
    fn params(&self) -> &Params;

    /// One configured parameter, `None` when absent
    fn param(&self, key: &str) -> Option<&Value> {
        self.params().get(key)
    }
}

/// Plugins that fetch and report data
#[async_trait::async_trait]
pub trait Collector: Plugin {
    /// Run the collection once; never retried by the caller
    async fn collect(&self) -> PluginResult<()>;
}

/// Plugins holding authentication material for other plugins
pub trait Credential: Plugin {}

/// Plugins describing where data lives
pub trait DataSource: Plugin {}

/// Read-only view of already initialized instances, handed to `configure`
///
/// Only capabilities that start earlier than the one being configured are
/// guaranteed to be fully populated.
#[derive(Clone, Copy)]
pub struct ConfigureContext<'a> {
    pub credentials: &'a InstanceDirectory<dyn Credential>,
    pub data_sources: &'a InstanceDirectory<dyn DataSource>,
}

impl<'a> ConfigureContext<'a> {
    pub fn new(
        credentials: &'a InstanceDirectory<dyn Credential>,
        data_sources: &'a InstanceDirectory<dyn DataSource>,
    ) -> Self {
        Self {
            credentials,
            data_sources,
        }
    }

    /// Look up a credential instance by name
    pub fn credential(&self, name: &str) -> PluginResult<Arc<dyn Credential>> {
        self.credentials.find_by_name(name)
    }

    /// Look up a data source instance by name
    pub fn data_source(&self, name: &str) -> PluginResult<Arc<dyn DataSource>> {
        self.data_sources.find_by_name(name)
    }
}
