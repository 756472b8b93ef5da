//! Type definitions for the plugin system
//!
//! Capabilities, parameter maps, registry descriptors and the declarative
//! entries the orchestrator consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The role a plugin fulfils
///
/// Declaration order is the startup order: later capabilities may refer to
/// instances of earlier ones by name, never the reverse.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    Credential,
    DataSource,
    Collector,
}

/// Parameters of a configured instance
///
/// Values are kept as loosely typed JSON whatever the config file format was.
/// Lookups on missing keys yield `None`; type checks are left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a parameter only if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert, mostly for tests and programmatic configs
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Registry record for one plugin kind
///
/// Associates the plugin name with a constructor producing a fresh,
/// unconfigured instance. `T` is the capability trait object.
pub struct PluginDescriptor<T: ?Sized> {
    plugin_name: &'static str,
    factory: Box<dyn Fn() -> Box<T> + Send + Sync>,
}

impl<T: ?Sized> PluginDescriptor<T> {
    pub fn new<F>(plugin_name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        Self {
            plugin_name,
            factory: Box::new(factory),
        }
    }

    pub fn plugin_name(&self) -> &'static str {
        self.plugin_name
    }

    /// Construct a new instance holding nothing but defaults
    pub fn instantiate(&self) -> Box<T> {
        (self.factory)()
    }
}

impl<T: ?Sized> std::fmt::Debug for PluginDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}

/// One declared instance: `{name, plugin, params}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// User-assigned instance name
    pub name: String,
    /// Plugin name to resolve in the capability's registry
    pub plugin: String,
    #[serde(default)]
    pub params: Params,
}

impl ConfigEntry {
    pub fn new(name: impl Into<String>, plugin: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            params,
        }
    }
}

/// The three declaration lists, in the order given by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declarations {
    pub credentials: Vec<ConfigEntry>,
    pub data_sources: Vec<ConfigEntry>,
    pub collectors: Vec<ConfigEntry>,
}

impl Declarations {
    pub fn entries(&self, capability: Capability) -> &[ConfigEntry] {
        match capability {
            Capability::Credential => &self.credentials,
            Capability::DataSource => &self.data_sources,
            Capability::Collector => &self.collectors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty() && self.data_sources.is_empty() && self.collectors.is_empty()
    }
}
