//! Plugin Error Handling
//!
//! Error types for resolving plugins, configuring and initializing instances,
//! looking instances up by name, and running a collector.

use crate::core::error_handling::ContextualError;
use crate::plugin::types::Capability;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Errors raised by plugins and by the registries and directories holding them
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// Missing or malformed parameter, or an unresolved cross-reference
    #[error("Invalid configuration for '{instance}': {message}")]
    Configuration { instance: String, message: String },

    /// I/O, authentication or network failure while preparing an instance
    #[error("Failed to initialize '{instance}': {cause}")]
    Initialization { instance: String, cause: String },

    /// No plugin registered under this name for the capability
    #[error("No {capability} plugin registered as '{plugin_name}'")]
    PluginNotFound {
        capability: Capability,
        plugin_name: String,
    },

    /// No configured instance carries this name
    #[error("No {capability} instance named '{instance_name}'")]
    InstanceNotFound {
        capability: Capability,
        instance_name: String,
    },

    /// A collector failed while fetching or reporting data
    #[error("Collector '{instance}' failed to collect data: {cause}")]
    Collection { instance: String, cause: String },
}

impl PluginError {
    pub fn configuration(instance: &str, message: impl Into<String>) -> Self {
        PluginError::Configuration {
            instance: instance.to_string(),
            message: message.into(),
        }
    }

    pub fn initialization(instance: &str, cause: impl std::fmt::Display) -> Self {
        PluginError::Initialization {
            instance: instance.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn collection(instance: &str, cause: impl std::fmt::Display) -> Self {
        PluginError::Collection {
            instance: instance.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            PluginError::Configuration { .. }
                | PluginError::PluginNotFound { .. }
                | PluginError::InstanceNotFound { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        self.is_user_actionable().then(|| self.to_string())
    }
}

/// Startup step at which an entry failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleStage {
    Resolve,
    Configure,
    Initialize,
}

/// Startup failure identifying the declared entry that caused it
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to {stage} {capability} '{instance_name}' (plugin '{plugin_name}'): {source}")]
pub struct LifecycleError {
    pub stage: LifecycleStage,
    pub capability: Capability,
    pub instance_name: String,
    pub plugin_name: String,
    #[source]
    pub source: PluginError,
}

impl ContextualError for LifecycleError {
    fn is_user_actionable(&self) -> bool {
        self.source.is_user_actionable()
    }

    fn user_message(&self) -> Option<String> {
        self.is_user_actionable().then(|| self.to_string())
    }
}
