//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Capabilities and plugin contracts
pub use crate::plugin::traits::{Collector, ConfigureContext, Credential, DataSource, Plugin};

// Declarations and parameters
pub use crate::plugin::types::{Capability, ConfigEntry, Declarations, Params, PluginDescriptor};

// Errors
pub use crate::plugin::error::{LifecycleError, LifecycleStage, PluginError, PluginResult};

// Registries and live instances
pub use crate::plugin::directory::{InstanceDirectory, Instances};
pub use crate::plugin::registry::{PluginRegistry, Registries};

// Startup and execution
pub use crate::plugin::events::{LifecycleReporter, LogReporter};
pub use crate::plugin::executor::Executor;
pub use crate::plugin::orchestrator::LifecycleOrchestrator;
