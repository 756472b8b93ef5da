//! Lifecycle progress reporting
//!
//! The orchestrator and the executor report every step through a
//! [`LifecycleReporter`] instead of logging directly, so callers can observe
//! startup in tests or swap the output.

use crate::plugin::types::Capability;

/// Observer for instance lifecycle steps
pub trait LifecycleReporter: Send + Sync {
    /// Entry configured, about to initialize
    fn configured(&self, capability: Capability, instance_name: &str, plugin_name: &str);

    /// Entry initialized and appended to its directory
    fn initialized(&self, capability: Capability, instance_name: &str);

    /// Entry failed; startup is about to abort
    fn failed(&self, capability: Capability, instance_name: &str, error: &dyn std::error::Error);

    /// Collector finished successfully
    fn collected(&self, instance_name: &str);

    /// No entries declared for a capability
    fn empty_capability(&self, capability: Capability);
}

/// Reporter writing through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LifecycleReporter for LogReporter {
    fn configured(&self, capability: Capability, instance_name: &str, plugin_name: &str) {
        log::debug!(
            "Configured {} '{}' (plugin '{}')",
            capability,
            instance_name,
            plugin_name
        );
    }

    fn initialized(&self, capability: Capability, instance_name: &str) {
        log::info!("Loaded {} '{}'", capability, instance_name);
    }

    fn failed(&self, capability: Capability, instance_name: &str, error: &dyn std::error::Error) {
        // the caller reports the fatal error itself
        log::debug!("{} '{}' failed: {}", capability, instance_name, error);
    }

    fn collected(&self, instance_name: &str) {
        log::info!("Data was collected with success");
        log::debug!("Collector '{}' finished", instance_name);
    }

    fn empty_capability(&self, capability: Capability) {
        log::info!(
            "You didn't configure any {} plugin in your configuration file",
            capability
        );
    }
}
