//! Plugin System Module
//!
//! Capability registries, instance directories, the lifecycle orchestrator
//! that starts declared instances, and the executor that runs a collector.
//! Builtin plugins register themselves at link time.

// Internal modules - all access should go through api module
pub(crate) mod directory;
pub(crate) mod error;
pub(crate) mod events;
pub(crate) mod executor;
pub(crate) mod orchestrator;
pub(crate) mod registry;
pub(crate) mod traits;
pub(crate) mod types;

// Builtin plugins and the registration macros they use
pub mod builtin;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
pub(crate) mod tests;
