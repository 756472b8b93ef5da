//! Lifecycle Orchestrator
//!
//! Turns the declared entries into live instances. Capabilities start in a
//! fixed order, credentials then data sources then collectors, so every
//! instance can reference instances of the capabilities before it while
//! configuring. Within a capability entries are processed in declaration
//! order, one at a time, and each one is appended only after it initialized.
//!
//! Startup is all-or-nothing from the caller's point of view: the first
//! failure aborts and is returned. Every plugin name is resolved before any
//! instance is created, so an unknown plugin leaves the directories empty.

use crate::plugin::directory::Instances;
use crate::plugin::error::{LifecycleError, LifecycleStage, PluginError};
use crate::plugin::events::LifecycleReporter;
use crate::plugin::registry::{PluginRegistry, Registries};
use crate::plugin::traits::{ConfigureContext, Plugin};
use crate::plugin::types::{Capability, ConfigEntry, Declarations};
use std::sync::Arc;
use strum::IntoEnumIterator;

pub struct LifecycleOrchestrator<'a> {
    registries: &'a Registries,
    instances: &'a mut Instances,
    reporter: &'a dyn LifecycleReporter,
}

impl<'a> LifecycleOrchestrator<'a> {
    pub fn new(
        registries: &'a Registries,
        instances: &'a mut Instances,
        reporter: &'a dyn LifecycleReporter,
    ) -> Self {
        Self {
            registries,
            instances,
            reporter,
        }
    }

    /// Start every declared instance
    pub async fn start(&mut self, declarations: &Declarations) -> Result<(), LifecycleError> {
        self.resolve_all(declarations)?;

        for capability in Capability::iter() {
            let entries = declarations.entries(capability);
            if entries.is_empty() {
                self.reporter.empty_capability(capability);
                continue;
            }
            match capability {
                Capability::Credential => self.load_credentials(entries).await?,
                Capability::DataSource => self.load_data_sources(entries).await?,
                Capability::Collector => self.load_collectors(entries).await?,
            }
        }

        log::debug!(
            "Startup complete: {} credential, {} datasource, {} collector instance(s)",
            self.instances.len(Capability::Credential),
            self.instances.len(Capability::DataSource),
            self.instances.len(Capability::Collector)
        );
        Ok(())
    }

    /// Check every declared plugin name against its registry
    pub fn resolve_all(&self, declarations: &Declarations) -> Result<(), LifecycleError> {
        for capability in Capability::iter() {
            for entry in declarations.entries(capability) {
                self.registries
                    .check(capability, &entry.plugin)
                    .map_err(|source| {
                        self.fail(LifecycleStage::Resolve, capability, entry, source)
                    })?;
            }
        }
        Ok(())
    }

    pub async fn load_credentials(&mut self, entries: &[ConfigEntry]) -> Result<(), LifecycleError> {
        for entry in entries {
            let instance = build(
                &self.registries.credentials,
                entry,
                self.instances.configure_context(),
                self.reporter,
            )
            .await?;
            self.instances.credentials.append(Arc::from(instance));
            self.reporter.initialized(Capability::Credential, &entry.name);
        }
        Ok(())
    }

    pub async fn load_data_sources(&mut self, entries: &[ConfigEntry]) -> Result<(), LifecycleError> {
        for entry in entries {
            let instance = build(
                &self.registries.data_sources,
                entry,
                self.instances.configure_context(),
                self.reporter,
            )
            .await?;
            self.instances.data_sources.append(Arc::from(instance));
            self.reporter.initialized(Capability::DataSource, &entry.name);
        }
        Ok(())
    }

    pub async fn load_collectors(&mut self, entries: &[ConfigEntry]) -> Result<(), LifecycleError> {
        for entry in entries {
            let instance = build(
                &self.registries.collectors,
                entry,
                self.instances.configure_context(),
                self.reporter,
            )
            .await?;
            self.instances.collectors.append(Arc::from(instance));
            self.reporter.initialized(Capability::Collector, &entry.name);
        }
        Ok(())
    }

    fn fail(
        &self,
        stage: LifecycleStage,
        capability: Capability,
        entry: &ConfigEntry,
        source: PluginError,
    ) -> LifecycleError {
        lifecycle_error(self.reporter, stage, capability, entry, source)
    }
}

fn lifecycle_error(
    reporter: &dyn LifecycleReporter,
    stage: LifecycleStage,
    capability: Capability,
    entry: &ConfigEntry,
    source: PluginError,
) -> LifecycleError {
    reporter.failed(capability, &entry.name, &source);
    LifecycleError {
        stage,
        capability,
        instance_name: entry.name.clone(),
        plugin_name: entry.plugin.clone(),
        source,
    }
}

/// Instantiate, configure and initialize one entry
async fn build<T: ?Sized + Plugin>(
    registry: &PluginRegistry<T>,
    entry: &ConfigEntry,
    context: ConfigureContext<'_>,
    reporter: &dyn LifecycleReporter,
) -> Result<Box<T>, LifecycleError> {
    let capability = registry.capability();
    let fail = |stage, source| lifecycle_error(reporter, stage, capability, entry, source);

    let mut instance = registry
        .instantiate(&entry.plugin)
        .map_err(|e| fail(LifecycleStage::Resolve, e))?;

    instance
        .configure(&entry.name, entry.params.clone(), &context)
        .map_err(|e| fail(LifecycleStage::Configure, e))?;
    reporter.configured(capability, &entry.name, &entry.plugin);

    instance
        .initialize()
        .await
        .map_err(|e| fail(LifecycleStage::Initialize, e))?;

    Ok(instance)
}
