//! Plugin Test Utilities
//!
//! Mock plugins for each capability and a reporter that records what the
//! lifecycle did.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::events::LifecycleReporter;
use crate::plugin::traits::{Collector, ConfigureContext, Credential, DataSource, Plugin};
use crate::plugin::types::{Capability, Params, PluginDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Where a mock plugin should fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailAt {
    #[default]
    Never,
    Configure,
    Initialize,
    Collect,
}

/// Resolve a `credential` parameter the way real plugins do
fn check_credential_reference(
    name: &str,
    params: &Params,
    context: &ConfigureContext<'_>,
) -> PluginResult<()> {
    if let Some(credential) = params.get_str("credential") {
        context.credential(credential).map_err(|_| {
            PluginError::configuration(name, format!("Credential '{}' was not found", credential))
        })?;
    }
    Ok(())
}

/// Collector counting how often `collect` runs
#[derive(Debug)]
pub struct MockCollector {
    plugin_name: &'static str,
    name: String,
    params: Params,
    fail_at: FailAt,
    collect_calls: Arc<AtomicUsize>,
}

impl Default for MockCollector {
    fn default() -> Self {
        Self::with_plugin_name("mock.collector")
    }
}

impl MockCollector {
    pub fn with_plugin_name(plugin_name: &'static str) -> Self {
        Self {
            plugin_name,
            name: String::new(),
            params: Params::new(),
            fail_at: FailAt::Never,
            collect_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    /// Set the instance name without going through `configure`
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Share a call counter that outlives the instance
    pub fn counting(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.collect_calls = counter;
        self
    }

    /// Descriptor building counting mocks that all share `counter`
    pub fn descriptor(
        plugin_name: &'static str,
        counter: Arc<AtomicUsize>,
        fail_at: FailAt,
    ) -> PluginDescriptor<dyn Collector> {
        PluginDescriptor::new(plugin_name, move || {
            Box::new(
                MockCollector::with_plugin_name(plugin_name)
                    .counting(counter.clone())
                    .failing_at(fail_at),
            ) as Box<dyn Collector>
        })
    }
}

#[async_trait::async_trait]
impl Plugin for MockCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn plugin_name(&self) -> &'static str {
        self.plugin_name
    }

    fn configure(
        &mut self,
        name: &str,
        params: Params,
        context: &ConfigureContext<'_>,
    ) -> PluginResult<()> {
        self.name = name.to_string();
        if self.fail_at == FailAt::Configure {
            return Err(PluginError::configuration(name, "Param metric name is invalid"));
        }
        check_credential_reference(name, &params, context)?;
        self.params = params;
        Ok(())
    }

    async fn initialize(&mut self) -> PluginResult<()> {
        if self.fail_at == FailAt::Initialize {
            return Err(PluginError::initialization(&self.name, "connection refused"));
        }
        Ok(())
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

#[async_trait::async_trait]
impl Collector for MockCollector {
    async fn collect(&self) -> PluginResult<()> {
        self.collect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Collect {
            return Err(PluginError::collection(&self.name, "Metric data not found"));
        }
        Ok(())
    }
}

/// Credential holding whatever parameters it was given
#[derive(Debug)]
pub struct MockCredential {
    name: String,
    params: Params,
    fail_at: FailAt,
}

impl Default for MockCredential {
    fn default() -> Self {
        Self::named("")
    }
}

impl MockCredential {
    /// Credential that already carries a name, for direct use in directories
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Params::new(),
            fail_at: FailAt::Never,
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn descriptor(fail_at: FailAt) -> PluginDescriptor<dyn Credential> {
        PluginDescriptor::new("mock.credential", move || {
            Box::new(MockCredential::default().failing_at(fail_at)) as Box<dyn Credential>
        })
    }
}

#[async_trait::async_trait]
impl Plugin for MockCredential {
    fn name(&self) -> &str {
        &self.name
    }

    fn plugin_name(&self) -> &'static str {
        "mock.credential"
    }

    fn configure(
        &mut self,
        name: &str,
        params: Params,
        _context: &ConfigureContext<'_>,
    ) -> PluginResult<()> {
        self.name = name.to_string();
        if self.fail_at == FailAt::Configure {
            return Err(PluginError::configuration(name, "You need set the param: auth.file"));
        }
        self.params = params;
        Ok(())
    }

    async fn initialize(&mut self) -> PluginResult<()> {
        if self.fail_at == FailAt::Initialize {
            return Err(PluginError::initialization(&self.name, "key file unreadable"));
        }
        Ok(())
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

impl Credential for MockCredential {}

/// Data source that may reference a credential
#[derive(Debug, Default)]
pub struct MockDataSource {
    name: String,
    params: Params,
}

impl MockDataSource {
    pub fn descriptor() -> PluginDescriptor<dyn DataSource> {
        PluginDescriptor::new("mock.datasource", || {
            Box::new(MockDataSource::default()) as Box<dyn DataSource>
        })
    }
}

#[async_trait::async_trait]
impl Plugin for MockDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn plugin_name(&self) -> &'static str {
        "mock.datasource"
    }

    fn configure(
        &mut self,
        name: &str,
        params: Params,
        context: &ConfigureContext<'_>,
    ) -> PluginResult<()> {
        self.name = name.to_string();
        check_credential_reference(name, &params, context)?;
        self.params = params;
        Ok(())
    }

    async fn initialize(&mut self) -> PluginResult<()> {
        Ok(())
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

impl DataSource for MockDataSource {}

/// Reporter keeping every lifecycle step as a readable line
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn configured(&self, capability: Capability, instance_name: &str, plugin_name: &str) {
        self.record(format!("configured {} {} {}", capability, instance_name, plugin_name));
    }

    fn initialized(&self, capability: Capability, instance_name: &str) {
        self.record(format!("initialized {} {}", capability, instance_name));
    }

    fn failed(&self, capability: Capability, instance_name: &str, _error: &dyn std::error::Error) {
        self.record(format!("failed {} {}", capability, instance_name));
    }

    fn collected(&self, instance_name: &str) {
        self.record(format!("collected {}", instance_name));
    }

    fn empty_capability(&self, capability: Capability) {
        self.record(format!("empty {}", capability));
    }
}
