//! Collector execution
//!
//! Runs exactly one named collector from a started [`Instances`] set.

use crate::plugin::directory::Instances;
use crate::plugin::error::PluginResult;
use crate::plugin::events::LifecycleReporter;

pub struct Executor<'a> {
    instances: &'a Instances,
    reporter: &'a dyn LifecycleReporter,
}

impl<'a> Executor<'a> {
    pub fn new(instances: &'a Instances, reporter: &'a dyn LifecycleReporter) -> Self {
        Self {
            instances,
            reporter,
        }
    }

    /// Look up the collector by instance name and run it once
    ///
    /// An unknown name is `PluginError::InstanceNotFound`; collector failures
    /// are returned unchanged.
    pub async fn execute(&self, collector_name: &str) -> PluginResult<()> {
        let collector = self.instances.collectors.find_by_name(collector_name)?;
        log::debug!("Running collector '{}'", collector_name);

        collector.collect().await?;
        self.reporter.collected(collector_name);
        Ok(())
    }
}
