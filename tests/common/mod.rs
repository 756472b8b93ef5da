//! Shared helpers for integration tests

#![allow(dead_code)]

use pickman::plugin::api::{
    Collector, ConfigureContext, Plugin, PluginDescriptor, PluginError, PluginResult, Params,
};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Collector counting `collect` calls through a shared counter
pub struct CountingCollector {
    plugin_name: &'static str,
    name: String,
    params: Params,
    calls: Arc<AtomicUsize>,
}

impl CountingCollector {
    pub fn descriptor(
        plugin_name: &'static str,
        calls: Arc<AtomicUsize>,
    ) -> PluginDescriptor<dyn Collector> {
        PluginDescriptor::new(plugin_name, move || {
            Box::new(CountingCollector {
                plugin_name,
                name: String::new(),
                params: Params::new(),
                calls: calls.clone(),
            }) as Box<dyn Collector>
        })
    }
}

#[async_trait::async_trait]
impl Plugin for CountingCollector {
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
        let credential = params.get_str("credential").unwrap_or_default();
        context.credential(credential).map_err(|_| {
            PluginError::configuration(name, format!("Credential '{}' was not found", credential))
        })?;
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

#[async_trait::async_trait]
impl Collector for CountingCollector {
    async fn collect(&self) -> PluginResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Write a configuration file into `dir`
pub fn write_config(dir: &Path, file_name: &str, contents: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, contents).expect("write config file");
    path
}

/// Run the binary with colour disabled
pub fn run_pickman(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pickman"))
        .arg("--no-color")
        .args(args)
        .output()
        .expect("run pickman binary")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
