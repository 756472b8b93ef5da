//! Simple Map Credential
//!
//! Holds its parameters as-is for other plugins to read, e.g. `auth.mode`
//! and `auth.file` for the Google Analytics collector. Nothing is validated
//! and nothing is loaded.

use crate::credential_plugin;
use crate::plugin::error::PluginResult;
use crate::plugin::traits::{ConfigureContext, Credential, Plugin};
use crate::plugin::types::{Params, PluginDescriptor};

pub const PLUGIN_NAME: &str = "simple.map";

credential_plugin!(|| PluginDescriptor::new(PLUGIN_NAME, || {
    Box::new(SimpleMapCredential::default()) as Box<dyn Credential>
}));

#[derive(Debug, Default)]
pub struct SimpleMapCredential {
    name: String,
    params: Params,
}

#[async_trait::async_trait]
impl Plugin for SimpleMapCredential {
    fn name(&self) -> &str {
        &self.name
    }

    fn plugin_name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn configure(
        &mut self,
        name: &str,
        params: Params,
        _context: &ConfigureContext<'_>,
    ) -> PluginResult<()> {
        self.name = name.to_string();
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

impl Credential for SimpleMapCredential {}
