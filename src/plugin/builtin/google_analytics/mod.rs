//! Google Analytics Collector
//!
//! Reads one metric for one view from the Google Analytics reporting API.
//!
//! Parameters:
//! - `credential`: name of a credential instance carrying `auth.mode`
//!   (`jwt` or `oauth2`), `auth.file` and optionally `auth.cache_dir`
//! - `view.id`: the view (profile) id as a string or number, with or
//!   without the `ga:` prefix
//! - `metric`: `ga:<name>` for yesterday-to-today totals per operating
//!   system, or `rt:<name>` for the realtime value
//! - `api.url`: overrides the API base URL

pub mod auth;
pub mod service;

use crate::collector_plugin;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Collector, ConfigureContext, Credential, Plugin};
use crate::plugin::types::{Params, PluginDescriptor};
use auth::{AuthMode, ClientSecret, ServiceAccountKey, TokenCache};
use chrono::{Duration, Local};
use service::{AnalyticsService, DataResponse, DEFAULT_API_URL};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "google.analytics";

const METRIC_TYPE_CORE: &str = "ga";
const METRIC_TYPE_REALTIME: &str = "rt";
const OS_DIMENSION: &str = "ga:operatingSystem";
const DATE_FORMAT: &str = "%Y-%m-%d";

collector_plugin!(|| PluginDescriptor::new(PLUGIN_NAME, || {
    Box::new(GoogleAnalyticsCollector::default()) as Box<dyn Collector>
}));

#[derive(Default)]
pub struct GoogleAnalyticsCollector {
    name: String,
    params: Params,
    credential: Option<Arc<dyn Credential>>,
    service: Option<AnalyticsService>,
}

impl std::fmt::Debug for GoogleAnalyticsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAnalyticsCollector")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("credential", &self.credential.as_ref().map(|c| c.name().to_string()))
            .field("initialized", &self.service.is_some())
            .finish()
    }
}

impl GoogleAnalyticsCollector {
    /// Collector that skips authentication and talks to `service` directly
    pub fn with_service(name: &str, params: Params, service: AnalyticsService) -> Self {
        Self {
            name: name.to_string(),
            params,
            credential: None,
            service: Some(service),
        }
    }

    fn credential_param(&self, key: &str) -> PluginResult<String> {
        self.credential
            .as_ref()
            .and_then(|credential| credential.params().get_str(key))
            .map(str::to_string)
            .ok_or_else(|| {
                PluginError::initialization(&self.name, format!("You need set the param: {}", key))
            })
    }

    fn cache_dir(&self) -> PluginResult<PathBuf> {
        let configured = self
            .credential
            .as_ref()
            .and_then(|credential| credential.params().get_str("auth.cache_dir"))
            .map(PathBuf::from);

        configured.or_else(TokenCache::default_dir).ok_or_else(|| {
            PluginError::initialization(&self.name, "Unable to get path to cached credential file")
        })
    }

    fn service(&self) -> PluginResult<&AnalyticsService> {
        self.service
            .as_ref()
            .ok_or_else(|| PluginError::collection(&self.name, "collector was not initialized"))
    }

    /// Per-OS totals for a `ga:` metric over yesterday and today
    async fn core_totals(&self, view_id: &str, metric: &str) -> PluginResult<BTreeMap<String, i64>> {
        let today = Local::now();
        let start_date = (today - Duration::days(1)).format(DATE_FORMAT).to_string();
        let end_date = today.format(DATE_FORMAT).to_string();

        let response = self
            .service()?
            .core_report(&profile_ids(view_id), &start_date, &end_date, metric, OS_DIMENSION)
            .await
            .map_err(|e| PluginError::collection(&self.name, e))?;

        let mut totals = BTreeMap::new();
        for row in response.rows {
            match row.as_slice() {
                [source, total, ..] => {
                    totals.insert(source.clone(), self.parse_value(total)?);
                }
                _ => {
                    return Err(PluginError::collection(
                        &self.name,
                        format!("Unexpected row in report: {:?}", row),
                    ))
                }
            }
        }
        Ok(totals)
    }

    /// Current value of an `rt:` metric
    async fn realtime_value(&self, view_id: &str, metric: &str) -> PluginResult<i64> {
        let response: DataResponse = self
            .service()?
            .realtime(&profile_ids(view_id), metric)
            .await
            .map_err(|e| PluginError::collection(&self.name, e))?;

        let cell = response
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| PluginError::collection(&self.name, "Metric data not found"))?;
        self.parse_value(cell)
    }

    fn parse_value(&self, value: &str) -> PluginResult<i64> {
        value.parse().map_err(|_| {
            PluginError::collection(&self.name, format!("Metric value '{}' is not an integer", value))
        })
    }
}

/// `view.id` as text; a config may write it as a string or a bare number
fn view_id_param(params: &Params) -> Option<String> {
    match params.get("view.id")? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// `ga:` prefixed view id as expected by the `ids` query parameter
fn profile_ids(view_id: &str) -> String {
    if view_id.starts_with("ga:") {
        view_id.to_string()
    } else {
        format!("ga:{}", view_id)
    }
}

/// Metric type prefix, or `None` when the metric is malformed
fn metric_type(metric: &str) -> Option<&str> {
    if metric.len() < 3 {
        return None;
    }
    metric.split_once(':').map(|(kind, _)| kind)
}

#[async_trait::async_trait]
impl Plugin for GoogleAnalyticsCollector {
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
        context: &ConfigureContext<'_>,
    ) -> PluginResult<()> {
        self.name = name.to_string();

        let credential_name = params.get_str("credential").unwrap_or_default();
        let credential = context.credential(credential_name).map_err(|_| {
            PluginError::configuration(
                name,
                format!("Credential '{}' was not found", credential_name),
            )
        })?;

        if params.contains_key("api.url") && params.get_str("api.url").is_none() {
            return Err(PluginError::configuration(name, "Param api.url must be a string"));
        }

        log::debug!("Collector '{}' uses credential '{}'", name, credential.name());
        self.credential = Some(credential);
        self.params = params;
        Ok(())
    }

    async fn initialize(&mut self) -> PluginResult<()> {
        let mode_name = self.credential_param("auth.mode")?;
        let mode = AuthMode::parse(&mode_name).ok_or_else(|| {
            PluginError::initialization(&self.name, "You need set the param: auth.mode")
        })?;
        let auth_file = self.credential_param("auth.file")?;

        let contents = tokio::fs::read_to_string(&auth_file)
            .await
            .map_err(|e| PluginError::initialization(&self.name, format!("{}: {}", auth_file, e)))?;

        let http = reqwest::Client::new();
        let token = match mode {
            AuthMode::Jwt => {
                let key = ServiceAccountKey::from_json(&contents)
                    .map_err(|e| PluginError::initialization(&self.name, e))?;
                auth::service_account_token(&http, &key).await
            }
            AuthMode::OAuth2 => {
                let secret = ClientSecret::from_json(&contents)
                    .map_err(|e| PluginError::initialization(&self.name, e))?;
                let cache = TokenCache::for_instance(&self.cache_dir()?, &self.name);
                auth::installed_app_token(&http, &secret, &cache).await
            }
        }
        .map_err(|e| PluginError::initialization(&self.name, e))?;

        let api_url = self.params.get_str("api.url").unwrap_or(DEFAULT_API_URL);
        log::debug!("Collector '{}' authenticated against {}", self.name, api_url);
        self.service = Some(AnalyticsService::new(http, api_url, token.access_token));
        Ok(())
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

#[async_trait::async_trait]
impl Collector for GoogleAnalyticsCollector {
    async fn collect(&self) -> PluginResult<()> {
        let view_id = view_id_param(&self.params)
            .ok_or_else(|| PluginError::collection(&self.name, "Param view id is invalid"))?;
        let metric = self.params.get_str("metric").unwrap_or_default();
        let kind = metric_type(metric)
            .ok_or_else(|| PluginError::collection(&self.name, "Param metric name is invalid"))?;

        match kind {
            METRIC_TYPE_CORE => {
                let totals = self.core_totals(&view_id, metric).await?;
                log::debug!("Data: {:?}", totals);
            }
            METRIC_TYPE_REALTIME => {
                let value = self.realtime_value(&view_id, metric).await?;
                log::debug!("Data: {}", value);
            }
            _ => return Err(PluginError::collection(&self.name, "Metric type is invalid")),
        }
        Ok(())
    }
}
