//! Build-master HTTP client
//!
//! Two read-only fetches: the builder listing (`/json/builders`) and the
//! hosted `codereview.settings` text. Both are plain GETs bounded by the
//! configured timeout; neither is retried here.

use crate::config::BuildMasterConfig;
use crate::error::BuildMasterError;
use crate::settings::CodeReviewSettings;
use crate::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Client for the build master and its settings resource
#[derive(Debug, Clone)]
pub struct BuildMasterClient {
    config: BuildMasterConfig,
    http_client: reqwest::Client,
}

impl BuildMasterClient {
    /// Create a new client
    pub fn new(config: BuildMasterConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| BuildMasterError::ClientBuild(e.to_string()))?;

        Ok(BuildMasterClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &BuildMasterConfig {
        &self.config
    }

    /// Fetch every builder name the build master knows about
    ///
    /// Names are returned unfiltered and in listing order; suffix handling is
    /// the caller's concern.
    pub async fn fetch_builder_names(&self) -> Result<Vec<String>> {
        let url = self.config.builders_url();
        info!("Fetching builder listing from {}", url);

        let body = self.get_text(&url).await?;
        let names = parse_builder_listing(&body)?;
        debug!(count = names.len(), "builder listing parsed");
        Ok(names)
    }

    /// Fetch and parse the hosted `codereview.settings`
    pub async fn fetch_settings(&self) -> Result<CodeReviewSettings> {
        let url = self.config.settings_url.clone();
        info!("Fetching code review settings from {}", url);

        let body = self.get_text(&url).await?;
        let settings = CodeReviewSettings::parse(&body);
        if settings.is_empty() {
            warn!(url = %url, "code review settings contain no entries");
        } else {
            debug!(entries = settings.len(), "code review settings parsed");
        }
        Ok(settings)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let secs = self.config.timeout_secs;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| BuildMasterError::from_reqwest(url, secs, e))?
            .error_for_status()
            .map_err(|e| BuildMasterError::from_reqwest(url, secs, e))?;

        response
            .text()
            .await
            .map_err(|e| BuildMasterError::from_reqwest(url, secs, e))
    }
}

/// Parse a builder listing body
///
/// The build master serves either a JSON array of names or a JSON object
/// keyed by builder name; both are accepted. Anything else, including an
/// array holding non-string entries, is malformed.
pub fn parse_builder_listing(body: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BuildMasterError::MalformedListing(e.to_string()))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                other => Err(BuildMasterError::MalformedListing(format!(
                    "expected builder name string, got {other}"
                ))),
            })
            .collect(),
        Value::Object(map) => Ok(map.into_iter().map(|(name, _)| name).collect()),
        other => Err(BuildMasterError::MalformedListing(format!(
            "expected array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
