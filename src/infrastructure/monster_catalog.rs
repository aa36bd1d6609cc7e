//! HTTP client for the remote monster catalog

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::outbound::{CatalogError, MonsterCatalogPort, MonsterStatBlock};
use crate::infrastructure::config::MonsterCatalogConfig;

/// Client for a JSON monster list endpoint
///
/// With no URL configured every fetch fails with `NotConfigured`, which the
/// catalog service reports inline like any other failure.
pub struct MonsterCatalogClient {
    client: Client,
    url: Option<String>,
}

impl MonsterCatalogClient {
    pub fn new(config: &MonsterCatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: config
                .url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        })
    }
}

#[async_trait]
impl MonsterCatalogPort for MonsterCatalogClient {
    async fn fetch_monsters(&self) -> Result<Vec<MonsterStatBlock>, CatalogError> {
        let url = self.url.as_deref().ok_or(CatalogError::NotConfigured)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(format!("{}: {}", status, error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        parse_catalog(&body)
    }
}

/// A bare array of stat blocks, or one wrapped as `{"results": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    List(Vec<Value>),
    Wrapped { results: Vec<Value> },
}

/// Parse a catalog body; entries that are not stat blocks are skipped
pub fn parse_catalog(body: &str) -> Result<Vec<MonsterStatBlock>, CatalogError> {
    let payload: CatalogPayload =
        serde_json::from_str(body).map_err(|e| CatalogError::Payload(e.to_string()))?;
    let entries = match payload {
        CatalogPayload::List(entries) => entries,
        CatalogPayload::Wrapped { results } => results,
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<MonsterStatBlock>(entry) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::debug!("Skipping malformed catalog entry: {}", e);
                None
            }
        })
        .collect())
}
