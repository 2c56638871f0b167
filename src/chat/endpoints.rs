//! The tenant's endpoint configuration document: what the chatbot is
//! allowed to call. Fetched fresh on every turn, never cached.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Payload template; advisory unless the template-keys policy is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EndpointConfig {
    /// First endpoint whose action matches, in document order.
    pub fn find_action(&self, action: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.action == action)
    }

    /// Base URL if configured and non-empty.
    pub fn site_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|u| !u.is_empty())
    }

    /// The endpoint catalog as indented JSON, for prompt embedding.
    pub fn catalog_json(&self) -> String {
        serde_json::to_string_pretty(&self.endpoints).unwrap_or_else(|_| "[]".to_string())
    }
}

pub async fn fetch_endpoint_config(client: &Client, url: &str) -> Result<EndpointConfig> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch endpoint config from {}", url))?
        .error_for_status()
        .with_context(|| format!("endpoint config fetch returned an error status for {}", url))?;

    response
        .json::<EndpointConfig>()
        .await
        .with_context(|| format!("endpoint config at {} is not valid JSON", url))
}
