use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::SubdomainSource;
use crate::error::{ReconError, Result};

#[derive(Debug, Deserialize)]
struct SubdomainsResponse {
    #[serde(default)]
    subdomains: Vec<String>,
}

pub struct SecurityTrailsClient {
    client: Client,
    base_url: String,
}

impl SecurityTrailsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SubdomainSource for SecurityTrailsClient {
    async fn subdomains(&self, domain: &str, api_key: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/v1/domain/{}/subdomains",
            self.base_url,
            urlencoding::encode(domain)
        );

        tracing::debug!("Querying SecurityTrails for domain: {}", domain);

        let response = self
            .client
            .get(&url)
            .header("APIKEY", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: SubdomainsResponse = serde_json::from_str(&body).map_err(|source| {
            ReconError::Decode { what: "SecurityTrails subdomains", source }
        })?;

        let hosts: Vec<String> = parsed
            .subdomains
            .into_iter()
            .map(|label| format!("{}.{}", label, domain))
            .collect();

        tracing::info!("SecurityTrails found {} subdomains", hosts.len());
        Ok(hosts)
    }
}
