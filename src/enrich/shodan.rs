use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::{Enrichment, HostIntel};

const UNKNOWN_ISP: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct ShodanHostInfo {
    #[serde(default)]
    ports: Vec<u16>,
    #[serde(default)]
    data: Vec<ShodanBanner>,
    isp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShodanBanner {
    product: Option<String>,
    port: u16,
}

impl ShodanBanner {
    fn label(&self) -> String {
        match self.product.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => self.port.to_string(),
        }
    }
}

pub struct ShodanClient {
    client: Client,
    base_url: String,
}

impl ShodanClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn resolve(&self, hostname: &str, api_key: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/dns/resolve", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("hostnames", hostname), ("key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(host = %hostname, status = %response.status(), "shodan dns resolve rejected");
            return Ok(None);
        }

        let answers: HashMap<String, Option<String>> = response.json().await?;
        Ok(answers
            .get(hostname)
            .cloned()
            .flatten()
            .filter(|ip| !ip.is_empty()))
    }

    async fn host_details(&self, ip: &str, api_key: &str) -> Result<Enrichment, reqwest::Error> {
        let url = format!("{}/shodan/host/{}", self.base_url, urlencoding::encode(ip));
        let response = self.client.get(&url).query(&[("key", api_key)]).send().await?;

        if !response.status().is_success() {
            tracing::debug!(ip = %ip, status = %response.status(), "shodan host lookup rejected");
            return Ok(Enrichment {
                ip: ip.to_string(),
                ports: Vec::new(),
                services: Vec::new(),
                isp: UNKNOWN_ISP.to_string(),
            });
        }

        let info: ShodanHostInfo = response.json().await?;
        Ok(Enrichment {
            ip: ip.to_string(),
            ports: info.ports,
            services: info.data.iter().map(ShodanBanner::label).collect(),
            isp: info
                .isp
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_ISP.to_string()),
        })
    }
}

#[async_trait]
impl HostIntel for ShodanClient {
    async fn lookup(&self, hostname: &str, api_key: &str) -> Option<Enrichment> {
        let ip = match self.resolve(hostname, api_key).await {
            Ok(Some(ip)) => ip,
            Ok(None) => {
                tracing::debug!(host = %hostname, "no address from shodan dns");
                return None;
            }
            Err(e) => {
                tracing::warn!(host = %hostname, error = %e.without_url(), "shodan dns lookup failed");
                return None;
            }
        };

        match self.host_details(&ip, api_key).await {
            Ok(enrichment) => Some(enrichment),
            Err(e) => {
                tracing::warn!(host = %hostname, ip = %ip, error = %e.without_url(), "shodan host lookup failed");
                None
            }
        }
    }
}
