use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::ExposureCheck;
use crate::config::{Config, ProbePath};
use crate::model::Exposure;

pub struct ExposureProber {
    client: Client,
    paths: Vec<ProbePath>,
    schemes: Vec<String>,
    timeout: Duration,
}

impl ExposureProber {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            paths: config.probe_paths.clone(),
            schemes: config.probe_schemes.clone(),
            timeout: Duration::from_secs(config.probe_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One HEAD attempt. Only a 200 inside the deadline counts as a hit.
    async fn attempt(&self, url: &str) -> bool {
        match tokio::time::timeout(self.timeout, self.client.head(url).send()).await {
            Ok(Ok(resp)) => {
                let status = resp.status();
                tracing::debug!(url = %url, status = status.as_u16(), "probe answered");
                status == StatusCode::OK
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %url, error = %e, "probe miss");
                false
            }
            Err(_) => {
                tracing::debug!(url = %url, "probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl ExposureCheck for ExposureProber {
    async fn check(&self, hostname: &str) -> Vec<Exposure> {
        let mut exposures = Vec::new();

        for probe in &self.paths {
            for scheme in &self.schemes {
                let url = format!("{}://{}{}", scheme, hostname, probe.path);
                if self.attempt(&url).await {
                    exposures.push(Exposure {
                        path: probe.path.clone(),
                        risk: probe.risk,
                        status: StatusCode::OK.as_u16(),
                    });
                    break;
                }
            }
        }

        if !exposures.is_empty() {
            tracing::info!(host = %hostname, count = exposures.len(), "sensitive paths exposed");
        }
        exposures
    }
}
