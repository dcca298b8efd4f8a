use std::sync::Arc;
use std::time::Duration;

use crate::analyze::risk_classifier::RiskClassifier;
use crate::config::{requirement_for, Config, Credentials, Requirement, Step};
use crate::discover::{SecurityTrailsClient, SubdomainSource};
use crate::enrich::{HostIntel, ShodanClient};
use crate::error::{ReconError, Result, StoreError};
use crate::http_client::{create_api_client, create_probe_client};
use crate::model::{NewHostFinding, RiskCounts, Scan, ScanId, ScanStatus};
use crate::probe::{ExposureCheck, ExposureProber};
use crate::store::ScanStore;
use crate::utils::{is_valid_domain, normalize_target};

pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Hostnames processed for one scan: the first `cap` discovered entries,
/// with the root domain put first when discovery did not return it. The
/// list never grows past `cap`; prepending the root drops the last entry.
pub fn capped_hosts(discovered: Vec<String>, root: &str, cap: usize) -> Vec<String> {
    let cap = cap.max(1);
    let mut hosts: Vec<String> = discovered.into_iter().take(cap).collect();
    if !hosts.iter().any(|h| h == root) {
        hosts.truncate(cap - 1);
        hosts.insert(0, root.to_string());
    }
    hosts
}

/// Drives scans from `pending` to `completed` or `failed`. Hosts are
/// handled one at a time; the only state kept between hosts is the risk tally.
pub struct ReconPipeline {
    config: Arc<Config>,
    store: Arc<dyn ScanStore>,
    discovery: Arc<dyn SubdomainSource>,
    intel: Arc<dyn HostIntel>,
    prober: Arc<dyn ExposureCheck>,
}

impl ReconPipeline {
    /// Pipeline backed by the SecurityTrails, Shodan and HTTP probe clients.
    pub fn new(config: Config, store: Arc<dyn ScanStore>) -> Result<Self> {
        let api = create_api_client()?;
        let probe = create_probe_client(&config)?;
        let discovery = SecurityTrailsClient::new(api.clone(), config.securitytrails_base_url.clone());
        let intel = ShodanClient::new(api, config.shodan_base_url.clone());
        let prober = ExposureProber::new(probe, &config);
        Ok(Self::with_components(
            config,
            store,
            Arc::new(discovery),
            Arc::new(intel),
            Arc::new(prober),
        ))
    }

    pub fn with_components(
        config: Config,
        store: Arc<dyn ScanStore>,
        discovery: Arc<dyn SubdomainSource>,
        intel: Arc<dyn HostIntel>,
        prober: Arc<dyn ExposureCheck>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            discovery,
            intel,
            prober,
        }
    }

    pub fn store(&self) -> &Arc<dyn ScanStore> {
        &self.store
    }

    /// Create a `pending` scan and run it in the background. Returns as soon
    /// as the scan record exists; progress is observed through the store.
    pub async fn request_scan(
        self: &Arc<Self>,
        target: &str,
        credentials: Credentials,
        owner: Option<String>,
    ) -> Result<ScanId> {
        let domain = normalize_target(target);
        if !is_valid_domain(&domain) {
            return Err(ReconError::Configuration(format!("Invalid domain: {}", target.trim())));
        }

        let id = self.store.create_scan(&domain, owner).await?;
        tracing::info!(scan = %id, domain = %domain, "scan requested");

        let pipeline = Arc::clone(self);
        let worker = tokio::spawn(async move {
            pipeline.run(id, &domain, &credentials).await;
        });

        // A worker that dies without reaching a terminal state would leave
        // `wait_for` polling forever.
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                tracing::error!(scan = %id, error = %e, "scan task aborted");
                pipeline.mark_failed(id, UNKNOWN_ERROR.to_string()).await;
            }
        });
        Ok(id)
    }

    /// Run one scan to a terminal state. Every failure ends up on the scan
    /// record; nothing is returned to the caller.
    pub async fn run(&self, id: ScanId, domain: &str, credentials: &Credentials) {
        let credentials = credentials.resolve(&self.config);

        // Discovery cannot run without its key; other steps follow the policy table.
        let Some(discovery_key) = credentials.for_step(Step::Discovery) else {
            return self.reject_missing_key(id, Step::Discovery).await;
        };
        let intel_key = credentials.for_step(Step::Enrichment);
        if intel_key.is_none() && requirement_for(Step::Enrichment) == Requirement::Required {
            return self.reject_missing_key(id, Step::Enrichment).await;
        }

        match self.execute(id, domain, discovery_key, intel_key).await {
            Ok(counts) => {
                tracing::info!(
                    scan = %id,
                    hosts = counts.total(),
                    high = counts.high,
                    medium = counts.medium,
                    low = counts.low,
                    "scan completed"
                );
            }
            Err(e) => {
                tracing::error!(scan = %id, error = %e, "scan failed");
                let message = e.to_string();
                let message = if message.trim().is_empty() { UNKNOWN_ERROR.to_string() } else { message };
                self.mark_failed(id, message).await;
            }
        }
    }

    async fn execute(
        &self,
        id: ScanId,
        domain: &str,
        discovery_key: &str,
        intel_key: Option<&str>,
    ) -> Result<RiskCounts> {
        self.store.update_scan_status(id, ScanStatus::Processing, None).await?;

        if intel_key.is_none() {
            tracing::info!(scan = %id, "no Shodan key, skipping enrichment");
        }

        let discovered = self.discovery.subdomains(domain, discovery_key).await?;
        let hosts = capped_hosts(discovered, domain, self.config.host_cap);
        tracing::info!(scan = %id, hosts = hosts.len(), "processing hosts");

        let mut counts = RiskCounts::default();
        for host in &hosts {
            let enrichment = match intel_key {
                Some(key) => self.intel.lookup(host, key).await,
                None => None,
            };
            let exposures = self.prober.check(host).await;
            let risk = RiskClassifier::classify_host(&exposures, enrichment.as_ref());
            counts.record(risk);

            tracing::debug!(scan = %id, host = %host, risk = %risk, "host classified");

            let finding = match enrichment {
                Some(e) => NewHostFinding {
                    hostname: host.clone(),
                    ip: Some(e.ip),
                    isp: Some(e.isp),
                    ports: e.ports,
                    services: e.services,
                    exposures,
                    risk,
                },
                None => NewHostFinding {
                    hostname: host.clone(),
                    ip: None,
                    isp: None,
                    ports: Vec::new(),
                    services: Vec::new(),
                    exposures,
                    risk,
                },
            };
            self.store.insert_host_finding(id, finding).await?;
        }

        let overall = RiskClassifier::aggregate(&counts);
        self.store.complete_scan(id, overall, counts).await?;
        Ok(counts)
    }

    async fn reject_missing_key(&self, id: ScanId, step: Step) {
        tracing::error!(scan = %id, provider = step.provider(), "required API key missing");
        self.mark_failed(id, step.missing_key_message()).await;
    }

    async fn mark_failed(&self, id: ScanId, message: String) {
        if let Err(e) = self
            .store
            .update_scan_status(id, ScanStatus::Failed, Some(message))
            .await
        {
            tracing::error!(scan = %id, error = %e, "could not record scan failure");
        }
    }

    /// Poll the store until the scan reaches a terminal state.
    pub async fn wait_for(&self, id: ScanId, poll: Duration) -> Result<Scan> {
        loop {
            let scan = self
                .store
                .get_scan(id)
                .await?
                .ok_or(StoreError::NotFound(id))?;
            if scan.status.is_terminal() {
                return Ok(scan);
            }
            tokio::time::sleep(poll).await;
        }
    }
}
