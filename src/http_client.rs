use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::config::Config;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client for the discovery and intelligence APIs. No request timeout is set;
/// those calls rely on transport defaults.
pub fn create_api_client() -> reqwest::Result<Client> {
    ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .gzip(true)
        .brotli(true)
        .use_rustls_tls()
        .user_agent(concat!("recon_scout/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Client for exposure probes. The per-attempt deadline is enforced by the
/// prober itself, not here.
pub fn create_probe_client(config: &Config) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(4)
        .tcp_nodelay(true)
        .use_rustls_tls()
        .tls_sni(true)
        .https_only(false) // Allow both HTTP and HTTPS
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
}
