pub mod shodan;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Host data gathered from the intelligence API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub ip: String,
    pub ports: Vec<u16>,
    pub services: Vec<String>,
    pub isp: String,
}

impl Enrichment {
    pub fn has_open_ports(&self) -> bool {
        !self.ports.is_empty()
    }
}

/// Resolves and profiles a hostname. `None` means no data, which is
/// different from an empty but present result.
#[async_trait]
pub trait HostIntel: Send + Sync {
    async fn lookup(&self, hostname: &str, api_key: &str) -> Option<Enrichment>;
}

pub use shodan::ShodanClient;
