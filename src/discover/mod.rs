pub mod securitytrails;

use async_trait::async_trait;

use crate::error::Result;

/// Lists candidate hostnames under a root domain.
#[async_trait]
pub trait SubdomainSource: Send + Sync {
    /// Fully-qualified hostnames, in the order the source returned them.
    async fn subdomains(&self, domain: &str, api_key: &str) -> Result<Vec<String>>;
}

pub use securitytrails::SecurityTrailsClient;
