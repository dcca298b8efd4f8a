pub mod exposure;

use async_trait::async_trait;

use crate::model::Exposure;

/// Checks a host for reachable sensitive paths.
#[async_trait]
pub trait ExposureCheck: Send + Sync {
    /// Hits in probe-table order. Misses of any kind are absent from the result.
    async fn check(&self, hostname: &str) -> Vec<Exposure>;
}

pub use exposure::ExposureProber;
