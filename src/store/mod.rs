pub mod journal;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{HostFinding, NewHostFinding, RiskCounts, RiskLevel, Scan, ScanId, ScanStatus};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable home for scans and their host findings. Every write is
/// independent; implementations serialize status changes per scan.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// New scan in `pending`.
    async fn create_scan(&self, domain: &str, owner: Option<String>) -> StoreResult<ScanId>;

    /// `error` is kept only when moving to `failed`.
    async fn update_scan_status(
        &self,
        id: ScanId,
        status: ScanStatus,
        error: Option<String>,
    ) -> StoreResult<()>;

    async fn insert_host_finding(&self, id: ScanId, finding: NewHostFinding) -> StoreResult<u64>;

    /// Single terminal write: status, aggregate risk and all four counts.
    async fn complete_scan(&self, id: ScanId, risk: RiskLevel, counts: RiskCounts) -> StoreResult<()>;

    async fn get_scan(&self, id: ScanId) -> StoreResult<Option<Scan>>;

    /// Findings for one scan, in insertion order.
    async fn host_findings(&self, id: ScanId) -> StoreResult<Vec<HostFinding>>;

    /// Newest first.
    async fn recent_scans(&self, limit: usize) -> StoreResult<Vec<Scan>>;
}

pub use journal::JournalStore;
pub use memory::MemoryStore;
