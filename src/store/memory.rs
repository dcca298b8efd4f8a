use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ScanStore, StoreResult};
use crate::error::StoreError;
use crate::model::{HostFinding, NewHostFinding, RiskCounts, RiskLevel, Scan, ScanId, ScanStatus};

/// In-process store. Status changes for one scan happen under that scan's
/// map entry lock.
pub struct MemoryStore {
    scans: DashMap<ScanId, Scan>,
    findings: RwLock<Vec<HostFinding>>,
    next_scan: AtomicU64,
    next_finding: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            scans: DashMap::new(),
            findings: RwLock::new(Vec::new()),
            next_scan: AtomicU64::new(1),
            next_finding: AtomicU64::new(1),
        }
    }

    pub(crate) fn create(&self, domain: &str, owner: Option<String>) -> Scan {
        let scan = Scan::new(self.next_scan_id(), domain, owner);
        self.scans.insert(scan.id, scan.clone());
        scan
    }

    pub(crate) fn next_scan_id(&self) -> ScanId {
        ScanId(self.next_scan.fetch_add(1, Ordering::SeqCst))
    }

    /// Check a status change against the current record without applying it.
    /// `Completed` is only reachable from `Processing`.
    pub(crate) fn check_transition(&self, id: ScanId, to: ScanStatus) -> StoreResult<()> {
        let scan = self.scans.get(&id).ok_or(StoreError::NotFound(id))?;
        let allowed = match to {
            ScanStatus::Completed => scan.status == ScanStatus::Processing,
            _ => scan.status.can_move_to(to),
        };
        if !allowed {
            return Err(StoreError::InvalidTransition { id, from: scan.status, to });
        }
        Ok(())
    }

    /// Number a finding for a `processing` scan without storing it.
    pub(crate) fn prepare_finding(&self, id: ScanId, finding: NewHostFinding) -> StoreResult<HostFinding> {
        let scan = self.scans.get(&id).ok_or(StoreError::NotFound(id))?;
        if scan.status != ScanStatus::Processing {
            return Err(StoreError::NotProcessing(id));
        }
        Ok(self.number_finding(id, finding))
    }

    fn number_finding(&self, id: ScanId, finding: NewHostFinding) -> HostFinding {
        HostFinding {
            id: self.next_finding.fetch_add(1, Ordering::SeqCst),
            scan_id: id,
            hostname: finding.hostname,
            ip: finding.ip,
            isp: finding.isp,
            ports: finding.ports,
            services: finding.services,
            exposures: finding.exposures,
            risk: finding.risk,
        }
    }

    pub(crate) fn set_status(
        &self,
        id: ScanId,
        status: ScanStatus,
        error: Option<String>,
    ) -> StoreResult<()> {
        let mut scan = self.scans.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !scan.status.can_move_to(status) {
            return Err(StoreError::InvalidTransition { id, from: scan.status, to: status });
        }
        scan.status = status;
        scan.error = if status == ScanStatus::Failed { error } else { None };
        Ok(())
    }

    pub(crate) fn add_finding(&self, id: ScanId, finding: NewHostFinding) -> StoreResult<HostFinding> {
        // Hold the scan entry so a concurrent terminal write cannot interleave.
        let scan = self.scans.get(&id).ok_or(StoreError::NotFound(id))?;
        if scan.status != ScanStatus::Processing {
            return Err(StoreError::NotProcessing(id));
        }
        let stored = self.number_finding(id, finding);
        self.findings.write().push(stored.clone());
        Ok(stored)
    }

    pub(crate) fn complete(&self, id: ScanId, risk: RiskLevel, counts: RiskCounts) -> StoreResult<()> {
        let mut scan = self.scans.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if scan.status != ScanStatus::Processing {
            return Err(StoreError::InvalidTransition {
                id,
                from: scan.status,
                to: ScanStatus::Completed,
            });
        }
        scan.status = ScanStatus::Completed;
        scan.risk = Some(risk);
        scan.subdomain_count = Some(counts.total());
        scan.high_risk_count = Some(counts.high);
        scan.medium_risk_count = Some(counts.medium);
        scan.low_risk_count = Some(counts.low);
        scan.error = None;
        Ok(())
    }

    /// Re-insert a scan read back from a journal, keeping its id.
    pub(crate) fn restore_scan(&self, scan: Scan) {
        self.next_scan.fetch_max(scan.id.0 + 1, Ordering::SeqCst);
        self.scans.insert(scan.id, scan);
    }

    pub(crate) fn restore_finding(&self, finding: HostFinding) {
        self.next_finding.fetch_max(finding.id + 1, Ordering::SeqCst);
        self.findings.write().push(finding);
    }

    pub(crate) fn scan(&self, id: ScanId) -> Option<Scan> {
        self.scans.get(&id).map(|s| s.value().clone())
    }

    pub(crate) fn findings_for(&self, id: ScanId) -> Vec<HostFinding> {
        self.findings
            .read()
            .iter()
            .filter(|f| f.scan_id == id)
            .cloned()
            .collect()
    }

    pub(crate) fn recent(&self, limit: usize) -> Vec<Scan> {
        let mut scans: Vec<Scan> = self.scans.iter().map(|s| s.value().clone()).collect();
        scans.sort_by(|a, b| b.id.cmp(&a.id));
        scans.truncate(limit);
        scans
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn create_scan(&self, domain: &str, owner: Option<String>) -> StoreResult<ScanId> {
        Ok(self.create(domain, owner).id)
    }

    async fn update_scan_status(
        &self,
        id: ScanId,
        status: ScanStatus,
        error: Option<String>,
    ) -> StoreResult<()> {
        self.set_status(id, status, error)
    }

    async fn insert_host_finding(&self, id: ScanId, finding: NewHostFinding) -> StoreResult<u64> {
        self.add_finding(id, finding).map(|f| f.id)
    }

    async fn complete_scan(&self, id: ScanId, risk: RiskLevel, counts: RiskCounts) -> StoreResult<()> {
        self.complete(id, risk, counts)
    }

    async fn get_scan(&self, id: ScanId) -> StoreResult<Option<Scan>> {
        Ok(self.scan(id))
    }

    async fn host_findings(&self, id: ScanId) -> StoreResult<Vec<HostFinding>> {
        Ok(self.findings_for(id))
    }

    async fn recent_scans(&self, limit: usize) -> StoreResult<Vec<Scan>> {
        Ok(self.recent(limit))
    }
}
