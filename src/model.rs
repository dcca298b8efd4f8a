use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal risk classification shared by hosts, exposures and scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }

    /// Whether a plain status update may move a scan from `self` to `next`.
    /// `Completed` is only reachable through `complete_scan`.
    pub fn can_move_to(self, next: ScanStatus) -> bool {
        matches!(
            (self, next),
            (ScanStatus::Pending, ScanStatus::Processing)
                | (ScanStatus::Pending, ScanStatus::Failed)
                | (ScanStatus::Processing, ScanStatus::Failed)
        )
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Processing => "processing",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(pub u64);

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for ScanId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ScanId)
    }
}

/// Per-level host tallies written when a scan completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub domain: String,
    pub status: ScanStatus,
    pub risk: Option<RiskLevel>,
    pub subdomain_count: Option<usize>,
    pub high_risk_count: Option<usize>,
    pub medium_risk_count: Option<usize>,
    pub low_risk_count: Option<usize>,
    pub error: Option<String>,
    pub owner: Option<String>,
}

impl Scan {
    pub fn new(id: ScanId, domain: impl Into<String>, owner: Option<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
            status: ScanStatus::Pending,
            risk: None,
            subdomain_count: None,
            high_risk_count: None,
            medium_risk_count: None,
            low_risk_count: None,
            error: None,
            owner,
        }
    }
}

/// A sensitive path that answered HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub path: String,
    pub risk: RiskLevel,
    pub status: u16,
}

/// Persisted result for one processed hostname. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFinding {
    pub id: u64,
    pub scan_id: ScanId,
    pub hostname: String,
    pub ip: Option<String>,
    pub isp: Option<String>,
    pub ports: Vec<u16>,
    pub services: Vec<String>,
    pub exposures: Vec<Exposure>,
    pub risk: RiskLevel,
}

/// Insert payload for a host finding; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHostFinding {
    pub hostname: String,
    pub ip: Option<String>,
    pub isp: Option<String>,
    pub ports: Vec<u16>,
    pub services: Vec<String>,
    pub exposures: Vec<Exposure>,
    pub risk: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(ScanStatus::Pending.can_move_to(ScanStatus::Processing));
        assert!(ScanStatus::Pending.can_move_to(ScanStatus::Failed));
        assert!(ScanStatus::Processing.can_move_to(ScanStatus::Failed));
        assert!(!ScanStatus::Processing.can_move_to(ScanStatus::Pending));
        assert!(!ScanStatus::Failed.can_move_to(ScanStatus::Processing));
        assert!(!ScanStatus::Completed.can_move_to(ScanStatus::Failed));
        assert!(!ScanStatus::Processing.can_move_to(ScanStatus::Completed));
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = serde_json::to_string(&ScanStatus::Processing).unwrap();
        assert_eq!(s, "\"processing\"");
        let r = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(r, "\"High\"");
    }

    #[test]
    fn risk_counts_total() {
        let mut c = RiskCounts::default();
        c.record(RiskLevel::High);
        c.record(RiskLevel::Low);
        c.record(RiskLevel::Low);
        assert_eq!(c.total(), 3);
        assert_eq!(c.low, 2);
    }
}
