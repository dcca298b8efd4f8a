use crate::enrich::Enrichment;
use crate::model::{Exposure, RiskCounts, RiskLevel};

/// Derives the persisted host and scan risk levels. These values are
/// stored, never recomputed on read, so the rules must stay stable.
pub struct RiskClassifier;

impl RiskClassifier {
    /// High if any path is exposed, Medium if the host has open ports,
    /// Low otherwise (including hosts without enrichment).
    pub fn classify_host(exposures: &[Exposure], enrichment: Option<&Enrichment>) -> RiskLevel {
        if !exposures.is_empty() {
            RiskLevel::High
        } else if enrichment.is_some_and(Enrichment::has_open_ports) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Worst level present among the counted hosts.
    pub fn aggregate(counts: &RiskCounts) -> RiskLevel {
        if counts.high > 0 {
            RiskLevel::High
        } else if counts.medium > 0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
