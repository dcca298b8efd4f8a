use crate::model::{ScanId, ScanStatus};

/// Errors that can end a scan. Enrichment and probe misses are recovered
/// where they happen and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("{0}")]
    Configuration(String),

    #[error("SecurityTrails API Error: {status_text}")]
    Upstream { status: u16, status_text: String },

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("scan {0} not found")]
    NotFound(ScanId),

    #[error("scan {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ScanId,
        from: ScanStatus,
        to: ScanStatus,
    },

    #[error("scan {0} is not accepting host findings")]
    NotProcessing(ScanId),

    #[error("journal io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReconError>;
