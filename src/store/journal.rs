use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::memory::MemoryStore;
use super::{ScanStore, StoreResult};
use crate::model::{HostFinding, NewHostFinding, RiskCounts, RiskLevel, Scan, ScanId, ScanStatus};

/// One line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEntry {
    ScanCreated { scan: Scan },
    StatusUpdated { id: ScanId, status: ScanStatus, error: Option<String> },
    HostRecorded { finding: HostFinding },
    ScanCompleted { id: ScanId, risk: RiskLevel, counts: RiskCounts },
}

/// Append-only JSONL journal over a [`MemoryStore`]. Opening an existing
/// journal replays it, so a later process sees the same scans.
pub struct JournalStore {
    state: MemoryStore,
    file: Mutex<File>,
    path: PathBuf,
}

impl JournalStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let state = MemoryStore::new();
        if path.exists() {
            let (replayed, torn_at) = replay(&path, &state)?;
            if let Some(len) = torn_at {
                OpenOptions::new().write(true).open(&path)?.set_len(len)?;
            }
            tracing::debug!(path = %path.display(), entries = replayed, "journal replayed");
        }

        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        Ok(Self { state, file: Mutex::new(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a change against the in-memory state, append it, and only
    /// then apply it. The file lock is held throughout so journal order
    /// matches state order and nothing changes between check and apply.
    fn record<T>(
        &self,
        prepare: impl FnOnce(&MemoryStore) -> StoreResult<(T, JournalEntry)>,
    ) -> StoreResult<T> {
        let mut file = self.file.lock();
        let (out, entry) = prepare(&self.state)?;
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let len = file.metadata()?.len();
        if let Err(e) = file.write_all(&line).and_then(|_| file.flush()) {
            // drop a partial line so later appends start clean
            if let Err(trunc) = file.set_len(len) {
                tracing::warn!(path = %self.path.display(), error = %trunc, "could not trim partial journal line");
            }
            return Err(e.into());
        }

        apply(&self.state, entry)?;
        Ok(out)
    }
}

fn apply(state: &MemoryStore, entry: JournalEntry) -> StoreResult<()> {
    match entry {
        JournalEntry::ScanCreated { scan } => state.restore_scan(scan),
        JournalEntry::StatusUpdated { id, status, error } => state.set_status(id, status, error)?,
        JournalEntry::HostRecorded { finding } => state.restore_finding(finding),
        JournalEntry::ScanCompleted { id, risk, counts } => state.complete(id, risk, counts)?,
    }
    Ok(())
}

/// Replay every entry into `state`. Returns the entry count and, when the
/// final line is unreadable (a write cut short), the length of the intact
/// prefix. Unreadable lines anywhere else are an error.
fn replay(path: &Path, state: &MemoryStore) -> StoreResult<(usize, Option<u64>)> {
    let data = std::fs::read(path)?;
    let mut count = 0;
    let mut offset = 0;
    for raw in data.split_inclusive(|b| *b == b'\n') {
        let start = offset;
        offset += raw.len();
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let entry: JournalEntry = match serde_json::from_slice(raw) {
            Ok(entry) => entry,
            Err(e) if data[offset..].iter().all(u8::is_ascii_whitespace) => {
                tracing::warn!(
                    path = %path.display(),
                    offset = start,
                    error = %e,
                    "dropping torn journal tail"
                );
                return Ok((count, Some(start as u64)));
            }
            Err(e) => return Err(e.into()),
        };
        apply(state, entry)?;
        count += 1;
    }
    Ok((count, None))
}

#[async_trait]
impl ScanStore for JournalStore {
    async fn create_scan(&self, domain: &str, owner: Option<String>) -> StoreResult<ScanId> {
        self.record(|state| {
            let scan = Scan::new(state.next_scan_id(), domain, owner);
            Ok((scan.id, JournalEntry::ScanCreated { scan }))
        })
    }

    async fn update_scan_status(
        &self,
        id: ScanId,
        status: ScanStatus,
        error: Option<String>,
    ) -> StoreResult<()> {
        self.record(|state| {
            state.check_transition(id, status)?;
            let error = if status == ScanStatus::Failed { error } else { None };
            Ok(((), JournalEntry::StatusUpdated { id, status, error }))
        })
    }

    async fn insert_host_finding(&self, id: ScanId, finding: NewHostFinding) -> StoreResult<u64> {
        self.record(|state| {
            let stored = state.prepare_finding(id, finding)?;
            Ok((stored.id, JournalEntry::HostRecorded { finding: stored }))
        })
    }

    async fn complete_scan(&self, id: ScanId, risk: RiskLevel, counts: RiskCounts) -> StoreResult<()> {
        self.record(|state| {
            state.check_transition(id, ScanStatus::Completed)?;
            Ok(((), JournalEntry::ScanCompleted { id, risk, counts }))
        })
    }

    async fn get_scan(&self, id: ScanId) -> StoreResult<Option<Scan>> {
        Ok(self.state.scan(id))
    }

    async fn host_findings(&self, id: ScanId) -> StoreResult<Vec<HostFinding>> {
        Ok(self.state.findings_for(id))
    }

    async fn recent_scans(&self, limit: usize) -> StoreResult<Vec<Scan>> {
        Ok(self.state.recent(limit))
    }
}
