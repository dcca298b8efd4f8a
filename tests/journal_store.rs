use recon_scout::store::journal::JournalEntry;
use recon_scout::store::{JournalStore, ScanStore};
use recon_scout::{Exposure, NewHostFinding, RiskCounts, RiskLevel, ScanStatus, StoreError};
use tempfile::TempDir;

fn finding(host: &str, risk: RiskLevel) -> NewHostFinding {
    NewHostFinding {
        hostname: host.into(),
        ip: Some("192.0.2.1".into()),
        isp: Some("Unknown".into()),
        ports: vec![443],
        services: vec!["443".into()],
        exposures: if risk == RiskLevel::High {
            vec![Exposure { path: "/.git/".into(), risk: RiskLevel::High, status: 200 }]
        } else {
            Vec::new()
        },
        risk,
    }
}

#[tokio::test]
async fn journal_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/scans.jsonl");

    let (done, failed) = {
        let store = JournalStore::open(&path).unwrap();
        let done = store.create_scan("example.com", Some("bob".into())).await.unwrap();
        store.update_scan_status(done, ScanStatus::Processing, None).await.unwrap();
        store.insert_host_finding(done, finding("example.com", RiskLevel::High)).await.unwrap();
        store.insert_host_finding(done, finding("www.example.com", RiskLevel::Medium)).await.unwrap();
        let counts = RiskCounts { high: 1, medium: 1, low: 0 };
        store.complete_scan(done, RiskLevel::High, counts).await.unwrap();

        let failed = store.create_scan("other.org", None).await.unwrap();
        store
            .update_scan_status(failed, ScanStatus::Failed, Some("Missing SecurityTrails API Key".into()))
            .await
            .unwrap();
        (done, failed)
    };

    let store = JournalStore::open(&path).unwrap();
    let scan = store.get_scan(done).await.unwrap().unwrap();
    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.risk, Some(RiskLevel::High));
    assert_eq!(scan.subdomain_count, Some(2));
    assert_eq!(scan.owner.as_deref(), Some("bob"));

    let hosts = store.host_findings(done).await.unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].exposures.len(), 1);

    let other = store.get_scan(failed).await.unwrap().unwrap();
    assert_eq!(other.status, ScanStatus::Failed);
    assert_eq!(other.error.as_deref(), Some("Missing SecurityTrails API Key"));

    let recent: Vec<_> = store.recent_scans(5).await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(recent, [failed, done]);

    // ids keep counting after a replay
    let next = store.create_scan("third.net", None).await.unwrap();
    assert!(next > failed);
}

#[tokio::test]
async fn rejected_writes_are_not_journaled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.jsonl");
    let store = JournalStore::open(&path).unwrap();

    let id = store.create_scan("example.com", None).await.unwrap();
    store.update_scan_status(id, ScanStatus::Failed, Some("boom".into())).await.unwrap();

    let err = store.update_scan_status(id, ScanStatus::Processing, None).await;
    assert!(matches!(err, Err(StoreError::InvalidTransition { .. })));

    let data = std::fs::read_to_string(store.path()).unwrap();
    let entries: Vec<JournalEntry> = data
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0], JournalEntry::ScanCreated { .. }));
    assert!(matches!(
        entries[1],
        JournalEntry::StatusUpdated { status: ScanStatus::Failed, .. }
    ));
}

#[tokio::test]
async fn torn_last_line_is_dropped_on_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.jsonl");
    let first = {
        let store = JournalStore::open(&path).unwrap();
        store.create_scan("example.com", None).await.unwrap()
    };
    let intact = std::fs::metadata(&path).unwrap().len();

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    std::io::Write::write_all(&mut file, br#"{"event":"scan_created","scan":{"id":2,"#).unwrap();
    drop(file);

    let store = JournalStore::open(&path).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), intact);
    assert_eq!(store.get_scan(first).await.unwrap().unwrap().domain, "example.com");

    // new appends land on a clean line and survive another reopen
    let second = store.create_scan("other.org", None).await.unwrap();
    drop(store);
    let store = JournalStore::open(&path).unwrap();
    let ids: Vec<_> = store.recent_scans(5).await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, [second, first]);
}

#[tokio::test]
async fn corruption_before_the_tail_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.jsonl");
    {
        let store = JournalStore::open(&path).unwrap();
        store.create_scan("example.com", None).await.unwrap();
    }
    let good = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, format!("not json\n{}", good)).unwrap();

    assert!(matches!(JournalStore::open(&path), Err(StoreError::Serialization(_))));
}
