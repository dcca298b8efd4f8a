use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{Cli, Commands};
use recon_scout::store::{JournalStore, ScanStore};
use recon_scout::{Config, Credentials, HostFinding, ReconPipeline, RiskLevel, Scan, ScanId, ScanStatus};

fn init_logging(cli: &Cli) {
    // Keep external crates (reqwest/hyper) at INFO to avoid flooding the CLI.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!(
        "recon_scout={crate},reqwest=info,hyper=info,h2=info",
        crate = crate_level
    );
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .init();
}

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(&cli);

    match cli.command {
        Commands::Scan { target, securitytrails_key, shodan_key, config, journal, host_cap, probe_timeout, owner } => {
            let mut cfg = match config {
                Some(path) => Config::load(Path::new(&path))?,
                None => Config::default(),
            }
            .with_env();
            if let Some(cap) = host_cap {
                cfg.host_cap = cap;
            }
            if let Some(secs) = probe_timeout {
                cfg.probe_timeout_secs = secs;
            }
            let credentials = Credentials { securitytrails: securitytrails_key, shodan: shodan_key };
            run_scan(cfg, credentials, &target, &journal, owner).await
        }
        Commands::Show { scan_id, journal } => {
            let id: ScanId = scan_id.parse()?;
            let store = JournalStore::open(&journal)?;
            let scan = store
                .get_scan(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("scan {} not found in {}", id, journal))?;
            let hosts = store.host_findings(id).await?;
            print_scan(&scan, &hosts);
            Ok(())
        }
        Commands::List { journal, limit } => {
            let store = JournalStore::open(&journal)?;
            let scans = store.recent_scans(limit).await?;
            if scans.is_empty() {
                println!("[*] No scans recorded in {}", journal);
            }
            for scan in scans {
                let risk = scan.risk.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
                println!("  #{:<5} {:<40} {:<11} risk: {}", scan.id, scan.domain, scan.status, risk);
            }
            Ok(())
        }
    }
}

async fn run_scan(cfg: Config, credentials: Credentials, target: &str, journal: &str, owner: Option<String>) -> anyhow::Result<()> {
    let store: Arc<dyn ScanStore> = Arc::new(JournalStore::open(journal)?);
    let pipeline = Arc::new(ReconPipeline::new(cfg, store.clone())?);

    let scan_start = std::time::Instant::now();
    let id = pipeline.request_scan(target, credentials, owner).await?;
    println!("[>] Scan #{} started for {}", id, target.trim());

    let scan = pipeline.wait_for(id, Duration::from_millis(250)).await?;
    let hosts = store.host_findings(id).await?;
    print_scan(&scan, &hosts);
    println!("[*] Scan Duration: {}s (journal: {})", scan_start.elapsed().as_secs(), journal);

    if scan.status == ScanStatus::Failed {
        anyhow::bail!("scan #{} failed: {}", id, scan.error.unwrap_or_default());
    }
    Ok(())
}

fn risk_marker(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "🟠",
        RiskLevel::Medium => "🟡",
        RiskLevel::Low => "🔵",
    }
}

fn print_scan(scan: &Scan, hosts: &[HostFinding]) {
    println!("\n[*] Scan #{}: {} ({})", scan.id, scan.domain, scan.status);
    if let Some(err) = &scan.error {
        println!("    [!] {}", err);
    }
    if let Some(risk) = scan.risk {
        println!("    Overall Risk: {} {}", risk_marker(risk), risk);
        println!(
            "    Hosts: {} (high: {}, medium: {}, low: {})",
            scan.subdomain_count.unwrap_or_default(),
            scan.high_risk_count.unwrap_or_default(),
            scan.medium_risk_count.unwrap_or_default(),
            scan.low_risk_count.unwrap_or_default(),
        );
    }

    for host in hosts {
        let ip = host.ip.as_deref().unwrap_or("-");
        println!("\n  {} {} [{}] {}", risk_marker(host.risk), host.hostname, host.risk, ip);
        if let Some(isp) = &host.isp {
            println!("      ISP: {}", isp);
        }
        if !host.ports.is_empty() {
            let ports: Vec<String> = host.ports.iter().map(|p| p.to_string()).collect();
            println!("      Ports: {}", ports.join(", "));
        }
        if !host.services.is_empty() {
            println!("      Services: {}", host.services.join(", "));
        }
        for exp in &host.exposures {
            println!("      [!] {} exposed ({}, HTTP {})", exp.path, exp.risk, exp.status);
        }
    }
    println!();
}
