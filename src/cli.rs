use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run passive recon against a root domain and wait for the result
    Scan {
        /// Target domain (e.g. example.com); a full URL is reduced to its host
        target: String,

        /// SecurityTrails API key (falls back to SECURITYTRAILS_API_KEY)
        #[arg(long, value_name = "KEY")]
        securitytrails_key: Option<String>,

        /// Shodan API key (falls back to SHODAN_API_KEY); enrichment is skipped without one
        #[arg(long, value_name = "KEY")]
        shodan_key: Option<String>,

        /// JSON config file
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<String>,

        /// Journal file where scans and host findings are persisted
        #[arg(short = 'j', long, default_value = "./results/scans.jsonl")]
        journal: String,

        /// Maximum hosts per scan, root domain included (overrides config)
        #[arg(long)]
        host_cap: Option<usize>,

        /// Per-attempt exposure probe timeout in seconds (overrides config)
        #[arg(long)]
        probe_timeout: Option<u64>,

        /// Owner recorded on the scan
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a persisted scan and its host findings
    Show {
        /// Scan id printed by `scan`
        scan_id: String,

        #[arg(short = 'j', long, default_value = "./results/scans.jsonl")]
        journal: String,
    },

    /// List the most recent scans
    List {
        #[arg(short = 'j', long, default_value = "./results/scans.jsonl")]
        journal: String,

        #[arg(short = 'n', long, default_value_t = 5_usize)]
        limit: usize,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
