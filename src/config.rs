use serde::Deserialize;
use std::path::Path;

use crate::model::RiskLevel;

pub const SECURITYTRAILS_KEY_ENV: &str = "SECURITYTRAILS_API_KEY";
pub const SHODAN_KEY_ENV: &str = "SHODAN_API_KEY";

/// A sensitive path and the risk it carries when reachable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProbePath {
    pub path: String,
    pub risk: RiskLevel,
}

impl ProbePath {
    pub fn new(path: &str, risk: RiskLevel) -> Self {
        Self { path: path.to_string(), risk }
    }
}

pub fn default_probe_paths() -> Vec<ProbePath> {
    vec![
        ProbePath::new("/.git/", RiskLevel::High),
        ProbePath::new("/.env", RiskLevel::High),
        ProbePath::new("/backup.zip", RiskLevel::High),
        ProbePath::new("/db.sql", RiskLevel::High),
        ProbePath::new("/config.php", RiskLevel::High),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of hostnames processed per scan, root included.
    pub host_cap: usize,
    pub probe_timeout_secs: u64,
    pub probe_paths: Vec<ProbePath>,
    /// Schemes tried in order for each path; later ones only run on a miss.
    pub probe_schemes: Vec<String>,
    pub securitytrails_base_url: String,
    pub shodan_base_url: String,
    pub securitytrails_api_key: Option<String>,
    pub shodan_api_key: Option<String>,
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_cap: 20,
            probe_timeout_secs: 3,
            probe_paths: default_probe_paths(),
            probe_schemes: vec!["https".to_string(), "http".to_string()],
            securitytrails_base_url: "https://api.securitytrails.com".to_string(),
            shodan_base_url: "https://api.shodan.io".to_string(),
            securitytrails_api_key: None,
            shodan_api_key: None,
            accept_invalid_certs: false,
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        Ok(cfg)
    }

    /// Fill keys the file did not set from the process environment.
    pub fn with_env(mut self) -> Self {
        if non_empty(self.securitytrails_api_key.as_deref()).is_none() {
            self.securitytrails_api_key = std::env::var(SECURITYTRAILS_KEY_ENV).ok();
        }
        if non_empty(self.shodan_api_key.as_deref()).is_none() {
            self.shodan_api_key = std::env::var(SHODAN_KEY_ENV).ok();
        }
        self
    }
}

/// What a pipeline step does when its credential cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The scan fails before any external call.
    Required,
    /// The step is skipped for every host.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Discovery,
    Enrichment,
}

impl Step {
    pub fn provider(self) -> &'static str {
        match self {
            Step::Discovery => "SecurityTrails",
            Step::Enrichment => "Shodan",
        }
    }

    pub fn missing_key_message(self) -> String {
        format!("Missing {} API Key", self.provider())
    }
}

pub const CREDENTIAL_POLICY: [(Step, Requirement); 2] = [
    (Step::Discovery, Requirement::Required),
    (Step::Enrichment, Requirement::Optional),
];

pub fn requirement_for(step: Step) -> Requirement {
    CREDENTIAL_POLICY
        .iter()
        .find(|(s, _)| *s == step)
        .map(|(_, r)| *r)
        .unwrap_or(Requirement::Optional)
}

/// Keys supplied with a single scan request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub securitytrails: Option<String>,
    pub shodan: Option<String>,
}

impl Credentials {
    /// Request keys win; process-level keys fill the gaps.
    pub fn resolve(&self, config: &Config) -> Credentials {
        Credentials {
            securitytrails: pick(
                self.securitytrails.as_deref(),
                config.securitytrails_api_key.as_deref(),
            ),
            shodan: pick(self.shodan.as_deref(), config.shodan_api_key.as_deref()),
        }
    }

    pub fn for_step(&self, step: Step) -> Option<&str> {
        match step {
            Step::Discovery => self.securitytrails.as_deref(),
            Step::Enrichment => self.shodan.as_deref(),
        }
    }
}

fn pick(request: Option<&str>, process: Option<&str>) -> Option<String> {
    non_empty(request).or(non_empty(process)).map(str::to_string)
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_table() {
        let cfg = Config::default();
        assert_eq!(cfg.host_cap, 20);
        assert_eq!(cfg.probe_timeout_secs, 3);
        let paths: Vec<_> = cfg.probe_paths.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/.git/", "/.env", "/backup.zip", "/db.sql", "/config.php"]);
        assert!(cfg.probe_paths.iter().all(|p| p.risk == RiskLevel::High));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{"host_cap": 5, "probe_paths": [{"path": "/x", "risk": "Medium"}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.host_cap, 5);
        assert_eq!(cfg.probe_paths, vec![ProbePath::new("/x", RiskLevel::Medium)]);
        assert_eq!(cfg.probe_timeout_secs, 3);
        assert_eq!(cfg.probe_schemes, vec!["https", "http"]);
    }

    #[test]
    fn request_keys_override_config() {
        let cfg = Config {
            securitytrails_api_key: Some("cfg-st".into()),
            shodan_api_key: Some("cfg-sh".into()),
            ..Config::default()
        };
        let req = Credentials { securitytrails: Some("req-st".into()), shodan: Some("  ".into()) };
        let resolved = req.resolve(&cfg);
        assert_eq!(resolved.securitytrails.as_deref(), Some("req-st"));
        assert_eq!(resolved.shodan.as_deref(), Some("cfg-sh"));
    }

    #[test]
    fn policy_is_asymmetric() {
        assert_eq!(requirement_for(Step::Discovery), Requirement::Required);
        assert_eq!(requirement_for(Step::Enrichment), Requirement::Optional);
    }
}
