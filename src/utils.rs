use once_cell::sync::Lazy;
use regex::Regex;

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").unwrap()
});

/// Reduce a target to a bare lowercase hostname. A full URL
/// (`https://example.com/login`) yields its host, so downstream code that
/// builds `https://{host}` never sees a doubled scheme.
pub fn normalize_target(target: &str) -> String {
    let target = target.trim();
    let host = if target.starts_with("http://") || target.starts_with("https://") {
        match url::Url::parse(target) {
            Ok(u) => u.host_str().map(|s| s.to_string()).unwrap_or_else(|| target.to_string()),
            Err(_) => target.to_string(),
        }
    } else {
        target.to_string()
    };
    host.trim_end_matches('.').to_lowercase()
}

pub fn is_valid_domain(domain: &str) -> bool {
    domain.len() <= 253 && HOSTNAME_RE.is_match(domain)
}
