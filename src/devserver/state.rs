//! Dev Server State
//!
//! Shared state accessible by the request handler.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::time::Instant;
use tower_http::services::{ServeDir, ServeFile};

use super::error::DevServerError;
use crate::config::{BuildConfig, DevServerConfig, ProxyRule};

/// Shared state for the dev server
#[derive(Clone)]
pub struct DevServerState {
    /// HTTP client used to reach proxy targets
    pub client: reqwest::Client,
    /// Proxy rules, longest prefix first
    pub rules: Vec<ProxyRule>,
    /// Static files from the build output, falling back to `index.html`
    pub static_files: ServeDir<ServeFile>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl DevServerState {
    pub fn new(config: &DevServerConfig, build: &BuildConfig) -> Result<Self, DevServerError> {
        // Redirects are the browser's business, pass them through untouched
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| DevServerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let mut rules = config.proxy.clone();
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        let index = build.output_dir.join("index.html");
        let static_files = ServeDir::new(&build.output_dir).fallback(ServeFile::new(index));

        Ok(Self {
            client,
            rules,
            static_files,
            start_time: Instant::now(),
        })
    }

    /// The proxy rule covering a path, if any. Prefixes match on segment
    /// boundaries: `/api` covers `/api` and `/api/x`, not `/apix`.
    pub fn rule_for(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| {
            let prefix = rule.prefix.trim_end_matches('/');
            match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
                None => false,
            }
        })
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(prefix: &str, target: &str) -> ProxyRule {
        ProxyRule {
            prefix: prefix.to_string(),
            target: target.to_string(),
            change_origin: true,
        }
    }

    #[test]
    fn test_rule_for_matches_segments() {
        let state = DevServerState::new(&DevServerConfig::default(), &BuildConfig::default()).unwrap();

        assert!(state.rule_for("/api").is_some());
        assert!(state.rule_for("/api/projects").is_some());
        assert!(state.rule_for("/apix").is_none());
        assert!(state.rule_for("/history").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let config = DevServerConfig {
            proxy: vec![
                rule("/api", "http://localhost:8000"),
                rule("/api/papers", "http://localhost:9000"),
            ],
            ..Default::default()
        };
        let state = DevServerState::new(&config, &BuildConfig::default()).unwrap();

        assert_eq!(
            state.rule_for("/api/papers/1/pdf").map(|r| r.target.as_str()),
            Some("http://localhost:9000")
        );
        assert_eq!(
            state.rule_for("/api/projects").map(|r| r.target.as_str()),
            Some("http://localhost:8000")
        );
    }
}
