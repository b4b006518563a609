//! Run configuration.
//!
//! The base URL comes from the environment; everything else has a default
//! that the CLI may override.

use std::time::Duration;

/// Environment variable holding the reference API base URL.
pub const BASE_URL_ENV: &str = "THIRD_PARTY_BASE_URL";

/// Records fetched per page when no batch size is given.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Per-request timeout for the HTTP resolver.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Reference API base URL. `None` stops the run before paging.
    pub base_url: Option<String>,
    /// Page size used by the driver.
    pub batch_size: usize,
    /// Resolve and classify, but persist nothing.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Defaults plus `THIRD_PARTY_BASE_URL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: normalize_base_url(lookup(BASE_URL_ENV)),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(Some(base_url.into()));
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The configured base URL, if it is non-empty.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

fn normalize_base_url(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.batch_size, 25);
        assert!(cfg.base_url().is_none());
        assert!(!cfg.dry_run);
    }

    #[test]
    fn base_url_read_from_lookup() {
        let cfg = SyncConfig::from_lookup(|key| {
            (key == BASE_URL_ENV).then(|| "https://api.example.test".to_string())
        });
        assert_eq!(cfg.base_url(), Some("https://api.example.test"));
    }

    #[test]
    fn blank_base_url_counts_as_missing() {
        let cfg = SyncConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(cfg.base_url().is_none());
        assert!(SyncConfig::default().with_base_url("").base_url().is_none());
    }

    #[test]
    fn builder_overrides() {
        let cfg = SyncConfig::default()
            .with_base_url("http://localhost:8080")
            .with_batch_size(2)
            .with_dry_run(true);
        assert_eq!(cfg.base_url(), Some("http://localhost:8080"));
        assert_eq!(cfg.batch_size, 2);
        assert!(cfg.dry_run);
    }
}
