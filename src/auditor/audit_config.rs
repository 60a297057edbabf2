use crate::auditor::audit_error::AuditError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;

/// Tunables for one auditor instance. Every field has a serde default so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Wait after the page is ready before the automatic report is taken
    #[serde(default = "default_settle_delay_ms")]
    settle_delay_ms: u64,

    /// Upper bound on link probes in flight at once
    #[serde(default = "default_max_concurrent_probes")]
    max_concurrent_probes: usize,

    /// Per-probe deadline; an expired probe counts as a network failure
    #[serde(default = "default_probe_timeout_ms")]
    probe_timeout_ms: u64,

    /// Deadline for fetching the audited page itself
    #[serde(default = "default_fetch_timeout_ms")]
    fetch_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    user_agent: String,

    /// Keywords the title, description and headings are expected to mention
    #[serde(default)]
    expected_keywords: Vec<String>,
}

fn default_settle_delay_ms() -> u64 {
    3000
}

fn default_max_concurrent_probes() -> usize {
    8
}

fn default_probe_timeout_ms() -> u64 {
    10_000
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    "pixel-audit".to_string()
}

impl AuditConfig {
    pub fn new(
        settle_delay_ms: u64,
        max_concurrent_probes: usize,
        probe_timeout_ms: u64,
        expected_keywords: Vec<String>,
    ) -> Self {
        Self {
            settle_delay_ms,
            max_concurrent_probes,
            probe_timeout_ms,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            user_agent: default_user_agent(),
            expected_keywords,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn max_concurrent_probes(&self) -> usize {
        // for_each_concurrent reads zero as "unbounded"
        self.max_concurrent_probes.max(1)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn expected_keywords(&self) -> &[String] {
        &self.expected_keywords
    }

    pub fn set_settle_delay_ms(&mut self, settle_delay_ms: u64) {
        self.settle_delay_ms = settle_delay_ms;
    }

    pub fn set_max_concurrent_probes(&mut self, max_concurrent_probes: usize) {
        self.max_concurrent_probes = max_concurrent_probes;
    }

    pub fn set_probe_timeout_ms(&mut self, probe_timeout_ms: u64) {
        self.probe_timeout_ms = probe_timeout_ms;
    }

    pub fn add_expected_keywords(&mut self, keywords: &[String]) {
        for keyword in keywords {
            if !self.expected_keywords.contains(keyword) {
                self.expected_keywords.push(keyword.clone());
            }
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig::new(
            default_settle_delay_ms(),
            default_max_concurrent_probes(),
            default_probe_timeout_ms(),
            Vec::new(),
        )
    }
}
