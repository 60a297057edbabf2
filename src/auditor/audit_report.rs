use crate::auditor::audit_issue::AuditIssue;
use crate::auditor::broken_link_record::BrokenLinkRecord;
use crate::auditor::page_metrics::PageMetrics;
use crate::auditor::score::{QualityScore, score_metrics};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One assembled audit result. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    metrics: PageMetrics,
    broken_links: Vec<BrokenLinkRecord>,
    issues: Vec<AuditIssue>,
    /// Links probed when the report was taken, out of `links_total`
    links_checked: usize,
    links_total: usize,
    timestamp: String,
    url: String,
}

impl AuditReport {
    pub fn new(
        metrics: PageMetrics,
        broken_links: Vec<BrokenLinkRecord>,
        issues: Vec<AuditIssue>,
        links_checked: usize,
        links_total: usize,
        url: String,
    ) -> Self {
        Self {
            metrics,
            broken_links,
            issues,
            links_checked,
            links_total,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
        }
    }

    pub fn metrics(&self) -> &PageMetrics {
        &self.metrics
    }

    pub fn broken_links(&self) -> &[BrokenLinkRecord] {
        &self.broken_links
    }

    pub fn issues(&self) -> &[AuditIssue] {
        &self.issues
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// (checked, total)
    pub fn link_progress(&self) -> (usize, usize) {
        (self.links_checked, self.links_total)
    }

    pub fn is_link_sweep_complete(&self) -> bool {
        self.links_checked >= self.links_total
    }

    pub fn quality(&self) -> QualityScore {
        score_metrics(&self.metrics, self.broken_links.len())
    }
}
