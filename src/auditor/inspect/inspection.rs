use crate::auditor::audit_issue::AuditIssue;
use crate::auditor::page_metrics::PageMetrics;
use url::Url;

/// Everything one inspection pass produced for a single page.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub page_url: Url,
    pub metrics: PageMetrics,
    pub issues: Vec<AuditIssue>,
    /// Raw `href` values in document order, unfiltered
    pub link_hrefs: Vec<String>,
}
