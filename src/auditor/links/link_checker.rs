use crate::auditor::analytics_sink::{AnalyticsSink, TelemetryEvent};
use crate::auditor::broken_link_record::{BrokenLinkRecord, LinkFailure};
use crate::auditor::links::LinkProbe;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Probe(Url),
    /// An href that could not be turned into a URL at all
    Unresolvable(String),
}

/// Hrefs that never leave the page or are not fetchable are skipped.
pub fn is_checkable(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    !(href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:"))
}

/// Resolves hrefs against the page they were found on, keeping document
/// order. Hrefs resolving to the same URL are kept once.
pub fn resolve_link_targets(hrefs: &[String], page_url: &Url) -> Vec<LinkTarget> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut targets = Vec::new();
    for href in hrefs.iter().filter(|href| is_checkable(href)) {
        let target = match page_url.join(href) {
            Ok(url) => LinkTarget::Probe(url),
            Err(_) => LinkTarget::Unresolvable(href.clone()),
        };
        let key = match &target {
            LinkTarget::Probe(url) => url.to_string(),
            LinkTarget::Unresolvable(href) => href.clone(),
        };
        if seen.insert(key) {
            targets.push(target);
        }
    }
    targets
}

/// How far a sweep has got. Shared with the reporter so a report taken
/// mid-sweep can say so.
#[derive(Debug, Default)]
pub struct SweepProgress {
    total: AtomicUsize,
    checked: AtomicUsize,
}

impl SweepProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total: AtomicUsize::new(total),
            checked: AtomicUsize::new(0),
        }
    }

    /// (checked, total)
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.checked.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    fn mark_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct LinkChecker<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    probe: Arc<P>,
    sink: Arc<S>,
    max_concurrent_probes: usize,
    probe_timeout: Duration,
}

impl<P, S> Clone for LinkChecker<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    fn clone(&self) -> Self {
        Self {
            probe: Arc::clone(&self.probe),
            sink: Arc::clone(&self.sink),
            max_concurrent_probes: self.max_concurrent_probes,
            probe_timeout: self.probe_timeout,
        }
    }
}

impl<P, S> LinkChecker<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    pub fn new(
        probe: Arc<P>,
        sink: Arc<S>,
        max_concurrent_probes: usize,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe,
            sink,
            max_concurrent_probes,
            probe_timeout,
        }
    }

    /// Probes every target, at most `max_concurrent_probes` at a time, and
    /// appends a record to `broken_links` as soon as each failure is known.
    /// A failing probe never stops the others.
    pub async fn sweep(
        &self,
        targets: Vec<LinkTarget>,
        source: &str,
        broken_links: Arc<Mutex<Vec<BrokenLinkRecord>>>,
        progress: Arc<SweepProgress>,
    ) {
        log::info!("Checking {} links found on {}", targets.len(), source);

        futures::stream::iter(targets)
            .for_each_concurrent(self.max_concurrent_probes, |target| {
                let broken_links = Arc::clone(&broken_links);
                let progress = Arc::clone(&progress);
                async move {
                    let record = self.check_target(target, source).await;
                    if let Some(record) = record {
                        broken_links.lock().await.push(record);
                    }
                    progress.mark_checked();
                }
            })
            .await;

        let (checked, total) = progress.snapshot();
        log::info!("Link sweep of {} finished: {}/{} checked", source, checked, total);
    }

    async fn check_target(&self, target: LinkTarget, source: &str) -> Option<BrokenLinkRecord> {
        let url = match target {
            LinkTarget::Probe(url) => url,
            LinkTarget::Unresolvable(href) => {
                log::warn!("Broken link found: {} (Invalid URL)", href);
                self.sink
                    .log_event(TelemetryEvent::labelled("Broken Link", "Invalid URL"));
                return Some(BrokenLinkRecord::without_response(
                    href,
                    source.to_string(),
                    LinkFailure::InvalidUrl,
                ));
            }
        };

        let url_str = url.to_string();
        match tokio::time::timeout(self.probe_timeout, self.probe.probe(url)).await {
            Ok(Ok(status)) if (200..300).contains(&status) => None,
            Ok(Ok(status)) => {
                log::warn!("Broken link found: {} (Status: {})", url_str, status);
                self.sink
                    .log_event(TelemetryEvent::labelled("Broken Link", &status.to_string()));
                Some(BrokenLinkRecord::from_status_code(
                    url_str,
                    status,
                    source.to_string(),
                ))
            }
            Ok(Err(e)) => {
                log::warn!("Broken link found: {} (Network error: {})", url_str, e);
                self.sink
                    .log_event(TelemetryEvent::labelled("Broken Link", "Network error"));
                Some(BrokenLinkRecord::without_response(
                    url_str,
                    source.to_string(),
                    LinkFailure::Network,
                ))
            }
            Err(_) => {
                log::warn!(
                    "Broken link found: {} (No response within {}ms)",
                    url_str,
                    self.probe_timeout.as_millis()
                );
                self.sink
                    .log_event(TelemetryEvent::labelled("Broken Link", "Timeout"));
                Some(BrokenLinkRecord::without_response(
                    url_str,
                    source.to_string(),
                    LinkFailure::Timeout,
                ))
            }
        }
    }
}
