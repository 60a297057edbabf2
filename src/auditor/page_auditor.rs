use crate::auditor::analytics_sink::{AnalyticsSink, TelemetryEvent};
use crate::auditor::audit_config::AuditConfig;
use crate::auditor::audit_error::AuditError;
use crate::auditor::audit_report::AuditReport;
use crate::auditor::auditor_state::AuditorState;
use crate::auditor::broken_link_record::BrokenLinkRecord;
use crate::auditor::inspect::{DomInspector, Inspection};
use crate::auditor::links::{LinkChecker, LinkProbe, SweepProgress, resolve_link_targets};
use crate::auditor::page::FetchedPage;
use crate::auditor::shutdown_signal::ShutdownSignal;
use std::sync::Arc;
use tokio::select;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// State of the link sweep for the page currently inspected. Each run gets
/// fresh buffers so a cancelled sweep can never write into a newer one.
struct Sweep {
    broken_links: Arc<Mutex<Vec<BrokenLinkRecord>>>,
    progress: Arc<SweepProgress>,
    handle: Option<JoinHandle<()>>,
}

/// Runs audits for one page at a time and keeps the most recent report.
///
/// Nothing runs on construction. Call [`PageAuditor::run_on_page_ready`]
/// from the page-ready hook for the automatic audit, and
/// [`PageAuditor::run_audit_now`] whenever the operator asks for one.
pub struct PageAuditor<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    config: AuditConfig,
    sink: Arc<S>,
    link_checker: LinkChecker<P, S>,
    shutdown: ShutdownSignal,
    state: Mutex<AuditorState>,
    inspection: Mutex<Option<Inspection>>,
    sweep: Mutex<Option<Sweep>>,
    current_report: Mutex<Option<AuditReport>>,
}

impl<P, S> PageAuditor<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    pub fn new(config: AuditConfig, probe: P, sink: S, shutdown: ShutdownSignal) -> Self {
        let sink = Arc::new(sink);
        let link_checker = LinkChecker::new(
            Arc::new(probe),
            Arc::clone(&sink),
            config.max_concurrent_probes(),
            config.probe_timeout(),
        );
        Self {
            config,
            sink,
            link_checker,
            shutdown,
            state: Mutex::new(AuditorState::default()),
            inspection: Mutex::new(None),
            sweep: Mutex::new(None),
            current_report: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub async fn state(&self) -> AuditorState {
        *self.state.lock().await
    }

    /// Most recently assembled report, if any run has completed.
    pub async fn current_report(&self) -> Option<AuditReport> {
        self.current_report.lock().await.clone()
    }

    /// Fresh inspection and full link sweep, then a report.
    pub async fn run_audit_now(&self, page: FetchedPage) -> Result<AuditReport, AuditError> {
        let result = async {
            self.inspect_page(page).await?;
            self.wait_for_link_sweep().await;
            self.generate_report().await
        }
        .await;
        self.contain_failure(result).await
    }

    /// Automatic run for a page that just became ready. The sweep is started
    /// but not awaited: after the settle delay the report reflects whichever
    /// links have resolved so far.
    pub async fn run_on_page_ready(&self, page: FetchedPage) -> Result<AuditReport, AuditError> {
        let result = async {
            self.inspect_page(page).await?;
            select! {
                _ = tokio::time::sleep(self.config.settle_delay()) => {}
                _ = self.shutdown.triggered() => {
                    log::info!("Shutdown requested during settle delay");
                }
            }
            self.generate_report().await
        }
        .await;
        self.contain_failure(result).await
    }

    /// Inspects the document and starts a new link sweep, cancelling any
    /// sweep still running for the previous page.
    pub async fn inspect_page(&self, page: FetchedPage) -> Result<(), AuditError> {
        self.set_state(AuditorState::Running).await;
        log::info!(
            "Auditing {} ({}, {})",
            page.url,
            page.status_code,
            page.content_type
        );

        let inspection =
            DomInspector::new(self.sink.as_ref(), self.config.expected_keywords()).inspect(&page)?;

        let targets = resolve_link_targets(&inspection.link_hrefs, &inspection.page_url);
        let source = inspection.page_url.to_string();
        let broken_links = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(SweepProgress::new(targets.len()));

        let handle = {
            let link_checker = self.link_checker.clone();
            let shutdown = self.shutdown.clone();
            let broken_links = Arc::clone(&broken_links);
            let progress = Arc::clone(&progress);
            tokio::task::spawn(async move {
                select! {
                    _ = link_checker.sweep(targets, &source, broken_links, progress) => {}
                    _ = shutdown.triggered() => {
                        log::info!("Link sweep of {} cancelled", source);
                    }
                }
            })
        };

        {
            let mut sweep = self.sweep.lock().await;
            if let Some(previous) = sweep.take() {
                if let Some(handle) = previous.handle {
                    handle.abort();
                }
            }
            sweep.replace(Sweep {
                broken_links,
                progress,
                handle: Some(handle),
            });
        }
        self.inspection.lock().await.replace(inspection);
        Ok(())
    }

    /// Waits until the current sweep has probed every link, or shutdown.
    pub async fn wait_for_link_sweep(&self) {
        let handle = {
            let mut sweep = self.sweep.lock().await;
            sweep.as_mut().and_then(|sweep| sweep.handle.take())
        };
        if let Some(handle) = handle {
            select! {
                result = handle => {
                    if let Err(e) = result {
                        if !e.is_cancelled() {
                            log::error!("Link sweep task failed: {}", e);
                        }
                    }
                }
                _ = self.shutdown.triggered() => {}
            }
        }
    }

    /// Assembles a report from the current inspection and whatever the link
    /// sweep has recorded so far.
    pub async fn generate_report(&self) -> Result<AuditReport, AuditError> {
        let inspection = self
            .inspection
            .lock()
            .await
            .clone()
            .ok_or(AuditError::ReportUnavailable)?;

        let (broken_links, (links_checked, links_total)) = {
            let sweep = self.sweep.lock().await;
            match sweep.as_ref() {
                Some(sweep) => (
                    sweep.broken_links.lock().await.clone(),
                    sweep.progress.snapshot(),
                ),
                None => (Vec::new(), (0, 0)),
            }
        };

        let report = AuditReport::new(
            inspection.metrics,
            broken_links,
            inspection.issues,
            links_checked,
            links_total,
            inspection.page_url.to_string(),
        );

        let quality = report.quality();
        log::info!(
            "Audit report for {} generated: {} ({}), {} broken links, {}/{} links checked",
            report.url(),
            quality.score,
            quality.label,
            report.broken_links().len(),
            links_checked,
            links_total
        );
        self.sink
            .log_event(TelemetryEvent::labelled("Audit Report", "Generated"));

        self.current_report.lock().await.replace(report.clone());
        self.set_state(AuditorState::Displayed).await;
        Ok(report)
    }

    /// Hides the report panel. The last report stays available.
    pub async fn collapse(&self) {
        self.set_state(AuditorState::Idle).await;
    }

    async fn set_state(&self, state: AuditorState) {
        let mut current = self.state.lock().await;
        if *current != state {
            log::debug!("Auditor state {} -> {}", current.as_str(), state.as_str());
            *current = state;
        }
    }

    /// A failed run leaves the previous report in place and the auditor in
    /// the state that matches it.
    async fn contain_failure(
        &self,
        result: Result<AuditReport, AuditError>,
    ) -> Result<AuditReport, AuditError> {
        if let Err(e) = &result {
            log::error!("SEO audit failed: {}", e);
            let fallback = if self.current_report.lock().await.is_some() {
                AuditorState::Displayed
            } else {
                AuditorState::Idle
            };
            self.set_state(fallback).await;
        }
        result
    }
}

impl<P, S> Drop for PageAuditor<P, S>
where
    P: LinkProbe,
    S: AnalyticsSink,
{
    fn drop(&mut self) {
        if let Some(sweep) = self.sweep.get_mut() {
            if let Some(handle) = sweep.handle.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::analytics_sink::testing::RecordingSink;
    use crate::auditor::audit_issue::AuditIssue;
    use crate::auditor::broken_link_record::LinkFailure;
    use crate::auditor::links::testing::{Behaviour, ScriptedProbe};
    use crate::auditor::score::ScoreLabel;
    use tokio::time::{Duration, timeout};
    use url::Url;

    const HOME: &str = "https://summitpixels.example/";

    fn page(html: &str) -> FetchedPage {
        FetchedPage::from_html(Url::parse(HOME).unwrap(), html.to_string())
    }

    fn auditor(probe: ScriptedProbe, settle_delay_ms: u64) -> PageAuditor<ScriptedProbe, RecordingSink> {
        auditor_with_shutdown(probe, settle_delay_ms, ShutdownSignal::new())
    }

    fn auditor_with_shutdown(
        probe: ScriptedProbe,
        settle_delay_ms: u64,
        shutdown: ShutdownSignal,
    ) -> PageAuditor<ScriptedProbe, RecordingSink> {
        let config = AuditConfig::new(settle_delay_ms, 4, 5_000, Vec::new());
        PageAuditor::new(config, probe, RecordingSink::default(), shutdown)
    }

    const SCENARIO: &str = r#"<html><head>
        <title>SummitPixels</title>
        <meta name="viewport" content="width=device-width">
        <link rel="canonical" href="https://summitpixels.example/">
        <script type="application/ld+json">{"@type":"Organization"}</script>
        </head><body><h1>SummitPixels</h1>
        <a href="/services">Services</a>
        <a href="/portfolio">Portfolio</a>
        </body></html>"#;

    #[tokio::test]
    async fn nothing_runs_until_asked() {
        let auditor = auditor(ScriptedProbe::default(), 0);
        assert_eq!(auditor.state().await, AuditorState::Idle);
        assert!(auditor.current_report().await.is_none());
        assert!(matches!(
            auditor.generate_report().await,
            Err(AuditError::ReportUnavailable)
        ));
    }

    #[tokio::test]
    async fn scenario_page_scores_good() {
        let auditor = auditor(ScriptedProbe::default(), 0);
        let mut fetched = page(SCENARIO);
        fetched.load_time_ms = Some(1200);

        let report = auditor.run_audit_now(fetched).await.unwrap();

        assert_eq!(report.url(), HOME);
        assert!(report.broken_links().is_empty());
        assert_eq!(report.link_progress(), (2, 2));
        assert!(report.issues().contains(&AuditIssue::DescriptionMissing));
        let quality = report.quality();
        assert_eq!(quality.score, 70);
        assert_eq!(quality.label, ScoreLabel::Good);
        assert_eq!(auditor.state().await, AuditorState::Displayed);
        assert_eq!(auditor.current_report().await, Some(report));
    }

    #[tokio::test]
    async fn broken_links_lower_the_score() {
        let probe = ScriptedProbe::default()
            .with("https://summitpixels.example/services", Behaviour::Status(404))
            .with("https://summitpixels.example/portfolio", Behaviour::Refused);
        let auditor = auditor(probe, 0);

        let report = auditor.run_audit_now(page(SCENARIO)).await.unwrap();

        assert_eq!(report.broken_links().len(), 2);
        assert!(report.broken_links().iter().all(|record| record.source == HOME));
        assert!(report
            .broken_links()
            .iter()
            .any(|record| record.failure == LinkFailure::Network && record.status == 0));
        assert_eq!(report.quality().score, 70 - 4);
    }

    #[tokio::test]
    async fn report_after_settle_delay_reflects_partial_sweep() {
        let probe = ScriptedProbe::default()
            .with("https://summitpixels.example/services", Behaviour::Status(500))
            .with("https://summitpixels.example/portfolio", Behaviour::Hang);
        let auditor = auditor(probe, 50);

        let report = auditor.run_on_page_ready(page(SCENARIO)).await.unwrap();

        assert_eq!(report.link_progress(), (1, 2));
        assert!(!report.is_link_sweep_complete());
        assert_eq!(report.broken_links().len(), 1);
        assert_eq!(report.broken_links()[0].status, 500);
        assert_eq!(auditor.state().await, AuditorState::Displayed);
    }

    #[tokio::test]
    async fn each_run_starts_from_a_clean_slate() {
        let probe = ScriptedProbe::default()
            .with("https://summitpixels.example/services", Behaviour::Status(404));
        let auditor = auditor(probe, 0);

        let first = auditor.run_audit_now(page(SCENARIO)).await.unwrap();
        assert_eq!(first.broken_links().len(), 1);

        let second = auditor
            .run_audit_now(page("<html><head><title>Legal</title></head></html>"))
            .await
            .unwrap();
        assert!(second.broken_links().is_empty());
        assert_eq!(second.link_progress(), (0, 0));
        assert_eq!(second.metrics().page_title, "Legal");
    }

    #[tokio::test]
    async fn collapse_keeps_the_last_report() {
        let auditor = auditor(ScriptedProbe::default(), 0);
        auditor.run_audit_now(page(SCENARIO)).await.unwrap();

        auditor.collapse().await;

        assert_eq!(auditor.state().await, AuditorState::Idle);
        assert!(auditor.current_report().await.is_some());
        let again = auditor.run_audit_now(page(SCENARIO)).await.unwrap();
        assert_eq!(auditor.state().await, AuditorState::Displayed);
        assert_eq!(auditor.current_report().await, Some(again));
    }

    #[tokio::test]
    async fn report_generation_is_sent_to_analytics() {
        let auditor = auditor(ScriptedProbe::default(), 0);
        auditor.run_audit_now(page(SCENARIO)).await.unwrap();
        let events = auditor.sink.events();
        assert_eq!(
            events.last(),
            Some(&TelemetryEvent::labelled("Audit Report", "Generated"))
        );
    }

    #[tokio::test]
    async fn replaced_sweep_never_writes_into_the_new_report() {
        let probe = ScriptedProbe::default()
            .with("https://summitpixels.example/services", Behaviour::Hang)
            .with("https://summitpixels.example/portfolio", Behaviour::Status(404));
        let auditor = auditor(probe, 0);

        auditor.inspect_page(page(SCENARIO)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let contact = page(r#"<html><head><title>Contact</title></head>
            <body><a href="/contact">Contact</a></body></html>"#);
        auditor.inspect_page(contact).await.unwrap();
        auditor.wait_for_link_sweep().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = auditor.generate_report().await.unwrap();
        assert_eq!(report.metrics().page_title, "Contact");
        assert!(report.broken_links().is_empty());
        assert_eq!(report.link_progress(), (1, 1));
    }

    #[tokio::test]
    async fn earlier_shutdown_cancels_the_link_sweep() {
        let probe = ScriptedProbe::default()
            .with("https://summitpixels.example/services", Behaviour::Hang);
        let shutdown = ShutdownSignal::new();
        let auditor = auditor_with_shutdown(probe, 0, shutdown.clone());

        shutdown.trigger();
        let report = timeout(Duration::from_secs(1), auditor.run_audit_now(page(SCENARIO)))
            .await
            .expect("sweep kept running after shutdown")
            .unwrap();

        assert!(!report.is_link_sweep_complete());
        assert!(report
            .broken_links()
            .iter()
            .all(|record| record.failure != LinkFailure::Timeout));
        assert_eq!(auditor.state().await, AuditorState::Displayed);
    }

    #[tokio::test]
    async fn shutdown_cuts_the_settle_delay_short() {
        let shutdown = ShutdownSignal::new();
        let auditor = auditor_with_shutdown(ScriptedProbe::default(), 60_000, shutdown.clone());

        shutdown.trigger();
        let report = timeout(
            Duration::from_secs(1),
            auditor.run_on_page_ready(page(SCENARIO)),
        )
        .await
        .expect("settle delay ignored shutdown")
        .unwrap();

        assert_eq!(report.url(), HOME);
    }
}
