use crate::auditor::PageAuditor;
use crate::auditor::analytics_sink::{AnalyticsSink, JsonLinesAnalyticsSink, LogAnalyticsSink};
use crate::auditor::audit_config::AuditConfig;
use crate::auditor::links::HeadRequestProbe;
use crate::auditor::page::{PageFetcher, PageSource};
use crate::auditor::shutdown_signal::ShutdownSignal;
use crate::console::interactive_session::InteractiveSession;
use crate::console::report_renderer::{render_json, render_report};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tokio::select;
use url::Url;

mod auditor;
mod console;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// URL of the page to audit
    #[arg(value_name = "URL")]
    url: String,

    /// Audit markup from a local file, served as if at URL
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of the console panel
    #[arg(long)]
    json: bool,

    /// Keep the session open to re-run, show or collapse the report
    #[arg(long, conflicts_with = "json")]
    interactive: bool,

    /// Take the report after the settle delay instead of waiting for every link
    #[arg(long)]
    settle: bool,

    /// Wait after the page is ready before taking the report (ms)
    #[arg(long)]
    settle_delay_ms: Option<u64>,

    /// Maximum number of link probes in flight
    #[arg(long)]
    max_concurrent_probes: Option<usize>,

    /// Per-link probe timeout (ms)
    #[arg(long)]
    probe_timeout_ms: Option<u64>,

    /// Keyword the title, description and headings should mention
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Append telemetry events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,
}

fn load_config(args: &CommandLineArgs) -> anyhow::Result<AuditConfig> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    if let Some(settle_delay_ms) = args.settle_delay_ms {
        config.set_settle_delay_ms(settle_delay_ms);
    }
    if let Some(max_concurrent_probes) = args.max_concurrent_probes {
        config.set_max_concurrent_probes(max_concurrent_probes);
    }
    if let Some(probe_timeout_ms) = args.probe_timeout_ms {
        config.set_probe_timeout_ms(probe_timeout_ms);
    }
    config.add_expected_keywords(&args.keywords);
    Ok(config)
}

async fn audit_with_sink<S: AnalyticsSink>(
    args: &CommandLineArgs,
    config: AuditConfig,
    sink: S,
    shutdown: ShutdownSignal,
) -> anyhow::Result<()> {
    let url = Url::parse(&args.url)?;
    let page_source = match &args.file {
        Some(path) => PageSource::LocalFile {
            path: path.clone(),
            url,
        },
        None => PageSource::Remote {
            fetcher: PageFetcher::new(&config)?,
            url,
        },
    };
    let probe = HeadRequestProbe::new(&config)?;
    let auditor = PageAuditor::new(config, probe, sink, shutdown.clone());
    log::debug!("Auditor configuration: {:?}", auditor.config());

    if args.interactive {
        let mut session = InteractiveSession::new(&auditor, &page_source);
        return session.run(shutdown).await;
    }

    let page = select! {
        page = page_source.load() => page?,
        _ = shutdown.triggered() => {
            log::info!("Shutdown requested while loading {}", page_source.url());
            return Ok(());
        }
    };
    let report = if args.settle {
        auditor.run_on_page_ready(page).await?
    } else {
        auditor.run_audit_now(page).await?
    };

    if args.json {
        println!("{}", render_json(&report)?);
    } else {
        render_report(&report, &mut std::io::stdout())?;
    }
    Ok(())
}

async fn main_impl(args: &CommandLineArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;

    // Set up a shutdown signal handler
    let shutdown = ShutdownSignal::new();
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, shutting down...");
            shutdown.trigger();
        })?;
    }

    match &args.events {
        Some(path) => {
            let sink = JsonLinesAnalyticsSink::create(path)?;
            audit_with_sink(args, config, sink, shutdown).await
        }
        None => audit_with_sink(args, config, LogAnalyticsSink::new(), shutdown).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = CommandLineArgs::parse();

    if let Err(e) = main_impl(&args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_defaults() {
        let args = CommandLineArgs::parse_from([
            "pixel-audit",
            "https://summitpixels.example/",
            "--settle-delay-ms",
            "0",
            "--max-concurrent-probes",
            "3",
            "--keyword",
            "design",
            "--keyword",
            "agency",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.settle_delay(), tokio::time::Duration::ZERO);
        assert_eq!(config.max_concurrent_probes(), 3);
        assert_eq!(config.probe_timeout(), tokio::time::Duration::from_millis(10_000));
        assert_eq!(config.expected_keywords(), &["design".to_string(), "agency".to_string()]);
    }

    #[test]
    fn interactive_and_json_are_exclusive() {
        let result = CommandLineArgs::try_parse_from([
            "pixel-audit",
            "https://summitpixels.example/",
            "--json",
            "--interactive",
        ]);
        assert!(result.is_err());
    }
}
