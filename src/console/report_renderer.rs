use crate::auditor::audit_report::AuditReport;
use crate::auditor::broken_link_record::LinkFailure;
use crate::auditor::score::{Check, CheckOutcome, ScoreLabel};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use serde::Serialize;
use std::io::Write;

fn score_color(score: u32) -> Color {
    if score >= 90 {
        Color::Green
    } else if score >= 70 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn outcome_color(passed: bool) -> Color {
    if passed { Color::Green } else { Color::Red }
}

fn check_detail(report: &AuditReport, outcome: &CheckOutcome) -> String {
    let metrics = report.metrics();
    match outcome.check {
        Check::TitleLength => {
            if metrics.page_title.is_empty() {
                "Not found".to_string()
            } else {
                format!("{} (Length: {} characters)", metrics.page_title, metrics.title_length())
            }
        }
        Check::DescriptionLength => {
            if metrics.meta_description.is_empty() {
                "Not found".to_string()
            } else {
                format!("Length: {} characters", metrics.description_length())
            }
        }
        Check::HeadingCount => format!(
            "{} ({})",
            metrics.h1_tags,
            if outcome.passed { "Optimal" } else { "Needs attention" }
        ),
        Check::ImageAltText => {
            if outcome.passed {
                "All images have alt text".to_string()
            } else {
                format!("{} (Add alt text)", metrics.images_without_alt)
            }
        }
        Check::CanonicalUrl => {
            if metrics.has_canonical() {
                format!("Present ({})", metrics.canonical_url)
            } else {
                "Missing".to_string()
            }
        }
        Check::StructuredData => {
            if !metrics.structured_data {
                "Missing".to_string()
            } else if metrics.invalid_structured_data_blocks > 0 {
                format!(
                    "Present ({} of {} blocks invalid)",
                    metrics.invalid_structured_data_blocks, metrics.structured_data_blocks
                )
            } else {
                "Present".to_string()
            }
        }
        Check::MobileViewport => {
            let answer = if metrics.mobile_friendly { "Yes" } else { "No" };
            answer.to_string()
        }
        Check::PageLoadTime => match metrics.page_load_time_ms {
            Some(ms) => format!("{}ms", ms),
            None => "Not measured".to_string(),
        },
        Check::BrokenLinks => format!("{}", report.broken_links().len()),
    }
}

fn failure_text(failure: LinkFailure, status: u16) -> String {
    match failure {
        LinkFailure::HttpStatus => format!("Status: {}", status),
        LinkFailure::Network => "Network error".to_string(),
        LinkFailure::Timeout => "Timed out".to_string(),
        LinkFailure::InvalidUrl => "Invalid URL".to_string(),
    }
}

/// Writes the report panel: score, one line per check, broken links, flagged
/// issues and recommendations.
pub fn render_report<W: Write>(report: &AuditReport, out: &mut W) -> std::io::Result<()> {
    let quality = report.quality();

    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print("SEO Audit Report\n"),
        SetAttribute(Attribute::Reset),
        Print(format!("{}\n", report.url())),
        Print(format!("Generated {}\n\n", report.timestamp())),
        Print("Score: "),
        SetForegroundColor(score_color(quality.score)),
        SetAttribute(Attribute::Bold),
        Print(format!("{} ({})", quality.score, quality.label)),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print("\n\n"),
    )?;

    for outcome in &quality.outcomes {
        let marker = if outcome.passed { "PASS" } else { "FAIL" };
        queue!(
            out,
            SetForegroundColor(outcome_color(outcome.passed)),
            Print(format!("  [{}] ", marker)),
            ResetColor,
            Print(format!("{:<20} {}", outcome.check.name(), check_detail(report, outcome))),
        )?;
        if outcome.penalty > 0 {
            queue!(out, Print(format!("  (-{})", outcome.penalty)))?;
        }
        queue!(out, Print("\n"))?;
    }

    let (checked, total) = report.link_progress();
    if !report.is_link_sweep_complete() {
        queue!(
            out,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "\n  Link check still running: {} of {} links checked\n",
                checked, total
            )),
            ResetColor,
        )?;
    }

    if !report.broken_links().is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::Red),
            Print(format!("\nBroken Links ({})\n", report.broken_links().len())),
            ResetColor,
        )?;
        for link in report.broken_links() {
            queue!(
                out,
                Print(format!(
                    "  {} ({})\n",
                    link.url,
                    failure_text(link.failure, link.status)
                ))
            )?;
        }
    }

    if !report.issues().is_empty() {
        queue!(out, Print("\nIssues\n"))?;
        for issue in report.issues() {
            queue!(out, Print(format!("  - {}\n", issue)))?;
        }
    }

    let recommendations: Vec<&str> = quality
        .failed_checks()
        .map(|outcome| outcome.check.recommendation())
        .collect();
    if !recommendations.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::Blue),
            Print("\nSEO Recommendations\n"),
            ResetColor,
        )?;
        for recommendation in recommendations {
            queue!(out, Print(format!("  * {}\n", recommendation)))?;
        }
    }

    out.flush()
}

#[derive(Serialize)]
struct ScoredReport<'a> {
    #[serde(flatten)]
    report: &'a AuditReport,
    score: u32,
    label: ScoreLabel,
}

/// Report plus its score, for headless use.
pub fn render_json(report: &AuditReport) -> serde_json::Result<String> {
    let quality = report.quality();
    serde_json::to_string_pretty(&ScoredReport {
        report,
        score: quality.score,
        label: quality.label,
    })
}
