use serde::{Deserialize, Serialize};
use std::fmt;

/// One condition flagged while inspecting a document. Missing and malformed
/// signals are kept as separate variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditIssue {
    TitleLengthNotOptimal { length: usize },
    TitleMissingKeywords { missing: Vec<String> },
    DescriptionMissing,
    DescriptionLengthNotOptimal { length: usize },
    DescriptionMissingKeywords { missing: Vec<String> },
    HeadingCountNotOptimal { count: usize },
    HeadingMissingKeywords { index: usize },
    ImagesMissingAlt { count: usize },
    CanonicalMissing,
    CanonicalInvalid { href: String },
    StructuredDataMissing,
    StructuredDataInvalid { index: usize },
    ViewportMissing,
    SlowLoad { millis: u64 },
    SlowFirstByte { millis: u64 },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::TitleLengthNotOptimal { length } => {
                write!(f, "Title length is not optimal: {} characters", length)
            }
            AuditIssue::TitleMissingKeywords { missing } => {
                write!(f, "Title may not contain primary keywords: {}", missing.join(", "))
            }
            AuditIssue::DescriptionMissing => write!(f, "No meta description found"),
            AuditIssue::DescriptionLengthNotOptimal { length } => {
                write!(f, "Meta description length is not optimal: {} characters", length)
            }
            AuditIssue::DescriptionMissingKeywords { missing } => write!(
                f,
                "Meta description may not contain primary keywords: {}",
                missing.join(", ")
            ),
            AuditIssue::HeadingCountNotOptimal { count } => {
                write!(f, "Number of H1 tags is not optimal: {} found", count)
            }
            AuditIssue::HeadingMissingKeywords { index } => {
                write!(f, "H1 tag {} may not contain primary keywords", index + 1)
            }
            AuditIssue::ImagesMissingAlt { count } => {
                write!(f, "{} images found without alt text", count)
            }
            AuditIssue::CanonicalMissing => write!(f, "No canonical URL found"),
            AuditIssue::CanonicalInvalid { href } => {
                write!(f, "Canonical URL is not valid: {}", href)
            }
            AuditIssue::StructuredDataMissing => write!(f, "No structured data found"),
            AuditIssue::StructuredDataInvalid { index } => {
                write!(f, "Structured data script {} is not valid JSON", index + 1)
            }
            AuditIssue::ViewportMissing => write!(
                f,
                "No viewport meta tag found - page may not be mobile friendly"
            ),
            AuditIssue::SlowLoad { millis } => write!(f, "Page load time is slow: {}ms", millis),
            AuditIssue::SlowFirstByte { millis } => {
                write!(f, "Time to first byte is slow: {}ms", millis)
            }
        }
    }
}
