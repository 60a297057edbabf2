use crate::auditor::analytics_sink::{AnalyticsSink, TelemetryEvent};
use crate::auditor::audit_error::AuditError;
use crate::auditor::audit_issue::AuditIssue;
use crate::auditor::inspect::Inspection;
use crate::auditor::page::FetchedPage;
use crate::auditor::page_metrics::PageMetrics;
use crate::auditor::score::{
    DESCRIPTION_LENGTH_RANGE, SLOW_FIRST_BYTE_MS, SLOW_LOAD_MS, TITLE_LENGTH_RANGE,
};
use scraper::{Html, Selector};
use url::Url;

fn selector(css: &str) -> Result<Selector, AuditError> {
    Selector::parse(css).map_err(|e| AuditError::SelectorError(format!("{}: {}", css, e)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn missing_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let text = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| !text.contains(&keyword.to_lowercase()))
        .cloned()
        .collect()
}

/// Reads the quality signals out of one parsed document. Every check reports
/// to the analytics sink and records an [`AuditIssue`] when it fails.
pub struct DomInspector<'a, S>
where
    S: AnalyticsSink,
{
    sink: &'a S,
    expected_keywords: &'a [String],
    issues: Vec<AuditIssue>,
}

impl<'a, S> DomInspector<'a, S>
where
    S: AnalyticsSink,
{
    pub fn new(sink: &'a S, expected_keywords: &'a [String]) -> Self {
        Self {
            sink,
            expected_keywords,
            issues: Vec::new(),
        }
    }

    pub fn inspect(mut self, page: &FetchedPage) -> Result<Inspection, AuditError> {
        let document = Html::parse_document(&page.html);

        let mut metrics = PageMetrics {
            page_title: self.check_page_title(&document)?,
            meta_description: self.check_meta_description(&document)?,
            h1_tags: self.check_h1_tags(&document)?,
            images_without_alt: self.check_images_alt(&document)?,
            canonical_url: self.check_canonical_url(&document)?,
            mobile_friendly: self.check_mobile_friendly(&document)?,
            ..PageMetrics::default()
        };

        let (blocks, invalid_blocks) = self.check_structured_data(&document)?;
        metrics.structured_data = blocks > 0;
        metrics.structured_data_blocks = blocks;
        metrics.invalid_structured_data_blocks = invalid_blocks;

        metrics.page_load_time_ms = page.load_time_ms;
        metrics.time_to_first_byte_ms = page.time_to_first_byte_ms;
        self.check_timings(&metrics);

        let link_hrefs = collect_link_hrefs(&document)?;

        Ok(Inspection {
            page_url: page.url.clone(),
            metrics,
            issues: self.issues,
            link_hrefs,
        })
    }

    fn flag(&mut self, issue: AuditIssue, action: &str, label: &str) {
        log::warn!("{}", issue);
        self.sink.log_event(TelemetryEvent::labelled(action, label));
        self.issues.push(issue);
    }

    fn check_page_title(&mut self, document: &Html) -> Result<String, AuditError> {
        let title_selector = selector("title")?;
        let title = document
            .select(&title_selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .unwrap_or_default();
        let length = title.chars().count();

        self.sink
            .log_event(TelemetryEvent::valued("Title Length", length as u64));

        if !TITLE_LENGTH_RANGE.contains(&length) {
            self.flag(
                AuditIssue::TitleLengthNotOptimal { length },
                "Title Issue",
                "Length not optimal",
            );
        }

        let missing = missing_keywords(&title, self.expected_keywords);
        if !missing.is_empty() {
            self.flag(
                AuditIssue::TitleMissingKeywords { missing },
                "Title Issue",
                "Missing keywords",
            );
        }
        Ok(title)
    }

    fn check_meta_description(&mut self, document: &Html) -> Result<String, AuditError> {
        let description_selector = selector(r#"meta[name="description"]"#)?;
        let description = document
            .select(&description_selector)
            .next()
            .and_then(|element| element.value().attr("content"))
            .unwrap_or_default()
            .to_string();

        if description.is_empty() {
            log::error!("No meta description found");
            self.sink.log_event(TelemetryEvent::labelled(
                "Description Issue",
                "Missing description",
            ));
            self.issues.push(AuditIssue::DescriptionMissing);
            return Ok(description);
        }

        let length = description.chars().count();
        self.sink
            .log_event(TelemetryEvent::valued("Description Length", length as u64));

        if !DESCRIPTION_LENGTH_RANGE.contains(&length) {
            self.flag(
                AuditIssue::DescriptionLengthNotOptimal { length },
                "Description Issue",
                "Length not optimal",
            );
        }

        let missing = missing_keywords(&description, self.expected_keywords);
        if !missing.is_empty() {
            self.flag(
                AuditIssue::DescriptionMissingKeywords { missing },
                "Description Issue",
                "Missing keywords",
            );
        }
        Ok(description)
    }

    fn check_h1_tags(&mut self, document: &Html) -> Result<usize, AuditError> {
        let h1_selector = selector("h1")?;
        let headings: Vec<String> = document
            .select(&h1_selector)
            .map(|element| element.text().collect::<String>())
            .collect();
        let count = headings.len();

        self.sink
            .log_event(TelemetryEvent::valued("H1 Tags Count", count as u64));

        if count != 1 {
            self.flag(
                AuditIssue::HeadingCountNotOptimal { count },
                "H1 Issue",
                "Multiple or missing H1 tags",
            );
        }

        // a heading passes when it mentions any one of the keywords
        if !self.expected_keywords.is_empty() {
            for (index, text) in headings.iter().enumerate() {
                let missing = missing_keywords(text, self.expected_keywords);
                if missing.len() == self.expected_keywords.len() {
                    self.flag(
                        AuditIssue::HeadingMissingKeywords { index },
                        "H1 Issue",
                        "Missing keywords in H1",
                    );
                }
            }
        }
        Ok(count)
    }

    fn check_images_alt(&mut self, document: &Html) -> Result<usize, AuditError> {
        let img_selector = selector("img")?;
        let sources_without_alt: Vec<&str> = document
            .select(&img_selector)
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .is_none_or(|alt| alt.trim().is_empty())
            })
            .map(|img| img.value().attr("src").unwrap_or(""))
            .collect();
        let count = sources_without_alt.len();

        self.sink
            .log_event(TelemetryEvent::valued("Images Without Alt", count as u64));

        if count > 0 {
            self.flag(
                AuditIssue::ImagesMissingAlt { count },
                "Image Issue",
                "Missing alt text",
            );
            for (index, src) in sources_without_alt.iter().enumerate() {
                log::warn!("Image {} missing alt: {}", index + 1, src);
            }
        }
        Ok(count)
    }

    fn check_canonical_url(&mut self, document: &Html) -> Result<String, AuditError> {
        let canonical_selector = selector(r#"link[rel="canonical"]"#)?;
        let canonical = document
            .select(&canonical_selector)
            .next()
            .and_then(|element| element.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        if canonical.is_empty() {
            self.flag(
                AuditIssue::CanonicalMissing,
                "Canonical Issue",
                "Missing canonical",
            );
            return Ok(canonical);
        }

        self.sink
            .log_event(TelemetryEvent::labelled("Canonical URL Present", "Yes"));
        match Url::parse(&canonical) {
            Ok(_) => {
                self.sink
                    .log_event(TelemetryEvent::labelled("Canonical URL Valid", "Yes"));
            }
            Err(_) => {
                self.flag(
                    AuditIssue::CanonicalInvalid {
                        href: canonical.clone(),
                    },
                    "Canonical Issue",
                    "Invalid URL",
                );
            }
        }
        Ok(canonical)
    }

    /// Returns (block count, invalid block count).
    fn check_structured_data(&mut self, document: &Html) -> Result<(usize, usize), AuditError> {
        let script_selector = selector(r#"script[type="application/ld+json"]"#)?;
        let blocks: Vec<String> = document
            .select(&script_selector)
            .map(|script| script.text().collect::<String>())
            .collect();

        self.sink.log_event(TelemetryEvent::labelled(
            "Structured Data",
            if blocks.is_empty() { "Missing" } else { "Present" },
        ));

        if blocks.is_empty() {
            self.flag(
                AuditIssue::StructuredDataMissing,
                "Structured Data Issue",
                "Missing structured data",
            );
            return Ok((0, 0));
        }

        let mut invalid_blocks = 0;
        for (index, block) in blocks.iter().enumerate() {
            match serde_json::from_str::<serde_json::Value>(block) {
                Ok(_) => {
                    self.sink.log_event(TelemetryEvent::labelled(
                        "Structured Data Valid",
                        &format!("Script {}", index + 1),
                    ));
                }
                Err(_) => {
                    invalid_blocks += 1;
                    self.flag(
                        AuditIssue::StructuredDataInvalid { index },
                        "Structured Data Issue",
                        "Invalid JSON",
                    );
                }
            }
        }
        Ok((blocks.len(), invalid_blocks))
    }

    fn check_mobile_friendly(&mut self, document: &Html) -> Result<bool, AuditError> {
        let viewport_selector = selector(r#"meta[name="viewport"]"#)?;
        let mobile_friendly = document.select(&viewport_selector).next().is_some();

        self.sink.log_event(TelemetryEvent::labelled(
            "Mobile Friendly",
            if mobile_friendly { "Yes" } else { "No" },
        ));

        if !mobile_friendly {
            self.flag(
                AuditIssue::ViewportMissing,
                "Mobile Issue",
                "Missing viewport",
            );
        }
        Ok(mobile_friendly)
    }

    fn check_timings(&mut self, metrics: &PageMetrics) {
        if let Some(load_time) = metrics.page_load_time_ms {
            self.sink
                .log_event(TelemetryEvent::valued("Page Load Time", load_time));
            if load_time > SLOW_LOAD_MS {
                self.flag(
                    AuditIssue::SlowLoad { millis: load_time },
                    "Performance Issue",
                    "Slow load time",
                );
            }
        }

        if let Some(ttfb) = metrics.time_to_first_byte_ms {
            self.sink
                .log_event(TelemetryEvent::valued("Time To First Byte", ttfb));
            if ttfb > SLOW_FIRST_BYTE_MS {
                self.flag(
                    AuditIssue::SlowFirstByte { millis: ttfb },
                    "Performance Issue",
                    "Slow first byte",
                );
            }
        }
    }
}

fn collect_link_hrefs(document: &Html) -> Result<Vec<String>, AuditError> {
    let link_selector = selector("a[href]")?;
    Ok(document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect())
}
