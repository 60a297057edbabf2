use crate::auditor::page_metrics::PageMetrics;
use crate::auditor::score::ScoreLabel;
use serde::Serialize;
use std::ops::RangeInclusive;

pub const MAX_SCORE: u32 = 100;
pub const TITLE_LENGTH_RANGE: RangeInclusive<usize> = 50..=60;
pub const DESCRIPTION_LENGTH_RANGE: RangeInclusive<usize> = 150..=160;
pub const SLOW_LOAD_MS: u64 = 3000;
pub const SLOW_FIRST_BYTE_MS: u64 = 800;

const TITLE_PENALTY: u32 = 15;
const DESCRIPTION_PENALTY: u32 = 15;
const FLAT_PENALTY: u32 = 10;
const PER_ITEM_PENALTY: u32 = 2;
const MAX_ITEM_PENALTY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Check {
    TitleLength,
    DescriptionLength,
    HeadingCount,
    ImageAltText,
    CanonicalUrl,
    StructuredData,
    MobileViewport,
    PageLoadTime,
    BrokenLinks,
}

impl Check {
    pub fn name(&self) -> &'static str {
        match self {
            Check::TitleLength => "Page Title",
            Check::DescriptionLength => "Meta Description",
            Check::HeadingCount => "H1 Tags",
            Check::ImageAltText => "Images Without Alt",
            Check::CanonicalUrl => "Canonical URL",
            Check::StructuredData => "Structured Data",
            Check::MobileViewport => "Mobile Friendly",
            Check::PageLoadTime => "Page Load Time",
            Check::BrokenLinks => "Broken Links",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Check::TitleLength => "Optimize page title length (50-60 characters recommended)",
            Check::DescriptionLength => {
                "Optimize meta description length (150-160 characters recommended)"
            }
            Check::HeadingCount => "Ensure exactly one H1 tag per page",
            Check::ImageAltText => "Add alt text to all images",
            Check::CanonicalUrl => "Add canonical URL to prevent duplicate content issues",
            Check::StructuredData => "Add structured data markup for better search visibility",
            Check::MobileViewport => "Ensure mobile-friendly design",
            Check::PageLoadTime => "Improve page load speed (aim for under 3 seconds)",
            Check::BrokenLinks => "Fix broken links to improve user experience",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub check: Check,
    pub passed: bool,
    pub penalty: u32,
}

impl CheckOutcome {
    fn pass(check: Check) -> Self {
        Self {
            check,
            passed: true,
            penalty: 0,
        }
    }

    fn judge(check: Check, passed: bool, penalty: u32) -> Self {
        if passed {
            CheckOutcome::pass(check)
        } else {
            Self {
                check,
                passed: false,
                penalty,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityScore {
    pub score: u32,
    pub label: ScoreLabel,
    pub outcomes: Vec<CheckOutcome>,
}

impl QualityScore {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }
}

/// `min(10, 2n)`, used for every per-item check
pub fn per_item_penalty(count: usize) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(PER_ITEM_PENALTY).min(MAX_ITEM_PENALTY)
}

pub fn evaluate_checks(metrics: &PageMetrics, broken_link_count: usize) -> Vec<CheckOutcome> {
    vec![
        CheckOutcome::judge(
            Check::TitleLength,
            TITLE_LENGTH_RANGE.contains(&metrics.title_length()),
            TITLE_PENALTY,
        ),
        CheckOutcome::judge(
            Check::DescriptionLength,
            DESCRIPTION_LENGTH_RANGE.contains(&metrics.description_length()),
            DESCRIPTION_PENALTY,
        ),
        CheckOutcome::judge(Check::HeadingCount, metrics.h1_tags == 1, FLAT_PENALTY),
        CheckOutcome::judge(
            Check::ImageAltText,
            metrics.images_without_alt == 0,
            per_item_penalty(metrics.images_without_alt),
        ),
        CheckOutcome::judge(Check::CanonicalUrl, metrics.has_canonical(), FLAT_PENALTY),
        CheckOutcome::judge(Check::StructuredData, metrics.structured_data, FLAT_PENALTY),
        CheckOutcome::judge(Check::MobileViewport, metrics.mobile_friendly, FLAT_PENALTY),
        // an unmeasured load time is not penalised
        CheckOutcome::judge(
            Check::PageLoadTime,
            metrics.page_load_time_ms.is_none_or(|ms| ms <= SLOW_LOAD_MS),
            FLAT_PENALTY,
        ),
        CheckOutcome::judge(
            Check::BrokenLinks,
            broken_link_count == 0,
            per_item_penalty(broken_link_count),
        ),
    ]
}

/// Scores a metrics snapshot. Pure: the same inputs always give the same
/// score.
pub fn score_metrics(metrics: &PageMetrics, broken_link_count: usize) -> QualityScore {
    let outcomes = evaluate_checks(metrics, broken_link_count);
    let total_penalty: u32 = outcomes.iter().map(|outcome| outcome.penalty).sum();
    let score = MAX_SCORE.saturating_sub(total_penalty);
    QualityScore {
        score,
        label: ScoreLabel::from_score(score),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perfect_metrics() -> PageMetrics {
        PageMetrics {
            page_title: "a".repeat(55),
            meta_description: "b".repeat(155),
            h1_tags: 1,
            images_without_alt: 0,
            canonical_url: "https://summitpixels.example/".to_string(),
            structured_data: true,
            structured_data_blocks: 1,
            invalid_structured_data_blocks: 0,
            mobile_friendly: true,
            page_load_time_ms: Some(900),
            time_to_first_byte_ms: Some(100),
        }
    }

    fn penalty_for(quality: &QualityScore, check: Check) -> u32 {
        quality
            .outcomes
            .iter()
            .find(|outcome| outcome.check == check)
            .map(|outcome| outcome.penalty)
            .unwrap()
    }

    #[test]
    fn perfect_page_scores_100() {
        let quality = score_metrics(&perfect_metrics(), 0);
        assert_eq!(quality.score, 100);
        assert_eq!(quality.label, ScoreLabel::Excellent);
        assert_eq!(quality.failed_checks().count(), 0);
    }

    #[test]
    fn title_penalty_applies_only_outside_range() {
        for (length, expected) in [(0, 15), (49, 15), (50, 0), (55, 0), (60, 0), (61, 15), (200, 15)] {
            let metrics = PageMetrics {
                page_title: "t".repeat(length),
                ..perfect_metrics()
            };
            let quality = score_metrics(&metrics, 0);
            assert_eq!(penalty_for(&quality, Check::TitleLength), expected, "length {}", length);
            assert_eq!(quality.score, 100 - expected);
        }
    }

    #[test]
    fn description_penalty_applies_only_outside_range() {
        for (length, expected) in [(0, 15), (149, 15), (150, 0), (160, 0), (161, 15)] {
            let metrics = PageMetrics {
                meta_description: "d".repeat(length),
                ..perfect_metrics()
            };
            let quality = score_metrics(&metrics, 0);
            assert_eq!(penalty_for(&quality, Check::DescriptionLength), expected);
        }
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let metrics = PageMetrics {
            page_title: "é".repeat(50),
            ..perfect_metrics()
        };
        assert_eq!(penalty_for(&score_metrics(&metrics, 0), Check::TitleLength), 0);
    }

    #[test]
    fn per_item_penalty_caps_at_ten() {
        assert_eq!(per_item_penalty(0), 0);
        assert_eq!(per_item_penalty(1), 2);
        assert_eq!(per_item_penalty(3), 6);
        assert_eq!(per_item_penalty(5), 10);
        assert_eq!(per_item_penalty(10), 10);
        assert_eq!(per_item_penalty(100), 10);
        assert_eq!(per_item_penalty(usize::MAX), 10);
    }

    #[test]
    fn image_and_link_penalties_follow_item_count() {
        for n in [0usize, 1, 3, 10, 100] {
            let metrics = PageMetrics {
                images_without_alt: n,
                ..perfect_metrics()
            };
            let quality = score_metrics(&metrics, n);
            assert_eq!(penalty_for(&quality, Check::ImageAltText), per_item_penalty(n));
            assert_eq!(penalty_for(&quality, Check::BrokenLinks), per_item_penalty(n));
        }
    }

    #[test]
    fn zero_headings_costs_ten() {
        let metrics = PageMetrics {
            h1_tags: 0,
            ..perfect_metrics()
        };
        let quality = score_metrics(&metrics, 0);
        assert_eq!(penalty_for(&quality, Check::HeadingCount), 10);
        assert_eq!(quality.score, 90);
    }

    #[test]
    fn load_time_penalty_needs_a_slow_measurement() {
        let slow = PageMetrics {
            page_load_time_ms: Some(3001),
            ..perfect_metrics()
        };
        let boundary = PageMetrics {
            page_load_time_ms: Some(3000),
            ..perfect_metrics()
        };
        let unmeasured = PageMetrics {
            page_load_time_ms: None,
            ..perfect_metrics()
        };
        assert_eq!(score_metrics(&slow, 0).score, 90);
        assert_eq!(score_metrics(&boundary, 0).score, 100);
        assert_eq!(score_metrics(&unmeasured, 0).score, 100);
    }

    #[test]
    fn summit_pixels_scenario_is_good() {
        let metrics = PageMetrics {
            page_title: "SummitPixels".to_string(),
            meta_description: String::new(),
            h1_tags: 1,
            images_without_alt: 0,
            canonical_url: "https://summitpixels.example/".to_string(),
            structured_data: true,
            structured_data_blocks: 1,
            invalid_structured_data_blocks: 0,
            mobile_friendly: true,
            page_load_time_ms: Some(1200),
            time_to_first_byte_ms: None,
        };
        let quality = score_metrics(&metrics, 0);
        assert_eq!(quality.score, 70);
        assert_eq!(quality.label, ScoreLabel::Good);
        let failed: Vec<Check> = quality.failed_checks().map(|o| o.check).collect();
        assert_eq!(failed, vec![Check::TitleLength, Check::DescriptionLength]);
    }

    #[test]
    fn everything_failing_floors_at_zero() {
        let metrics = PageMetrics {
            page_title: String::new(),
            meta_description: String::new(),
            h1_tags: 7,
            images_without_alt: 40,
            canonical_url: String::new(),
            structured_data: false,
            structured_data_blocks: 0,
            invalid_structured_data_blocks: 0,
            mobile_friendly: false,
            page_load_time_ms: Some(60_000),
            time_to_first_byte_ms: None,
        };
        let quality = score_metrics(&metrics, 25);
        assert_eq!(quality.outcomes.iter().map(|o| o.penalty).sum::<u32>(), 100);
        assert_eq!(quality.score, 0);
        assert_eq!(quality.label, ScoreLabel::Poor);
    }

    #[test]
    fn labels_follow_thresholds() {
        assert_eq!(ScoreLabel::from_score(100), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(90), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(89), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(70), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(69), ScoreLabel::NeedsImprovement);
        assert_eq!(ScoreLabel::from_score(50), ScoreLabel::NeedsImprovement);
        assert_eq!(ScoreLabel::from_score(49), ScoreLabel::Poor);
        assert_eq!(ScoreLabel::from_score(0), ScoreLabel::Poor);
    }
}
