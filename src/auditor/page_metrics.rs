use serde::{Deserialize, Serialize};

/// Snapshot of the page-level signals one inspection pass reads out of a
/// document. Built once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub page_title: String,

    /// Empty when the description meta tag is absent or blank
    pub meta_description: String,

    pub h1_tags: usize,
    pub images_without_alt: usize,

    /// Empty when the page declares no canonical link
    pub canonical_url: String,

    pub structured_data: bool,
    pub structured_data_blocks: usize,
    pub invalid_structured_data_blocks: usize,

    pub mobile_friendly: bool,

    /// Request start to fully read body. `None` when the page was not fetched.
    pub page_load_time_ms: Option<u64>,

    /// Request start to response headers
    pub time_to_first_byte_ms: Option<u64>,
}

impl PageMetrics {
    pub fn title_length(&self) -> usize {
        self.page_title.chars().count()
    }

    pub fn description_length(&self) -> usize {
        self.meta_description.chars().count()
    }

    pub fn has_canonical(&self) -> bool {
        !self.canonical_url.is_empty()
    }
}
