use url::Url;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status_code: u16,
    pub content_type: String,
    pub html: String,
    pub load_time_ms: Option<u64>,
    pub time_to_first_byte_ms: Option<u64>,
}

impl FetchedPage {
    /// A page whose markup came from somewhere other than a live fetch, so no
    /// timings are known.
    pub fn from_html(url: Url, html: String) -> Self {
        Self {
            url,
            status_code: 200,
            content_type: mime::TEXT_HTML.to_string(),
            html,
            load_time_ms: None,
            time_to_first_byte_ms: None,
        }
    }
}
