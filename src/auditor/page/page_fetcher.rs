use crate::auditor::audit_config::AuditConfig;
use crate::auditor::audit_error::AuditError;
use crate::auditor::page::FetchedPage;
use std::time::Instant;
use url::Url;

pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.fetch_timeout())
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, AuditError> {
        let navigation_start = Instant::now();

        let response = self.client.get(url.clone()).send().await?;
        let time_to_first_byte_ms = navigation_start.elapsed().as_millis() as u64;
        if !response.status().is_success() {
            return Err(AuditError::HttpError(response.status().as_u16()));
        }
        let status_code = response.status().as_u16();

        let content_type_str = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let content_type: mime::Mime = content_type_str.parse()?;
        if !is_html(&content_type) {
            return Err(AuditError::NonHtmlContent(content_type.to_string()));
        }

        let html = response.text().await?;
        let load_time_ms = navigation_start.elapsed().as_millis() as u64;

        log::info!(
            "Fetched {} ({}, {} bytes) in {}ms",
            url,
            status_code,
            html.len(),
            load_time_ms
        );

        Ok(FetchedPage {
            url: url.clone(),
            status_code,
            content_type: content_type_str,
            html,
            load_time_ms: Some(load_time_ms),
            time_to_first_byte_ms: Some(time_to_first_byte_ms),
        })
    }
}

fn is_html(content_type: &mime::Mime) -> bool {
    matches!(
        (content_type.type_(), content_type.subtype()),
        (mime::TEXT, mime::HTML)
    ) || content_type.essence_str() == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_content_types_are_accepted() {
        let html: mime::Mime = "text/html; charset=utf-8".parse().unwrap();
        let xhtml: mime::Mime = "application/xhtml+xml".parse().unwrap();
        let json: mime::Mime = "application/json".parse().unwrap();
        assert!(is_html(&html));
        assert!(is_html(&xhtml));
        assert!(!is_html(&json));
    }
}
