use crate::auditor::audit_error::AuditError;
use crate::auditor::page::{FetchedPage, PageFetcher};
use std::path::PathBuf;
use url::Url;

/// Where the audited markup comes from. A local file is audited as if it
/// were served at `url`, which is also the base for relative links.
pub enum PageSource {
    Remote { fetcher: PageFetcher, url: Url },
    LocalFile { path: PathBuf, url: Url },
}

impl PageSource {
    pub fn url(&self) -> &Url {
        match self {
            PageSource::Remote { url, .. } => url,
            PageSource::LocalFile { url, .. } => url,
        }
    }

    pub async fn load(&self) -> Result<FetchedPage, AuditError> {
        match self {
            PageSource::Remote { fetcher, url } => fetcher.fetch(url).await,
            PageSource::LocalFile { path, url } => {
                let html = tokio::fs::read_to_string(path).await?;
                log::info!("Read {} ({} bytes) as {}", path.display(), html.len(), url);
                Ok(FetchedPage::from_html(url.clone(), html))
            }
        }
    }
}
