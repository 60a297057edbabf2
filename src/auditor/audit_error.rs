#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("HTTP Error Status Code = {0}")]
    HttpError(u16),

    #[error("Not an HTML document: {0}")]
    NonHtmlContent(String),

    #[error("No page has been inspected yet, report unavailable")]
    ReportUnavailable,

    #[error("Invalid selector: {0}")]
    SelectorError(String),

    #[error(transparent)]
    AnyError(#[from] anyhow::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    MimeParseError(#[from] mime::FromStrError),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
