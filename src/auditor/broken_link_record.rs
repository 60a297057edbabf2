use serde::{Deserialize, Serialize};

/// Status recorded when no HTTP response was received at all.
pub const NO_RESPONSE_STATUS: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkFailure {
    HttpStatus,
    Network,
    Timeout,
    InvalidUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkRecord {
    pub url: String,
    pub status: u16,
    pub source: String,
    pub failure: LinkFailure,
}

impl BrokenLinkRecord {
    pub fn from_status_code(url: String, status: u16, source: String) -> Self {
        Self {
            url,
            status,
            source,
            failure: LinkFailure::HttpStatus,
        }
    }

    pub fn without_response(url: String, source: String, failure: LinkFailure) -> Self {
        Self {
            url,
            status: NO_RESPONSE_STATUS,
            source,
            failure,
        }
    }
}
