use crate::auditor::audit_config::AuditConfig;
use crate::auditor::audit_error::AuditError;
use std::future::Future;
use url::Url;

/// Existence check for one hyperlink. Resolves to the response status, or an
/// error when no response arrived at all.
pub trait LinkProbe: Send + Sync + 'static {
    fn probe(&self, url: Url) -> impl Future<Output = Result<u16, AuditError>> + Send;
}

/// Issues a `HEAD` request and reports the final status after redirects.
#[derive(Clone)]
pub struct HeadRequestProbe {
    client: reqwest::Client,
}

impl HeadRequestProbe {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self { client })
    }
}

impl LinkProbe for HeadRequestProbe {
    fn probe(&self, url: Url) -> impl Future<Output = Result<u16, AuditError>> + Send {
        let request = self.client.head(url);
        async move {
            let response = request.send().await?;
            Ok(response.status().as_u16())
        }
    }
}
