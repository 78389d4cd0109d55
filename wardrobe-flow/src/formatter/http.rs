use async_trait::async_trait;
use tracing::{error, info};

use super::{CrawlRequest, CrawlResponse, ErrorBody, Formatter, Recommendation};
use crate::{
    answers::AnswerRecord,
    error::{Result, WizardError},
};

/// Calls a remote `/fashion-crawler` endpoint.
#[derive(Debug, Clone)]
pub struct HttpFormatter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFormatter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Formatter for HttpFormatter {
    async fn recommend(&self, answers: AnswerRecord) -> Result<Recommendation> {
        let request = CrawlRequest::from(&answers);
        info!(endpoint = %self.endpoint, "Requesting recommendation");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| WizardError::FormatterFailure(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| WizardError::FormatterFailure(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            let reason = match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(ErrorBody { error, details }) => format!("{status}: {error} ({details})"),
                Err(_) => format!("{status}: {}", String::from_utf8_lossy(&body)),
            };
            error!(endpoint = %self.endpoint, %reason, "Formatter endpoint returned an error");
            return Err(WizardError::FormatterFailure(reason));
        }

        let parsed: CrawlResponse = serde_json::from_slice(&body)
            .map_err(|e| WizardError::MalformedResponse(e.to_string()))?;
        parsed.validate()?;

        Ok(Recommendation::from(parsed))
    }
}
