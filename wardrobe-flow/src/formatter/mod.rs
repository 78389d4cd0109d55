//! Turning a completed answer record into a [`Recommendation`].
//!
//! The wizard only ever talks to the [`Formatter`] trait. [`LocalFormatter`]
//! renders the templates in-process after a simulated latency,
//! [`HttpFormatter`] asks a remote `/fashion-crawler` endpoint, and
//! [`WithTimeout`] puts a deadline on either.

#[cfg(feature = "http")]
mod http;
pub mod templates;
pub mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, warn};

use crate::{
    answers::AnswerRecord,
    error::{Result, WizardError},
};

#[cfg(feature = "http")]
pub use http::HttpFormatter;
pub use templates::format;
pub use wire::{AccessoryLink, CrawlRequest, CrawlResponse, ErrorBody, FashionItem, StyleAnalysis};

/// What the results screen shows. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub analysis: String,
    pub accessory_suggestions: Vec<String>,
    pub accessory_links: BTreeMap<String, String>,
    pub products: Vec<FashionItem>,
    pub query: String,
}

impl From<CrawlResponse> for Recommendation {
    fn from(response: CrawlResponse) -> Self {
        let StyleAnalysis {
            color_analysis,
            style_analysis,
            accessory_suggestions,
            accessory_links,
        } = response.analysis;

        let analysis = [color_analysis, style_analysis]
            .into_iter()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            analysis,
            accessory_suggestions,
            accessory_links: accessory_links
                .into_iter()
                .map(|link| (link.item, link.url))
                .collect(),
            products: response.recommendations,
            query: response.query,
        }
    }
}

/// Produces a recommendation for a record the wizard has already validated.
#[async_trait]
pub trait Formatter: Send + Sync {
    async fn recommend(&self, answers: AnswerRecord) -> Result<Recommendation>;
}

/// Renders the templates in-process after `delay`.
#[derive(Debug, Clone, Default)]
pub struct LocalFormatter {
    delay: Duration,
}

impl LocalFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Formatter for LocalFormatter {
    async fn recommend(&self, answers: AnswerRecord) -> Result<Recommendation> {
        if !self.delay.is_zero() {
            debug!(delay_ms = %self.delay.as_millis(), "Simulating formatter latency");
            tokio::time::sleep(self.delay).await;
        }
        Ok(format(&answers))
    }
}

/// Fails with [`WizardError::FormatterFailure`] when `inner` takes longer
/// than `timeout`.
pub struct WithTimeout<F> {
    inner: F,
    timeout: Duration,
}

impl<F: Formatter> WithTimeout<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<F: Formatter> Formatter for WithTimeout<F> {
    async fn recommend(&self, answers: AnswerRecord) -> Result<Recommendation> {
        match tokio::time::timeout(self.timeout, self.inner.recommend(answers)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = %self.timeout.as_millis(), "Formatter timed out");
                Err(WizardError::FormatterFailure(format!(
                    "no response within {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Formatter for Stalled {
        async fn recommend(&self, _answers: AnswerRecord) -> Result<Recommendation> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(format(&AnswerRecord::default()))
        }
    }

    #[tokio::test]
    async fn local_formatter_matches_templates() {
        let answers = AnswerRecord {
            body_shape: Some("pear".to_string()),
            ..AnswerRecord::default()
        };
        let recommendation = LocalFormatter::new().recommend(answers.clone()).await.unwrap();
        assert_eq!(recommendation, format(&answers));
    }

    #[tokio::test]
    async fn timeout_reports_formatter_failure() {
        let formatter = WithTimeout::new(Stalled, Duration::from_millis(20));
        let err = formatter.recommend(AnswerRecord::default()).await.unwrap_err();
        assert!(matches!(err, WizardError::FormatterFailure(_)));
    }

    #[test]
    fn links_collapse_into_a_map() {
        let response = templates::crawl_response(&AnswerRecord::default());
        let recommendation = Recommendation::from(response.clone());
        assert_eq!(
            recommendation.accessory_links.len(),
            response.analysis.accessory_links.len()
        );
        assert_eq!(recommendation.query, response.query);
    }
}
