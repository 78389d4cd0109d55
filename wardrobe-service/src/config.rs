//! Service configuration read from environment variables.

use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;
use wardrobe_flow::{Formatter, HttpFormatter, LocalFormatter, WithTimeout};

pub const DEFAULT_PORT: u16 = 3000;

/// Latency simulated by `/fashion-crawler` before answering.
pub const DEFAULT_CRAWLER_DELAY_MS: u64 = 2000;

/// Latency simulated by the in-process formatter behind the wizard.
pub const DEFAULT_WIZARD_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub crawler_delay: Duration,
    pub wizard_delay: Duration,
    /// Remote `/fashion-crawler` used by the wizard; in-process when unset.
    pub formatter_url: Option<String>,
    pub formatter_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_format: LogFormat::Json,
            crawler_delay: Duration::from_millis(DEFAULT_CRAWLER_DELAY_MS),
            wizard_delay: Duration::from_millis(DEFAULT_WIZARD_DELAY_MS),
            formatter_url: None,
            formatter_timeout: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{port}'"))?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }
        if let Some(delay) = millis(&lookup, "CRAWLER_DELAY_MS")? {
            config.crawler_delay = delay;
        }
        if let Some(delay) = millis(&lookup, "WIZARD_DELAY_MS")? {
            config.wizard_delay = delay;
        }
        config.formatter_url = lookup("FORMATTER_URL").filter(|url| !url.trim().is_empty());
        config.formatter_timeout = millis(&lookup, "FORMATTER_TIMEOUT_MS")?;

        Ok(config)
    }

    /// The formatter the wizard submits to.
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        match (&self.formatter_url, self.formatter_timeout) {
            (Some(url), Some(timeout)) => {
                info!(url = %url, timeout_ms = %timeout.as_millis(), "Using remote formatter");
                Arc::new(WithTimeout::new(HttpFormatter::new(url), timeout))
            }
            (Some(url), None) => {
                info!(url = %url, "Using remote formatter");
                Arc::new(HttpFormatter::new(url))
            }
            (None, Some(timeout)) => Arc::new(WithTimeout::new(
                LocalFormatter::with_delay(self.wizard_delay),
                timeout,
            )),
            (None, None) => Arc::new(LocalFormatter::with_delay(self.wizard_delay)),
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    lookup(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{key} must be a number of milliseconds, got '{raw}'"))
        })
        .transpose()
}
