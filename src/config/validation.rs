use crate::config::CrawlConfig;
use crate::ConfigError;
use url::Url;

/// Validates a crawl configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be at least 1".to_string(),
        ));
    }

    if let Some(url) = &config.url {
        let parsed = Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("invalid url '{}': {}", url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "url must use an http or https scheme, got '{}'",
                parsed.scheme()
            )));
        }
    }

    for name in config.request_headers.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "request header names cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
