//! HTTP fetcher implementation
//!
//! This module handles one sitemap request end to end:
//! - Building the HTTP client with user agent, headers, and TLS settings
//! - Issuing a single GET per call with a scoped per-request deadline
//! - Classifying outcomes (success / HTTP error / timeout / transport error)
//! - Detecting gzip payloads by signature and decompressing them
//! - Handing decoded text to the sitemap XML parser

use crate::config::CrawlConfig;
use crate::crawler::parser::{parse_document, Document};
use crate::outcome::ErrorKind;
use crate::{ConfigError, SweepError};
use flate2::read::GzDecoder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::io::Read;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A classified fetch failure for one URL
///
/// Carries the [`ErrorKind`] the crawl error for this branch will be tagged
/// with, should the retry budget run out.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchFailure {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Builds the HTTP client used for every request of one crawl
///
/// Request headers come from the configuration; certificate validation is
/// controlled by `verify_tls`. No client-level total timeout is set; the
/// per-request deadline is enforced by [`Fetcher::fetch`].
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, SweepError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.request_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ConfigError::Validation(format!("invalid request header name '{}': {}", name, e))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            ConfigError::Validation(format!("invalid value for request header '{}': {}", name, e))
        })?;
        headers.insert(header_name, header_value);
    }

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches and parses one sitemap URL per call
///
/// Retry policy lives in the crawl engine; the fetcher issues exactly one
/// request each time it is called.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches `url` and parses the body into a sitemap [`Document`]
    ///
    /// The whole request (connect, headers, body) runs under one deadline.
    /// The deadline is scoped to this call: cancelling drops the in-flight
    /// request, and the timer cannot outlive the call it belongs to.
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchFailure> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::new(
                ErrorKind::Timeout,
                format!(
                    "request timed out after {} ms for url: '{}'",
                    self.timeout.as_millis(),
                    url
                ),
            )),
        }
    }

    async fn fetch_inner(&self, url: &str) -> Result<Document, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::new(
                ErrorKind::Http,
                format!("HTTP error: status {} fetching '{}'", status, url),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(classify_transport_error)?;

        let text = decode_body(&body)?;
        tracing::trace!("decoded {} bytes from {}", text.len(), url);

        parse_document(&text).map_err(|e| {
            FetchFailure::new(ErrorKind::Parse, format!("malformed sitemap XML: {}", e))
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::new(ErrorKind::Timeout, format!("request timed out: {}", error))
    } else {
        FetchFailure::new(ErrorKind::Internal, format!("transport error: {}", error))
    }
}

/// Decodes a response body to text, gunzipping when the payload is gzip
///
/// Detection inspects the payload signature rather than any server-declared
/// encoding, so `.xml.gz` files served as `application/octet-stream` still
/// decode. A corrupt gzip stream is a parse failure for the branch.
fn decode_body(bytes: &[u8]) -> Result<String, FetchFailure> {
    if is_gzip(bytes) {
        let mut text = String::new();
        GzDecoder::new(bytes)
            .read_to_string(&mut text)
            .map_err(|e| {
                FetchFailure::new(ErrorKind::Parse, format!("failed to gunzip response body: {}", e))
            })?;
        Ok(text)
    } else {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Gzip magic bytes check
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_is_gzip_signature() {
        assert!(is_gzip(&gzip(b"<urlset></urlset>")));
        assert!(!is_gzip(b"<urlset></urlset>"));
        assert!(!is_gzip(b"\x1f"));
        assert!(!is_gzip(b""));
    }

    #[test]
    fn test_decode_body_plain_text() {
        let text = decode_body(b"<urlset></urlset>").unwrap();
        assert_eq!(text, "<urlset></urlset>");
    }

    #[test]
    fn test_decode_body_gunzips_payload() {
        let compressed = gzip(b"<urlset><url><loc>https://a.example/</loc></url></urlset>");
        let text = decode_body(&compressed).unwrap();
        assert!(text.contains("https://a.example/"));
    }

    #[test]
    fn test_decode_body_corrupt_gzip_is_parse_failure() {
        // Valid signature, garbage stream
        let failure = decode_body(b"\x1f\x8b\x00garbage").unwrap_err();
        assert_eq!(failure.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_build_http_client_rejects_bad_header_name() {
        let mut config = CrawlConfig::default();
        config
            .request_headers
            .insert("bad header\n".to_string(), "x".to_string());

        assert!(build_http_client(&config).is_err());
    }

    #[test]
    fn test_build_http_client_with_headers() {
        let mut config = CrawlConfig::default();
        config
            .request_headers
            .insert("Accept-Encoding".to_string(), "gzip,deflate".to_string());

        assert!(build_http_client(&config).is_ok());
    }
}
