use crate::config::{validate, CrawlConfig};
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Parsed and validated configuration
/// * `Err(ConfigError)` - File unreadable, TOML invalid, or validation failed
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: CrawlConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SitemapField;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
url = "https://example.com/sitemap.xml"
timeout-ms = 5000
lastmod = "2024-06-01T00:00:00Z"
concurrency = 4
retries = 2
verify-tls = false
fields = ["loc", "lastmod"]

[request-headers]
"Accept-Encoding" = "gzip,deflate"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.url.as_deref(), Some("https://example.com/sitemap.xml"));
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.retries, 2);
        assert!(!config.verify_tls);
        assert!(config.lastmod.is_some());
        assert_eq!(
            config.request_headers.get("Accept-Encoding").map(String::as_str),
            Some("gzip,deflate")
        );

        let fields = config.fields.unwrap();
        assert!(fields.contains(&SitemapField::Loc));
        assert!(fields.contains(&SitemapField::Lastmod));
        assert!(!fields.contains(&SitemapField::Priority));
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let file = write_config(r#"url = "https://example.com/sitemap.xml""#);

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.retries, 0);
        assert!(config.verify_tls);
        assert!(config.lastmod.is_none());
        assert!(config.fields.is_none());
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let file = write_config("url = [unclosed");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_field_name_rejected() {
        let file = write_config(r#"fields = ["loc", "video"]"#);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_invalid_config_fails_validation() {
        let file = write_config("concurrency = 0");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
