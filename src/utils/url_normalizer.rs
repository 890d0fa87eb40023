//! Destination URL validation and normalization.

use url::Url;

/// Longest destination accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur while normalizing a destination.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Normalizes a destination to a canonical form.
///
/// Trims whitespace, accepts only `http`/`https` with a host, lowercases the
/// host, drops the default port and the fragment. Path and query keep their
/// case.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    // The url crate already lowercases domain hosts for special schemes.
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    url.set_fragment(None);

    // set_port only fails for cannot-be-a-base URLs, excluded above
    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = url.set_port(None);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_root_path() {
        assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com/");
    }

    #[test]
    fn test_lowercases_host_keeps_path_case() {
        assert_eq!(
            normalize_url("https://EXAMPLE.com/Some/Path?Q=1").unwrap(),
            "https://example.com/Some/Path?Q=1"
        );
    }

    #[test]
    fn test_strips_fragment_and_default_port() {
        assert_eq!(
            normalize_url("  http://example.com:80/page#top ").unwrap(),
            "http://example.com/page"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/").unwrap(),
            "https://example.com:8443/"
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            normalize_url("javascript:alert(1)"),
            Err(UrlNormalizationError::UnsupportedProtocol)
        ));
        assert!(matches!(
            normalize_url("ftp://example.com/file"),
            Err(UrlNormalizationError::UnsupportedProtocol)
        ));
    }

    #[test]
    fn test_rejects_garbage_and_long_urls() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));

        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(normalize_url(&long), Err(UrlNormalizationError::TooLong)));
    }
}
