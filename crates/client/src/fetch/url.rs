//! Image endpoint validation.

/// Error type for endpoint validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("host not allowed: {0}")]
    HostNotAllowed(String),
}

/// Parse an image endpoint and normalize it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (Unsplash encodes crop and size there)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Canonicalize `input` and require its host to be one of `allowed_hosts`.
pub fn check_image_url(input: &str, allowed_hosts: &[String]) -> Result<url::Url, UrlError> {
    let url = canonicalize(input)?;
    let host = url.host_str().unwrap_or_default();

    if !allowed_hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host)) {
        return Err(UrlError::HostNotAllowed(host.to_string()));
    }

    Ok(url)
}

/// Append `key=value` to the query string of `url`.
pub fn with_query(mut url: url::Url, pairs: &[(&str, &str)]) -> url::Url {
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["images.unsplash.com".to_string()]
    }

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://images.unsplash.com/photo-1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("images.unsplash.com"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://IMAGES.Unsplash.COM/x").unwrap();
        assert_eq!(url.host_str(), Some("images.unsplash.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/a#section").unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("https://images.unsplash.com/photo?ixid=abc&w=2000").unwrap();
        assert_eq!(url.query(), Some("ixid=abc&w=2000"));
    }

    #[test]
    fn test_canonicalize_missing_scheme() {
        assert!(matches!(canonicalize("images.unsplash.com/x"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_check_image_url_allowed() {
        let url = check_image_url("https://images.unsplash.com/photo-1?w=10", &hosts()).unwrap();
        assert_eq!(url.path(), "/photo-1");
    }

    #[test]
    fn test_check_image_url_rejects_other_host() {
        let result = check_image_url("http://169.254.169.254/latest/meta-data", &hosts());
        assert!(matches!(result, Err(UrlError::HostNotAllowed(h)) if h == "169.254.169.254"));
    }

    #[test]
    fn test_with_query_appends() {
        let url = url::Url::parse("https://images.unsplash.com/p?ixid=1").unwrap();
        let url = with_query(url, &[("q", "85"), ("w", "2000")]);
        assert_eq!(url.query(), Some("ixid=1&q=85&w=2000"));
    }
}
