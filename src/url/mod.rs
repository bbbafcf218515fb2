//! URL handling for the crawler
//!
//! This module provides candidate normalization, origin derivation, and the
//! href resolution rules used during link discovery. The traversal treats a
//! URL with a trailing slash and its bare form as the same page, never
//! follows fragments, and never leaves the seed's origin.

use crate::UrlError;
use url::Url;

/// Normalizes a traversal candidate URL
///
/// # Normalization Steps
///
/// 1. Strip any fragment (`#...`) suffix
/// 2. Strip a single trailing `/`
///
/// This is deliberately lighter than full URL canonicalization: the visited
/// ledger keys on the exact string the crawler fetches, and these two rules
/// are the only aliasing sources the traversal has to collapse.
///
/// # Examples
///
/// ```
/// use magpie::url::normalize_candidate;
///
/// assert_eq!(normalize_candidate("https://example.com/docs/"), "https://example.com/docs");
/// assert_eq!(normalize_candidate("https://example.com/a#intro"), "https://example.com/a");
/// ```
pub fn normalize_candidate(url: &str) -> String {
    let without_fragment = match url.split_once('#') {
        Some((before, _)) => before,
        None => url,
    };

    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// Derives the base origin of a seed URL: `scheme://host[:port]`
///
/// The origin is the boundary of the crawl; links resolving outside it are
/// never followed.
///
/// # Arguments
///
/// * `seed` - The seed URL the crawl starts from
///
/// # Returns
///
/// * `Ok(String)` - Origin with no trailing slash (e.g. `https://example.com`)
/// * `Err(UrlError)` - Seed is malformed, non-HTTP(S), or has no host
pub fn origin_of(seed: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(seed.to_string()))?;

    let origin = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };

    Ok(origin)
}

/// Derives a collection name from a seed URL
///
/// The name is the seed's host with any `www.` prefix dropped, mirroring the
/// directory naming of the filesystem sink. A port, when present, is joined
/// with `-` so the name stays filesystem-safe.
pub fn collection_from_seed(seed: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(seed.to_string()))?;

    let host = host.strip_prefix("www.").unwrap_or(host);

    Ok(match parsed.port() {
        Some(port) => format!("{}-{}", host, port),
        None => host.to_string(),
    })
}

/// Resolves an anchor href against the crawl's base origin
///
/// # Resolution Rules
///
/// - Absolute `http(s)` hrefs are kept as-is
/// - Absolute-path hrefs (`/docs/intro`) get the origin prepended
/// - Bare-relative hrefs (`intro.html`) get origin + `/` prepended
///
/// Returns None for hrefs that are never traversal candidates:
/// - `javascript:`, `mailto:`, `tel:` schemes
/// - Data URIs
/// - Fragment-only links (same-page anchors)
/// - Empty hrefs
pub fn resolve_href(href: &str, origin: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with('/') {
        Some(format!("{}{}", origin, href))
    } else {
        Some(format!("{}/{}", origin, href))
    }
}

/// Checks whether a resolved URL shares the crawl's base origin
///
/// Cross-origin links are recorded nowhere and never fetched. The check
/// requires a path boundary after the origin so that
/// `https://example.com.evil.org` does not pass as `https://example.com`.
pub fn is_same_origin(url: &str, origin: &str) -> bool {
    match url.strip_prefix(origin) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        assert_eq!(
            normalize_candidate("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_strip_trailing_slash() {
        assert_eq!(
            normalize_candidate("https://example.com/page/"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_strip_fragment_then_slash() {
        assert_eq!(
            normalize_candidate("https://example.com/page/#top"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_only_single_trailing_slash_removed() {
        assert_eq!(
            normalize_candidate("https://example.com/page//"),
            "https://example.com/page/"
        );
    }

    #[test]
    fn test_already_normalized() {
        assert_eq!(
            normalize_candidate("https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_origin_simple() {
        assert_eq!(
            origin_of("https://example.com/docs/intro").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_origin_keeps_port() {
        assert_eq!(
            origin_of("http://127.0.0.1:8080/index").unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_origin_rejects_ftp() {
        let result = origin_of("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_origin_rejects_garbage() {
        assert!(origin_of("not a url").is_err());
    }

    #[test]
    fn test_collection_strips_www() {
        assert_eq!(
            collection_from_seed("https://www.example.com/docs").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_collection_with_port() {
        assert_eq!(
            collection_from_seed("http://127.0.0.1:9000/").unwrap(),
            "127.0.0.1-9000"
        );
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(
            resolve_href("https://other.com/page", "https://example.com"),
            Some("https://other.com/page".to_string())
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve_href("/docs/intro", "https://example.com"),
            Some("https://example.com/docs/intro".to_string())
        );
    }

    #[test]
    fn test_resolve_bare_relative() {
        assert_eq!(
            resolve_href("intro.html", "https://example.com"),
            Some("https://example.com/intro.html".to_string())
        );
    }

    #[test]
    fn test_resolve_skips_mailto() {
        assert_eq!(resolve_href("mailto:a@b.com", "https://example.com"), None);
    }

    #[test]
    fn test_resolve_skips_javascript() {
        assert_eq!(
            resolve_href("javascript:void(0)", "https://example.com"),
            None
        );
    }

    #[test]
    fn test_resolve_skips_tel() {
        assert_eq!(resolve_href("tel:+123456", "https://example.com"), None);
    }

    #[test]
    fn test_resolve_skips_data_uri() {
        assert_eq!(
            resolve_href("data:text/plain,hello", "https://example.com"),
            None
        );
    }

    #[test]
    fn test_resolve_skips_fragment_only() {
        assert_eq!(resolve_href("#section", "https://example.com"), None);
    }

    #[test]
    fn test_resolve_skips_empty() {
        assert_eq!(resolve_href("   ", "https://example.com"), None);
    }

    #[test]
    fn test_same_origin() {
        assert!(is_same_origin(
            "https://example.com/docs",
            "https://example.com"
        ));
        assert!(!is_same_origin(
            "https://other.com/docs",
            "https://example.com"
        ));
    }

    #[test]
    fn test_same_origin_requires_path_boundary() {
        assert!(is_same_origin("https://example.com", "https://example.com"));
        assert!(!is_same_origin(
            "https://example.com.evil.org/x",
            "https://example.com"
        ));
    }
}
