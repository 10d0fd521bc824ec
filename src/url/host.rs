use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from an absolute URL string
///
/// The host is returned lowercase and without the port, so
/// `https://Example.com:8443/a` and `https://example.com/b` share one
/// throttle slot pool.
///
/// # Arguments
///
/// * `url` - The URL string to inspect
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host
/// * `Err(UrlError)` - The string is not an absolute URL or has no host
///
/// # Examples
///
/// ```
/// use depthcrawl::url::get_host;
///
/// assert_eq!(get_host("https://EXAMPLE.com/path").unwrap(), "example.com");
/// assert!(get_host("not a url").is_err());
/// assert!(get_host("mailto:someone@example.com").is_err());
/// ```
pub fn get_host(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    host_of(&parsed).ok_or_else(|| UrlError::MissingHost(url.to_string()))
}

/// Returns the lowercase host of an already parsed URL, if it has one
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
