//! HTML parser for extracting links and metadata
//!
//! This module provides the [`Document`] seam the crawler extracts links
//! through, and [`HtmlDocument`], the implementation backing HTTP downloads.

use crate::state::PageError;
use scraper::{Html, Selector};
use url::Url;

/// A successfully downloaded page from which links can be extracted
///
/// Extraction runs on Tokio's blocking pool, so implementations may do
/// CPU-heavy parsing.
pub trait Document: Send + 'static {
    /// Returns the absolute URLs this page links to
    fn extract_links(&self) -> Result<Vec<String>, PageError>;
}

/// Content types treated as HTML
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A downloaded HTML page
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    /// Final URL after redirects, used to resolve relative links
    pub url: String,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Page body
    pub body: String,
}

impl HtmlDocument {
    /// Creates a document from its parts
    pub fn new(
        url: impl Into<String>,
        content_type: Option<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            content_type,
            body: body.into(),
        }
    }

    /// Returns whether the content type allows HTML parsing
    ///
    /// A missing Content-Type header is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                HTML_CONTENT_TYPES.iter().any(|html| ct.starts_with(html))
            }
            None => true,
        }
    }
}

impl Document for HtmlDocument {
    fn extract_links(&self) -> Result<Vec<String>, PageError> {
        if !self.is_html() {
            return Err(PageError::Extract(format!(
                "expected HTML, got {}",
                self.content_type.as_deref().unwrap_or_default()
            )));
        }

        let base_url = Url::parse(&self.url)
            .map_err(|e| PageError::Extract(format!("invalid base URL '{}': {}", self.url, e)))?;

        Ok(parse_html(&self.body, &base_url).links)
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs, fragments removed)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
/// - Anything that does not resolve to http(s)
///
/// # Example
///
/// ```
/// use depthcrawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, base_url));
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, base_url));
            }
        }
    }

    links
}

/// Resolves a link href to an absolute http(s) URL without fragment
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
