// src/utils/url.rs

//! URL normalization relative to a crawl's origin.

use url::Url;

use crate::error::{AppError, Result};

/// Prefixes that never lead to a fetchable page.
const PSEUDO_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "#"];

/// Origin of a crawl, derived once from the seed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginContext {
    /// Network location, `host[:port]`
    base_origin: String,
    /// `scheme://host[:port]`, no trailing slash
    base_url: String,
}

impl OriginContext {
    /// Derive the origin from a seed URL.
    ///
    /// A seed without a scheme is treated as `https://`.
    ///
    /// # Examples
    /// ```
    /// use rufus::utils::url::OriginContext;
    ///
    /// let origin = OriginContext::from_seed("https://example.com:8080/menu").unwrap();
    /// assert_eq!(origin.base_origin(), "example.com:8080");
    /// assert_eq!(origin.base_url(), "https://example.com:8080");
    /// ```
    pub fn from_seed(seed: &str) -> Result<Self> {
        let parsed = Url::parse(&absolutize_seed(seed))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::validation(format!("seed URL has no host: {seed}")))?;

        let base_origin = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let base_url = format!("{}://{}", parsed.scheme(), base_origin);

        Ok(Self {
            base_origin,
            base_url,
        })
    }

    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether `url` belongs to the crawl's site.
    ///
    /// Substring match on the network location, so subdomains and the other
    /// scheme count as same-origin.
    pub fn is_same_origin(&self, url: &str) -> bool {
        url.contains(&self.base_origin)
    }
}

/// Give a scheme-less seed an `https://` prefix.
pub fn absolutize_seed(seed: &str) -> String {
    let seed = seed.trim();
    if seed.contains("://") {
        seed.to_string()
    } else {
        format!("https://{}", seed.trim_start_matches('/'))
    }
}

/// Turn a raw `href` into an absolute URL, or `None` if it cannot be fetched.
///
/// # Examples
/// ```
/// use rufus::utils::url::{normalize, OriginContext};
///
/// let origin = OriginContext::from_seed("https://a.com").unwrap();
/// assert_eq!(normalize("/path", &origin).as_deref(), Some("https://a.com/path"));
/// assert_eq!(normalize("//cdn.com/x", &origin).as_deref(), Some("https://cdn.com/x"));
/// assert_eq!(normalize("#", &origin), None);
/// ```
pub fn normalize(href: &str, origin: &OriginContext) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || PSEUDO_SCHEMES.iter().any(|p| starts_with_ignore_case(href, p)) {
        return None;
    }

    if starts_with_ignore_case(href, "http://") || starts_with_ignore_case(href, "https://") {
        return Some(href.to_string());
    }

    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }

    if href.starts_with('/') {
        return Some(format!("{}{href}", origin.base_url));
    }

    Some(format!("{}/{href}", origin.base_url))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
