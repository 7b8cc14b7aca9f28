// Outbound link extraction and scope filtering

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Scope rules for discovered links: a link is followed only if it is an
/// absolute http(s) URL containing the target and none of the whitelist
/// entries. Both checks are plain substring tests.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    target: String,
    whitelist: Vec<String>,
    resolve_relative: bool,
}

impl LinkFilter {
    pub fn new(target: impl Into<String>, whitelist: Vec<String>) -> Self {
        Self {
            target: target.into(),
            whitelist,
            resolve_relative: false,
        }
    }

    /// Join relative hrefs against the page they were found on before filtering
    pub fn with_relative_resolution(mut self, resolve_relative: bool) -> Self {
        self.resolve_relative = resolve_relative;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn is_whitelisted(&self, link: &str) -> bool {
        self.whitelist.iter().any(|entry| link.contains(entry.as_str()))
    }

    pub fn is_in_scope(&self, link: &str) -> bool {
        !link.is_empty() && has_http_scheme(link) && link.contains(self.target.as_str())
    }

    pub fn accepts(&self, link: &str) -> bool {
        self.is_in_scope(link) && !self.is_whitelisted(link)
    }

    /// Candidate links of a page, in anchor order. Duplicates are kept.
    pub fn extract_links(&self, html: &str, page_url: &str) -> Vec<String> {
        let base = if self.resolve_relative {
            Url::parse(page_url).ok()
        } else {
            None
        };

        extract_hrefs(html)
            .into_iter()
            .filter_map(|href| match &base {
                Some(base) if !has_http_scheme(&href) => resolve_url(base, &href),
                _ => Some(href),
            })
            .filter(|link| {
                let keep = self.accepts(link);
                if !keep {
                    debug!("Skipping out-of-scope or whitelisted link: {}", link);
                }
                keep
            })
            .collect()
    }
}

/// Extract in-scope, non-whitelisted links from a page body.
///
/// Only anchors carrying an `href` are considered and no deduplication is
/// done; relative links are not followed.
pub fn extract_links(html: &str, target: &str, whitelist: &[String]) -> Vec<String> {
    LinkFilter::new(target, whitelist.to_vec()).extract_links(html, target)
}

/// Raw `href` values of every anchor, in document order
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(String::from)
        .collect()
}

fn has_http_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn resolve_url(base: &Url, href: &str) -> Option<String> {
    // Skip empty, javascript:, mailto:, tel:, etc.
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "http://example.com";

    #[test]
    fn test_keeps_in_scope_links() {
        let html = r#"<html><body>
            <a href="http://example.com/dashboard">Dashboard</a>
            <a href="https://example.com/about">About</a>
        </body></html>"#;

        let links = extract_links(html, TARGET, &[]);
        assert_eq!(
            links,
            vec!["http://example.com/dashboard", "https://example.com/about"]
        );
    }

    #[test]
    fn test_drops_external_and_non_http_links() {
        let html = r#"
            <a href="http://other.org/admin">External</a>
            <a href="/relative/admin">Relative</a>
            <a href="mailto:admin@example.com">Mail</a>
            <a href="ftp://example.com/files">FTP</a>
            <a href="">Empty</a>
            <a>No href</a>
        "#;

        let links = extract_links(html, TARGET, &[]);
        assert!(links.is_empty(), "unexpected links: {:?}", links);
    }

    #[test]
    fn test_whitelist_is_substring_match() {
        let html = r#"
            <a href="http://example.com/about/secret">About</a>
            <a href="http://example.com/admin">Admin</a>
        "#;
        let whitelist = vec!["/about".to_string()];

        let links = extract_links(html, TARGET, &whitelist);
        assert_eq!(links, vec!["http://example.com/admin"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = r#"
            <a href="http://example.com/login">Login</a>
            <a href="http://example.com/login">Sign in</a>
        "#;

        let links = extract_links(html, TARGET, &[]);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_target_substring_scope_is_loose() {
        // Substring scoping lets a look-alike host through.
        let html = r#"<a href="http://example.com.evil.net/x">Look-alike</a>"#;

        let links = extract_links(html, TARGET, &[]);
        assert_eq!(links, vec!["http://example.com.evil.net/x"]);
    }

    #[test]
    fn test_relative_resolution_when_enabled() {
        let html = r##"
            <a href="/admin">Admin</a>
            <a href="settings#top">Settings</a>
            <a href="#section">Anchor</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/about/team">Team</a>
        "##;
        let filter = LinkFilter::new(TARGET, vec!["/about".to_string()])
            .with_relative_resolution(true);

        let links = filter.extract_links(html, "http://example.com/account/");
        assert_eq!(
            links,
            vec![
                "http://example.com/admin",
                "http://example.com/account/settings"
            ]
        );
    }

    #[test]
    fn test_scheme_check_is_case_insensitive() {
        let filter = LinkFilter::new("example.com", vec![]);
        assert!(filter.accepts("HTTPS://example.com/login"));
        assert!(!filter.accepts("httpexample.com"));
    }

    #[test]
    fn test_extract_hrefs_in_document_order() {
        let html = r#"<a href="b">B</a><p><a href="a">A</a></p><a name="x">X</a>"#;
        assert_eq!(extract_hrefs(html), vec!["b", "a"]);
    }
}
