// Scan orchestration: path probing first, then the keyword crawl

use crate::client::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::context::SensitivePages;
use crate::crawler::{Crawler, ProgressCallback};
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::links::LinkFilter;
use crate::prober::{PathProber, ProbeCallback};
use crate::result::ScanResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub struct Scanner {
    target: String,
    whitelist: Vec<String>,
    keywords: Arc<KeywordSet>,
    workers: usize,
    timeout_secs: u64,
    max_depth: Option<usize>,
    max_pages: Option<usize>,
    resolve_relative: bool,
    match_paths: bool,
    probe: bool,
    progress_callback: Option<ProgressCallback>,
    probe_callback: Option<ProbeCallback>,
}

impl Scanner {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            whitelist: Vec::new(),
            keywords: Arc::new(KeywordSet::default()),
            workers: 1,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_depth: None,
            max_pages: None,
            resolve_relative: false,
            match_paths: false,
            probe: true,
            progress_callback: None,
            probe_callback: None,
        }
    }

    pub fn with_whitelist(mut self, whitelist: Vec<String>) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = Arc::new(keywords);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_pages(mut self, pages: Option<usize>) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_relative_links(mut self, resolve_relative: bool) -> Self {
        self.resolve_relative = resolve_relative;
        self
    }

    pub fn with_path_matching(mut self, match_paths: bool) -> Self {
        self.match_paths = match_paths;
        self
    }

    /// Enable or skip the guessed-path phase
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_probe_callback(mut self, callback: ProbeCallback) -> Self {
        self.probe_callback = Some(callback);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Run the probe phase to completion, then crawl from the target.
    /// Network failures never fail the scan; whatever was found is returned.
    pub async fn scan(&self) -> Result<ScanResult> {
        let started = Instant::now();
        let client = build_client(self.timeout_secs)?;
        let sensitive = SensitivePages::new();
        let mut result = ScanResult::new(self.target.clone());

        if self.probe {
            let mut prober = PathProber::new(client.clone(), self.keywords.clone());
            if let Some(ref callback) = self.probe_callback {
                prober = prober.with_progress_callback(callback.clone());
            }
            result.probes_sent = prober.probe(&self.target, &sensitive).await;
            info!(
                "Probe phase complete: {} of {} keyword paths exist",
                sensitive.len().await,
                result.probes_sent
            );
        }

        let filter = LinkFilter::new(self.target.clone(), self.whitelist.clone())
            .with_relative_resolution(self.resolve_relative);

        let mut crawler = Crawler::with_client(client, filter, self.keywords.clone())
            .with_max_depth(self.max_depth)
            .with_max_pages(self.max_pages)
            .with_path_matching(self.match_paths);
        if let Some(ref callback) = self.progress_callback {
            crawler = crawler.with_progress_callback(callback.clone());
        }

        let stats = crawler.crawl(&self.target, self.workers, &sensitive).await?;

        result.pages_visited = stats.pages_fetched;
        result.pages_failed = stats.pages_failed;
        result.sensitive_pages = sensitive.snapshot().await;
        result.duration = started.elapsed();

        info!(
            "Scan of {} complete: {} potentially sensitive pages",
            self.target,
            result.count()
        );
        Ok(result)
    }
}

/// Scan `target` with default settings and return the sensitive page URLs
pub async fn scan(target: &str, whitelist: &[String]) -> Result<Vec<String>> {
    let result = Scanner::new(target)
        .with_whitelist(whitelist.to_vec())
        .scan()
        .await?;

    Ok(result.sensitive_pages.into_iter().map(|page| page.url).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Detection;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "text/html")
                    .set_body_string(body),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_probe_hit_is_reported() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();

        mount_page(&mock_server, "/", 200, "<p>Welcome</p>".to_string()).await;
        mount_page(&mock_server, "/admin", 200, "<p>Restricted</p>".to_string()).await;

        let urls = scan(&uri, &[]).await.unwrap();

        assert_eq!(urls, vec![format!("{}/admin", uri)]);
    }

    #[tokio::test]
    async fn test_probe_and_crawl_results_are_merged() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();

        mount_page(
            &mock_server,
            "/",
            200,
            format!(r#"<a href="{uri}/dashboard">Dashboard</a>"#),
        )
        .await;
        mount_page(&mock_server, "/dashboard", 200, "<h1>Login</h1>".to_string()).await;

        let result = Scanner::new(uri.clone()).scan().await.unwrap();

        // /dashboard is both guessed and crawled but recorded once
        let dashboard = format!("{}/dashboard", uri);
        assert_eq!(result.urls().filter(|u| *u == dashboard).count(), 1);
        let page = result
            .sensitive_pages
            .iter()
            .find(|p| p.url == dashboard)
            .unwrap();
        assert_eq!(page.detection, Detection::Probe { status: 200 });
        assert_eq!(result.probes_sent, 17);
        assert_eq!(result.pages_visited, 2);
        // The root page links to /dashboard, so its body matches too
        assert!(result.contains(&uri));
        assert_eq!(result.count(), 2);
    }

    #[tokio::test]
    async fn test_probe_can_be_disabled() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();

        mount_page(&mock_server, "/", 200, "<p>Welcome</p>".to_string()).await;
        Mock::given(method("GET"))
            .and(path("/admin"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = Scanner::new(uri).with_probe(false).scan().await.unwrap();

        assert_eq!(result.probes_sent, 0);
        assert_eq!(result.count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_target_gives_empty_result() {
        let result = Scanner::new("http://127.0.0.1:9")
            .with_timeout(2)
            .scan()
            .await
            .unwrap();

        assert_eq!(result.count(), 0);
        assert_eq!(result.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_custom_keywords_drive_both_phases() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();

        mount_page(
            &mock_server,
            "/",
            200,
            format!(r#"<a href="{uri}/team">Team</a>"#),
        )
        .await;
        mount_page(&mock_server, "/team", 200, "Internal WIKI".to_string()).await;
        mount_page(&mock_server, "/phpinfo", 200, "php".to_string()).await;

        let keywords = KeywordSet::new(["phpinfo", "wiki"]).unwrap();
        let result = Scanner::new(uri.clone())
            .with_keywords(keywords)
            .with_workers(2)
            .scan()
            .await
            .unwrap();

        let urls: Vec<&str> = result.urls().collect();
        assert_eq!(urls, vec![format!("{}/phpinfo", uri), format!("{}/team", uri)]);
    }
}
