use crate::client::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::context::{SensitivePages, Visit, VisitedSet};
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::links::LinkFilter;
use crate::result::{CrawlStats, Detection};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Frontier entries. A page's depth is read from the visited set when the
/// entry is processed, so it reflects the shortest path found so far.
#[derive(Debug, Clone)]
enum Work {
    /// Fetch, classify and expand a page
    Fetch(String),
    /// Expand an already fetched page again after its depth shrank
    Expand(String),
}

type Frontier = Arc<Mutex<Vec<Work>>>;

/// Links of fetched pages. Only filled when a depth bound is set.
type LinkCache = Arc<Mutex<HashMap<String, Vec<String>>>>;

/// Outcome of fetching and classifying a single page
#[derive(Debug, Clone)]
pub struct PageVisit {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub links: Vec<String>,
    pub detection: Option<Detection>,
}

pub struct Crawler {
    client: Client,
    keywords: Arc<KeywordSet>,
    filter: Arc<LinkFilter>,
    max_depth: Option<usize>,
    max_pages: Option<usize>,
    match_paths: bool,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(filter: LinkFilter, keywords: Arc<KeywordSet>) -> Result<Self> {
        Ok(Self::with_client(
            build_client(DEFAULT_TIMEOUT_SECS)?,
            filter,
            keywords,
        ))
    }

    pub fn with_client(client: Client, filter: LinkFilter, keywords: Arc<KeywordSet>) -> Self {
        Self {
            client,
            keywords,
            filter: Arc::new(filter),
            max_depth: None,
            max_pages: None,
            match_paths: false,
            progress_callback: None,
        }
    }

    /// Links more than `depth` hops away from the start page are not followed
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Stop fetching once this many pages have been requested
    pub fn with_max_pages(mut self, pages: Option<usize>) -> Self {
        self.max_pages = pages;
        self
    }

    /// Also flag pages whose own URL path contains a keyword
    pub fn with_path_matching(mut self, match_paths: bool) -> Self {
        self.match_paths = match_paths;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Traverse every in-scope link reachable from `start_url`, adding each
    /// page whose body matches the keyword set to `sensitive`.
    ///
    /// Each call starts from an empty visited set, so a crawler can be run
    /// again over the same site. Per-page failures abandon that branch only;
    /// the crawl itself fails only if a worker task panics.
    pub async fn crawl(
        &self,
        start_url: &str,
        workers: usize,
        sensitive: &SensitivePages,
    ) -> Result<CrawlStats> {
        let workers = workers.max(1);
        info!("Starting crawl of {} with {} workers", start_url, workers);

        let visited = VisitedSet::new();
        // The start page counts as visited so links back to it are ignored
        visited.insert(start_url).await;

        let frontier: Frontier = Arc::new(Mutex::new(vec![Work::Fetch(start_url.to_string())]));
        let link_cache: LinkCache = Arc::new(Mutex::new(HashMap::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let pages_fetched = Arc::new(AtomicUsize::new(0));
        let pages_failed = Arc::new(AtomicUsize::new(0));

        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let client = self.client.clone();
            let keywords = self.keywords.clone();
            let filter = self.filter.clone();
            let visited = visited.clone();
            let sensitive = sensitive.clone();
            let progress_cb = self.progress_callback.clone();
            let max_depth = self.max_depth;
            let max_pages = self.max_pages;
            let match_paths = self.match_paths;
            let frontier = frontier.clone();
            let link_cache = link_cache.clone();
            let in_flight = in_flight.clone();
            let pages_fetched = pages_fetched.clone();
            let pages_failed = pages_failed.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    // Pop and mark in-flight under the frontier lock, so an
                    // idle worker never sees an empty frontier while another
                    // worker still holds a page that may add children.
                    let (work_item, finished) = {
                        let mut queue = frontier.lock().await;
                        let item = queue.pop();
                        if item.is_some() {
                            in_flight.fetch_add(1, Ordering::SeqCst);
                        }
                        let finished = item.is_none() && in_flight.load(Ordering::SeqCst) == 0;
                        (item, finished)
                    };

                    let Some(work) = work_item else {
                        if finished {
                            break;
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                        continue;
                    };

                    let (url, children) = match work {
                        Work::Fetch(url) => {
                            let within_budget = pages_fetched
                                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                                    match max_pages {
                                        Some(max) if n >= max => None,
                                        _ => Some(n + 1),
                                    }
                                })
                                .is_ok();
                            if !within_budget {
                                debug!("[Worker {}] Page budget exhausted, dropping {}", worker_id, url);
                                in_flight.fetch_sub(1, Ordering::SeqCst);
                                continue;
                            }

                            if let Some(ref callback) = progress_cb {
                                callback(worker_id, url.clone());
                            }

                            match Self::visit_page(&client, &url, &filter, &keywords, match_paths)
                                .await
                            {
                                Ok(page) => {
                                    if let Some(detection) = page.detection {
                                        debug!(
                                            "[Worker {}] Sensitive page {} ({})",
                                            worker_id, url, detection
                                        );
                                        sensitive.insert(&url, detection).await;
                                    }

                                    // Cache before reading the depth: a shorter
                                    // path found after this point re-expands
                                    // from the cache.
                                    if max_depth.is_some() {
                                        link_cache
                                            .lock()
                                            .await
                                            .insert(url.clone(), page.links.clone());
                                    }
                                    let depth = visited.depth(&url).await.unwrap_or(0);
                                    let children = Self::expand(
                                        &visited,
                                        &link_cache,
                                        page.links,
                                        depth + 1,
                                        max_depth,
                                    )
                                    .await;
                                    (url, children)
                                }
                                Err(e) => {
                                    pages_failed.fetch_add(1, Ordering::SeqCst);
                                    warn!("Crawl error for {}: {}", url, e);
                                    (url, Vec::new())
                                }
                            }
                        }
                        Work::Expand(url) => {
                            let links = link_cache.lock().await.get(&url).cloned().unwrap_or_default();
                            let depth = visited.depth(&url).await.unwrap_or(0);
                            debug!("[Worker {}] Re-expanding {} at depth {}", worker_id, url, depth);
                            let children =
                                Self::expand(&visited, &link_cache, links, depth + 1, max_depth).await;
                            (url, children)
                        }
                    };

                    if !children.is_empty() {
                        debug!(
                            "[Worker {}] Queuing {} links from {}",
                            worker_id,
                            children.len(),
                            url
                        );
                        // Reversed so the first anchor on the page is popped first
                        let mut queue = frontier.lock().await;
                        queue.extend(children.into_iter().rev());
                    }

                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        // Wait for all workers to complete
        futures::future::try_join_all(worker_handles).await?;

        let stats = CrawlStats {
            pages_fetched: pages_fetched.load(Ordering::SeqCst),
            pages_failed: pages_failed.load(Ordering::SeqCst),
            visited: visited.snapshot().await,
        };

        info!(
            "Crawl complete. Fetched {} pages ({} failed), {} sensitive so far",
            stats.pages_fetched,
            stats.pages_failed,
            sensitive.len().await
        );
        Ok(stats)
    }

    /// Record the links of a page reached at `child_depth - 1` and return the
    /// work they create. Links past the depth bound are neither queued nor
    /// marked visited.
    async fn expand(
        visited: &VisitedSet,
        link_cache: &LinkCache,
        links: Vec<String>,
        child_depth: usize,
        max_depth: Option<usize>,
    ) -> Vec<Work> {
        if max_depth.is_some_and(|max| child_depth > max) {
            return Vec::new();
        }

        let mut children = Vec::new();
        for link in links {
            match visited.visit(&link, child_depth).await {
                Visit::New => children.push(Work::Fetch(link)),
                // An unfetched page picks up its new depth when fetched
                Visit::Shallower if max_depth.is_some() => {
                    if link_cache.lock().await.contains_key(&link) {
                        children.push(Work::Expand(link));
                    }
                }
                _ => {}
            }
        }
        children
    }

    /// Fetch one page, extract its candidate links and classify it
    pub async fn visit_page(
        client: &Client,
        url: &str,
        filter: &LinkFilter,
        keywords: &KeywordSet,
        match_paths: bool,
    ) -> Result<PageVisit> {
        debug!("Fetching {}", url);

        let response = client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;

        let links = filter.extract_links(&body, url);

        let detection = match keywords.find(&body) {
            Some(keyword) => Some(Detection::Content {
                keyword: keyword.to_string(),
            }),
            None if match_paths => keywords
                .find_in_path(url)
                .map(|keyword| Detection::Path { keyword }),
            None => None,
        };

        Ok(PageVisit {
            url: url.to_string(),
            status_code,
            content_type,
            links,
            detection,
        })
    }
}
