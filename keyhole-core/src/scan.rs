use indicatif::{ProgressBar, ProgressStyle};
use keyhole_scanner::{KeywordSet, ScanResult, Scanner};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Options for configuring a scan operation
pub struct ScanOptions {
    pub target: String,
    pub whitelist: Vec<String>,
    pub keywords: KeywordSet,
    pub threads: usize,
    pub timeout_secs: u64,
    pub max_depth: Option<usize>,
    pub max_pages: Option<usize>,
    pub resolve_relative: bool,
    pub match_paths: bool,
    pub probe: bool,
    pub show_progress_bars: bool,
}

impl ScanOptions {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            whitelist: Vec::new(),
            keywords: KeywordSet::default(),
            threads: 10,
            timeout_secs: 10,
            max_depth: None,
            max_pages: None,
            resolve_relative: false,
            match_paths: false,
            probe: true,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting scan progress messages
pub type ScanProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a scan with the given options
/// Returns the scan result, or an error message if the scan could not start
pub async fn execute_scan(
    options: ScanOptions,
    progress_callback: Option<ScanProgressCallback>,
) -> Result<ScanResult, String> {
    let ScanOptions {
        target,
        whitelist,
        keywords,
        threads,
        timeout_secs,
        max_depth,
        max_pages,
        resolve_relative,
        match_paths,
        probe,
        show_progress_bars,
    } = options;

    // Single spinner for overall scan progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| format!("Invalid progress template: {}", e))?,
        );
        pb.set_message("Starting scan...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let probe_count = Arc::new(AtomicUsize::new(0));
    let crawl_count = Arc::new(AtomicUsize::new(0));

    let mut scanner = Scanner::new(target.clone())
        .with_whitelist(whitelist)
        .with_keywords(keywords)
        .with_workers(threads)
        .with_timeout(timeout_secs)
        .with_max_depth(max_depth)
        .with_max_pages(max_pages)
        .with_relative_links(resolve_relative)
        .with_path_matching(match_paths)
        .with_probe(probe);

    if let Some(ref pb) = progress_bar {
        let pb_probe = pb.clone();
        let probe_count_clone = probe_count.clone();
        scanner = scanner.with_probe_callback(Arc::new(move |url: String| {
            let count = probe_count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_probe.set_message(format!(
                "Probing {} ({} paths tried)",
                extract_url_path(&url),
                count
            ));
            pb_probe.tick();
        }));

        let pb_crawl = pb.clone();
        let crawl_count_clone = crawl_count.clone();
        scanner = scanner.with_progress_callback(Arc::new(move |_worker_id: usize, url: String| {
            let count = crawl_count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_crawl.set_message(format!(
                "Crawling {} ({} pages fetched)",
                extract_url_path(&url),
                count
            ));
            pb_crawl.tick();
        }));
    }

    if let Some(ref callback) = progress_callback {
        let phases = if probe {
            "probing keyword paths, then crawling"
        } else {
            "crawling"
        };
        callback(format!("Scanning {}: {}", target, phases));
    }

    let result = scanner
        .scan()
        .await
        .map_err(|e| format!("Scan of {} failed: {}", target, e));

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        match result {
            Ok(ref result) => pb.finish_with_message(format!(
                "Scan complete! {} probes, {} pages crawled, {} sensitive",
                probe_count.load(Ordering::Relaxed),
                crawl_count.load(Ordering::Relaxed),
                result.count()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}
