// Organic discovery: guess sensitive paths directly from the keyword list

use crate::client::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::context::SensitivePages;
use crate::keywords::KeywordSet;
use crate::result::Detection;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, info};

pub type ProbeCallback = Arc<dyn Fn(String) + Send + Sync>;

pub struct PathProber {
    client: Client,
    keywords: Arc<KeywordSet>,
    progress_callback: Option<ProbeCallback>,
}

impl PathProber {
    pub fn new(client: Client, keywords: Arc<KeywordSet>) -> Self {
        Self {
            client,
            keywords,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProbeCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Request `target/<keyword>` for every keyword, one after the other, and
    /// record each URL that answers 200. Returns the number of probes sent.
    pub async fn probe(&self, target: &str, sensitive: &SensitivePages) -> usize {
        info!(
            "Probing {} keyword paths under {}",
            self.keywords.len(),
            target
        );

        let mut probes_sent = 0;
        for keyword in self.keywords.tokens() {
            let url = build_probe_url(target, keyword);
            probes_sent += 1;

            if let Some(ref callback) = self.progress_callback {
                callback(url.clone());
            }

            if self.exists(&url).await {
                debug!("Probe hit: {}", url);
                sensitive.insert(&url, Detection::Probe { status: 200 }).await;
            }
        }

        probes_sent
    }

    async fn exists(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("Probe {} -> {}", url, status);
                status == StatusCode::OK
            }
            Err(e) => {
                debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Candidate URL for a keyword: the target, a single `/`, then the keyword
pub fn build_probe_url(target: &str, keyword: &str) -> String {
    format!("{}/{}", target.trim_end_matches('/'), keyword)
}

/// Probe every keyword path under `target` with a default client
pub async fn probe_organic_pages(target: &str, keywords: &KeywordSet) -> Vec<String> {
    let client = match build_client(DEFAULT_TIMEOUT_SECS) {
        Ok(client) => client,
        Err(e) => {
            debug!("Could not build HTTP client: {}", e);
            return Vec::new();
        }
    };

    let sensitive = SensitivePages::new();
    PathProber::new(client, Arc::new(keywords.clone()))
        .probe(target, &sensitive)
        .await;

    sensitive
        .snapshot()
        .await
        .into_iter()
        .map(|page| page.url)
        .collect()
}
