// Shared traversal state. Both sets only ever grow during a run.

use crate::result::{Detection, SensitivePage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of recording a link in the [`VisitedSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First sighting; the caller owns its traversal
    New,
    /// Already known, but now reached in fewer hops
    Shallower,
    /// Already known at the same or a smaller depth
    Known,
}

/// URLs already scheduled for traversal, with the smallest depth each was
/// reached at
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashMap<String, usize>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert at depth 0. Returns true if the URL was not
    /// present before.
    pub async fn insert(&self, url: &str) -> bool {
        self.visit(url, 0).await == Visit::New
    }

    /// Record `url` as reached at `depth`, lowering its stored depth when
    /// this path is shorter. Check and update happen under one lock.
    pub async fn visit(&self, url: &str, depth: usize) -> Visit {
        let mut visited = self.inner.lock().await;
        match visited.get_mut(url) {
            None => {
                visited.insert(url.to_string(), depth);
                Visit::New
            }
            Some(known) if depth < *known => {
                *known = depth;
                Visit::Shallower
            }
            Some(_) => Visit::Known,
        }
    }

    pub async fn depth(&self, url: &str) -> Option<usize> {
        self.inner.lock().await.get(url).copied()
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains_key(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.inner.lock().await.keys().cloned().collect();
        urls.sort();
        urls
    }
}

/// URLs flagged as sensitive, keyed by URL. The first detection recorded
/// for a URL is kept.
#[derive(Debug, Clone, Default)]
pub struct SensitivePages {
    inner: Arc<Mutex<HashMap<String, Detection>>>,
}

impl SensitivePages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL was newly added
    pub async fn insert(&self, url: &str, detection: Detection) -> bool {
        let mut pages = self.inner.lock().await;
        if pages.contains_key(url) {
            return false;
        }
        pages.insert(url.to_string(), detection);
        true
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains_key(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<SensitivePage> {
        let pages = self.inner.lock().await;
        let mut snapshot: Vec<SensitivePage> = pages
            .iter()
            .map(|(url, detection)| SensitivePage {
                url: url.clone(),
                detection: detection.clone(),
            })
            .collect();
        snapshot.sort_by(|a, b| a.url.cmp(&b.url));
        snapshot
    }
}
