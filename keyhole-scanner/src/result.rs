use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a page was flagged as sensitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    /// A guessed keyword path answered with this status
    Probe { status: u16 },
    /// The page body contains the keyword
    Content { keyword: String },
    /// The page URL itself contains the keyword
    Path { keyword: String },
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::Probe { status } => write!(f, "probe (HTTP {})", status),
            Detection::Content { keyword } => write!(f, "content match '{}'", keyword),
            Detection::Path { keyword } => write!(f, "path match '{}'", keyword),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivePage {
    pub url: String,
    pub detection: Detection,
}

/// Counters reported by a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages actually requested, failed ones included
    pub pages_fetched: usize,
    pub pages_failed: usize,
    /// Every URL scheduled during this crawl, sorted
    pub visited: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub target: String,
    /// Sorted by URL
    pub sensitive_pages: Vec<SensitivePage>,
    pub probes_sent: usize,
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub duration: Duration,
}

impl ScanResult {
    pub fn new(target: String) -> Self {
        Self {
            target,
            sensitive_pages: Vec::new(),
            probes_sent: 0,
            pages_visited: 0,
            pages_failed: 0,
            duration: Duration::from_secs(0),
        }
    }

    pub fn count(&self) -> usize {
        self.sensitive_pages.len()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.sensitive_pages.iter().map(|page| page.url.as_str())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.sensitive_pages.iter().any(|page| page.url == url)
    }
}
