pub mod client;
pub mod context;
pub mod crawler;
pub mod error;
pub mod keywords;
pub mod links;
pub mod prober;
pub mod result;
pub mod scan;

pub use context::{SensitivePages, VisitedSet};
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use keywords::{DEFAULT_KEYWORDS, KeywordSet};
pub use links::{LinkFilter, extract_links};
pub use prober::{PathProber, ProbeCallback, probe_organic_pages};
pub use result::{CrawlStats, Detection, ScanResult, SensitivePage};
pub use scan::{Scanner, scan};
