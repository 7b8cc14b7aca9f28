// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_keywords, load_whitelist_from_file, merge_whitelist, parse_target, validate_target,
};

// Re-export scan functionality from keyhole-core
pub use keyhole_core::scan::{ScanOptions, ScanProgressCallback, execute_scan, extract_url_path};
