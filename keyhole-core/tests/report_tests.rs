// Tests for report generation functionality

use keyhole_core::report::{
    JSON_REPORT_FILE, ReportFormat, SENSITIVE_PAGES_FILE, TEXT_REPORT_FILE,
    generate_json_report, generate_sensitive_pages_list, generate_text_report, write_reports,
};
use keyhole_scanner::{Detection, ScanResult, SensitivePage};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn create_test_result() -> ScanResult {
    let mut result = ScanResult::new("http://example.com".to_string());
    result.sensitive_pages = vec![
        SensitivePage {
            url: "http://example.com/admin".to_string(),
            detection: Detection::Probe { status: 200 },
        },
        SensitivePage {
            url: "http://example.com/dashboard".to_string(),
            detection: Detection::Content {
                keyword: "Login".to_string(),
            },
        },
    ];
    result.probes_sent = 17;
    result.pages_visited = 4;
    result.pages_failed = 1;
    result.duration = Duration::from_millis(1500);
    result
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), None);
}

// ============================================================================
// Text Artifact Tests
// ============================================================================

#[test]
fn test_sensitive_pages_list_is_line_per_url() {
    let list = generate_sensitive_pages_list(&create_test_result());
    assert_eq!(
        list,
        "http://example.com/admin\nhttp://example.com/dashboard\n"
    );
}

#[test]
fn test_sensitive_pages_list_empty() {
    let result = ScanResult::new("http://example.com".to_string());
    assert_eq!(generate_sensitive_pages_list(&result), "");
}

#[test]
fn test_text_report_layout() {
    let report = generate_text_report(&create_test_result());
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[1], "Scan report for: http://example.com");
    assert_eq!(lines[2], "Sensitive Pages Found:");
    assert_eq!(lines[3], "http://example.com/admin");
    assert_eq!(lines[4], "http://example.com/dashboard");
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "Total Potentially Sensitive Pages Found: 2");
    assert!(!report.ends_with('\n'));
}

#[test]
fn test_text_report_with_no_pages() {
    let result = ScanResult::new("https://quiet.example".to_string());
    let report = generate_text_report(&result);

    assert!(report.contains("Scan report for: https://quiet.example"));
    assert!(report.ends_with("Total Potentially Sensitive Pages Found: 0"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&create_test_result()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "Keyhole");
    assert_eq!(report["scan"]["target"], "http://example.com");
    assert_eq!(report["scan"]["probes_sent"], 17);
    assert_eq!(report["scan"]["pages_failed"], 1);
    assert_eq!(report["summary"]["total_sensitive_pages"], 2);
    assert_eq!(report["summary"]["by_detection"]["probe"], 1);
    assert_eq!(report["summary"]["by_detection"]["content"], 1);
    assert_eq!(report["summary"]["by_detection"]["path"], 0);

    let pages = report["sensitive_pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["url"], "http://example.com/admin");
    assert_eq!(pages[0]["detection"]["kind"], "probe");
    assert_eq!(pages[0]["detection"]["status"], 200);
    assert_eq!(pages[1]["detection"]["kind"], "content");
    assert_eq!(pages[1]["detection"]["keyword"], "Login");
}

// ============================================================================
// Report Persistence Tests
// ============================================================================

#[test]
fn test_write_reports_text() {
    let dir = TempDir::new().unwrap();
    let written = write_reports(&create_test_result(), dir.path(), ReportFormat::Text).unwrap();

    assert_eq!(written.len(), 2);
    let pages = fs::read_to_string(dir.path().join(SENSITIVE_PAGES_FILE)).unwrap();
    assert_eq!(pages.lines().count(), 2);
    let report = fs::read_to_string(dir.path().join(TEXT_REPORT_FILE)).unwrap();
    assert!(report.contains("Total Potentially Sensitive Pages Found: 2"));
    assert!(!dir.path().join(JSON_REPORT_FILE).exists());
}

#[test]
fn test_write_reports_json_creates_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("runs").join("latest");

    let written = write_reports(&create_test_result(), &nested, ReportFormat::Json).unwrap();

    assert_eq!(written.len(), 3);
    assert!(nested.join(JSON_REPORT_FILE).exists());
    let json = fs::read_to_string(nested.join(JSON_REPORT_FILE)).unwrap();
    assert!(json.contains("\"total_sensitive_pages\": 2"));
}
