// Report generation for finished scans

use colored::Colorize;
use keyhole_scanner::ScanResult;
use keyhole_scanner::result::Detection;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SENSITIVE_PAGES_FILE: &str = "sensitive_pages.txt";
pub const TEXT_REPORT_FILE: &str = "scan_report.txt";
pub const JSON_REPORT_FILE: &str = "scan_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One URL per line, in the order of the result
pub fn generate_sensitive_pages_list(result: &ScanResult) -> String {
    let mut list = String::new();
    for url in result.urls() {
        list.push_str(url);
        list.push('\n');
    }
    list
}

pub fn generate_text_report(result: &ScanResult) -> String {
    let mut report = String::new();

    report.push_str("Keyhole sensitive page scan - for authorized security testing only.\n");
    report.push_str(&format!("Scan report for: {}\n", result.target));
    report.push_str("Sensitive Pages Found:\n");
    for url in result.urls() {
        report.push_str(url);
        report.push('\n');
    }
    report.push_str(&format!(
        "\nTotal Potentially Sensitive Pages Found: {}",
        result.count()
    ));

    report
}

pub fn generate_json_report(result: &ScanResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Keyhole",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "disclaimer": "For authorized security testing only"
            },
            "scan": {
                "target": result.target,
                "duration_seconds": result.duration.as_secs_f64(),
                "probes_sent": result.probes_sent,
                "pages_visited": result.pages_visited,
                "pages_failed": result.pages_failed
            },
            "summary": {
                "total_sensitive_pages": result.count(),
                "by_detection": {
                    "probe": count_detections(result, |d| matches!(d, Detection::Probe { .. })),
                    "content": count_detections(result, |d| matches!(d, Detection::Content { .. })),
                    "path": count_detections(result, |d| matches!(d, Detection::Path { .. }))
                }
            },
            "sensitive_pages": result.sensitive_pages
        }
    });

    serde_json::to_string_pretty(&json_report)
}

fn count_detections(result: &ScanResult, predicate: impl Fn(&Detection) -> bool) -> usize {
    result
        .sensitive_pages
        .iter()
        .filter(|page| predicate(&page.detection))
        .count()
}

/// Colored summary for the terminal, one line per page with its reason
pub fn generate_console_summary(result: &ScanResult) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));
    summary.push_str(&format!(
        "  {} {}\n",
        "SCAN SUMMARY".bright_white().bold(),
        result.target.bright_white()
    ));
    summary.push_str(&format!("{}\n\n", "═".repeat(60).bright_blue().bold()));

    summary.push_str(&format!(
        "  Probes sent:   {}\n",
        result.probes_sent.to_string().cyan()
    ));
    summary.push_str(&format!(
        "  Pages crawled: {}\n",
        result.pages_visited.to_string().cyan()
    ));
    if result.pages_failed > 0 {
        summary.push_str(&format!(
            "  Failed pages:  {}\n",
            result.pages_failed.to_string().yellow()
        ));
    }
    summary.push_str(&format!(
        "  Duration:      {:.1}s\n\n",
        result.duration.as_secs_f64()
    ));

    for page in &result.sensitive_pages {
        let marker = match page.detection {
            Detection::Probe { .. } => "●".red().bold(),
            Detection::Content { .. } => "●".yellow().bold(),
            Detection::Path { .. } => "●".blue().bold(),
        };
        summary.push_str(&format!(
            "  {} {} {}\n",
            marker,
            page.url,
            format!("[{}]", page.detection).bright_black()
        ));
    }

    summary.push_str(&format!(
        "\nTotal Potentially Sensitive Pages Discovered: {}\n",
        result.count().to_string().green().bold()
    ));

    summary
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Write the URL listing and the text report into `dir`, plus the JSON
/// report when requested. Returns the paths written.
pub fn write_reports(
    result: &ScanResult,
    dir: &Path,
    format: ReportFormat,
) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();

    let pages_path = dir.join(SENSITIVE_PAGES_FILE);
    save_report(&generate_sensitive_pages_list(result), &pages_path)?;
    written.push(pages_path);

    let report_path = dir.join(TEXT_REPORT_FILE);
    save_report(&generate_text_report(result), &report_path)?;
    written.push(report_path);

    if format == ReportFormat::Json {
        let json = generate_json_report(result)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let json_path = dir.join(JSON_REPORT_FILE);
        save_report(&json, &json_path)?;
        written.push(json_path);
    }

    Ok(written)
}
