use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use keyhole_core::report::{ReportFormat, generate_console_summary, write_reports};
use keyhole_scanner::{KeywordSet, client::build_client};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use url::Url;

pub use keyhole_core::scan::{ScanOptions, ScanProgressCallback, execute_scan, extract_url_path};

const ACCESS_FAILURE: &str =
    "Failed to access the given URL. Please ensure the URL is valid and can be accessed!!";

/// Clap value parser for the scan target. Keeps the text as typed so that
/// substring scoping sees exactly what the user entered.
pub fn parse_target(value: &str) -> Result<String, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid URL '{}': {}", value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        other => Err(format!("unsupported scheme '{}', expected http or https", other)),
    }
}

/// Load whitelist substrings from a file, one per line
pub fn load_whitelist_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read whitelist file {}: {}", path.display(), e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Command-line entries first, then file entries, without duplicates
pub fn merge_whitelist(cli: Vec<String>, file: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(cli.len() + file.len());
    for entry in cli.into_iter().chain(file) {
        if !merged.contains(&entry) {
            merged.push(entry);
        }
    }
    merged
}

pub fn load_keywords(path: Option<&PathBuf>) -> anyhow::Result<KeywordSet> {
    match path {
        Some(path) => KeywordSet::load(path)
            .with_context(|| format!("Failed to load keywords from {}", path.display())),
        None => Ok(KeywordSet::default()),
    }
}

/// Check the target answers a GET with a success status
pub async fn validate_target(url: &str, timeout_secs: u64) -> Result<(), String> {
    let client = build_client(timeout_secs).map_err(|e| e.to_string())?;
    client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    // A subscriber may already be installed when handlers run more than once
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn output_dir(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    Path::new(expanded.as_ref()).to_path_buf()
}

pub async fn handle_scan(sub_matches: &ArgMatches, quiet: bool) {
    init_logging(sub_matches.get_flag("verbose"));

    let target = sub_matches
        .get_one::<String>("URL")
        .cloned()
        .unwrap_or_default();
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = output_dir(
        sub_matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or("."),
    );

    let cli_whitelist: Vec<String> = sub_matches
        .get_many::<String>("whitelist")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let file_whitelist = match sub_matches.get_one::<PathBuf>("whitelist-file") {
        Some(path) => match load_whitelist_from_file(path) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        None => Vec::new(),
    };
    let whitelist = merge_whitelist(cli_whitelist, file_whitelist);

    let keywords = match load_keywords(sub_matches.get_one::<PathBuf>("keywords-file")) {
        Ok(keywords) => keywords,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = validate_target(&target, timeout_secs).await {
        eprintln!("{}", ACCESS_FAILURE.yellow());
        tracing::debug!("target validation failed: {}", e);
        if sub_matches.get_flag("strict") {
            std::process::exit(1);
        }
    }

    if !quiet {
        println!("\n{} {}", "Scanning".bright_white().bold(), target.bright_white());
        println!("Workers: {}", threads);
        println!("Keywords: {}", keywords.len());
        if !whitelist.is_empty() {
            println!("Whitelist: {}", whitelist.join(", "));
        }
        println!();
    }

    let mut options = ScanOptions::new(target);
    options.whitelist = whitelist;
    options.keywords = keywords;
    options.threads = threads;
    options.timeout_secs = timeout_secs;
    options.max_depth = sub_matches.get_one::<usize>("max-depth").copied();
    options.max_pages = sub_matches.get_one::<usize>("max-pages").copied();
    options.resolve_relative = sub_matches.get_flag("resolve-relative");
    options.match_paths = sub_matches.get_flag("match-paths");
    options.probe = !sub_matches.get_flag("no-probe");
    options.show_progress_bars = !quiet;

    let progress_callback: ScanProgressCallback = Arc::new(move |msg: String| {
        if !quiet {
            println!("{}", msg);
        }
    });

    let result = match execute_scan(options, Some(progress_callback)).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let written = match write_reports(&result, &output, format) {
        Ok(written) => written,
        Err(e) => {
            eprintln!(
                "{} Failed to write reports to {}: {}",
                "✗".red().bold(),
                output.display(),
                e
            );
            std::process::exit(1);
        }
    };

    println!();
    print!("{}", generate_console_summary(&result));
    if !quiet {
        for path in written {
            println!("{} {}", "→".blue(), path.display());
        }
    }
}

pub fn handle_keywords(sub_matches: &ArgMatches) {
    match load_keywords(sub_matches.get_one::<PathBuf>("keywords-file")) {
        Ok(keywords) => {
            for token in keywords.tokens() {
                println!("{}", token);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
