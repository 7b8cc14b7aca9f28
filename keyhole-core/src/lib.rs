pub mod report;
pub mod scan;

use colored::Colorize;

pub use report::{ReportFormat, write_reports};
pub use scan::{ScanOptions, ScanProgressCallback, execute_scan};

pub fn print_banner() {
    println!(
        "{}",
        r#"
  _              _           _
 | | _____ _   _| |__   ___ | | ___
 | |/ / _ \ | | | '_ \ / _ \| |/ _ \
 |   <  __/ |_| | | | | (_) | |  __/
 |_|\_\___|\__, |_| |_|\___/|_|\___|
           |___/"#
            .bright_cyan()
            .bold()
    );
    println!(
        "  {} {}\n",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "sensitive page prober - for authorized testing only".bright_black()
    );
}
