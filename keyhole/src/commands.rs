use crate::CLAP_STYLING;
use clap::{arg, command};
use keyhole::handlers::parse_target;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("keyhole")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("keyhole")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Probe common sensitive paths on a site, then crawl its links and flag \
                pages whose content matches a sensitive keyword.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The target website URL")
                        .value_parser(parse_target),
                )
                .arg(
                    arg!(--"whitelist" <SUBSTRING>)
                        .required(false)
                        .num_args(1..)
                        .help("Links containing any of these substrings are never crawled (e.g. /public /about)"),
                )
                .arg(
                    arg!(-W --"whitelist-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of whitelist substrings")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-k --"keywords-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited keyword list (default: built-in list)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the crawl pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Do not follow links more than this many hops from the target (default: unbounded)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-pages" <PAGES>)
                        .required(false)
                        .help("Stop crawling after this many page fetches (default: unbounded)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"resolve-relative")
                        .required(false)
                        .help("Resolve relative links against the page they appear on (default: absolute links only)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"match-paths")
                        .required(false)
                        .help("Also flag crawled pages whose URL path contains a keyword")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-probe")
                        .required(false)
                        .help("Skip guessing <target>/<keyword> paths and only crawl")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write sensitive_pages.txt and scan_report.txt to")
                        .default_value("."),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json (json also writes scan_report.json)")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"strict")
                        .required(false)
                        .help("Abort if the target cannot be reached before scanning")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-v --"verbose")
                        .required(false)
                        .help("Log every probe, fetch and skipped link")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("keywords")
                .about("Print the keyword list used for probing and content matching")
                .arg(
                    arg!(-k --"keywords-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited keyword list (default: built-in list)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
