//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Resolve landing-page links into direct downloads and fetch them concurrently.
///
/// Reads one URL per line from the links file (`- ` prefixes allowed). When the
/// file does not exist, an example is written and the program exits with code 1.
#[derive(Parser, Debug)]
#[command(name = "ff-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// File listing the links to download [default: links.txt]
    #[arg(short = 'i', long)]
    pub links_file: Option<PathBuf>,

    /// Directory to save files into [default: ~/Downloads/FF_downloader]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Number of concurrent downloads (1-100) [default: 4]
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub workers: Option<u8>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Landing-page request timeout in seconds (1-3600) [default: 15]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub page_timeout: Option<u64>,

    /// File request connect/read timeout in seconds (1-3600) [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub fetch_timeout: Option<u64>,

    /// Host whose /dl/ links are extracted from landing pages [default: fuckingfast.co]
    #[arg(long)]
    pub direct_host: Option<String>,

    /// Path segment marking direct-download URLs [default: /dl/]
    #[arg(long)]
    pub direct_segment: Option<String>,

    /// Config file to load instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}
