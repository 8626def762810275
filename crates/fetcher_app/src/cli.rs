//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use serde::Deserialize;

/// Environment variable overriding the extraction endpoint.
pub const ENDPOINT_ENV: &str = "MEDIA_FETCHER_ENDPOINT";

/// Download a public video through the extraction service.
///
/// URLs are taken from the arguments, or from stdin (one per line) when none
/// are given. Each one is submitted only after the previous one finished.
#[derive(Parser, Debug)]
#[command(name = "media-fetcher")]
#[command(author, version, about)]
pub struct Args {
    /// Video links to download
    pub urls: Vec<String>,

    /// Session-cookie export (cookies.txt) forwarded to the backend
    #[arg(short = 'c', long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Allow submissions without a cookies file
    #[arg(long)]
    pub cookies_optional: bool,

    /// Extraction endpoint that receives the POST
    #[arg(long, env = ENDPOINT_ENV, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request body encoding expected by the backend
    #[arg(long, value_enum)]
    pub encoding: Option<Encoding>,

    /// Directory that receives the saved file
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Overall request timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// RON config file (defaults to ./media-fetcher.ron when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the log to this file (only to this file with --quiet)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output on the terminal
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
pub enum Encoding {
    Multipart,
    UrlEncoded,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet && self.log_file.is_none() {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Where log lines go; `--quiet` keeps them off the terminal when a log file is set.
    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.quiet) {
            (Some(path), true) => LogDestination::File(path.clone()),
            (Some(path), false) => LogDestination::Both(path.clone()),
            (None, _) => LogDestination::Terminal,
        }
    }
}
