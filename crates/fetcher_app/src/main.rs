//! CLI entry point for the media fetcher.

use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use engine_logging::engine_debug;

mod cli;
mod platform;

use cli::Args;

fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before logging, so --help works without logs)
    let args = Args::parse();

    engine_logging::initialize(&args.log_destination(), args.log_level());
    engine_debug!("CLI arguments parsed: {:?}", args);

    let file_config = platform::config::load_file_config(args.config.as_deref())?;
    let settings = platform::config::resolve(&args, file_config);

    let urls = if !args.urls.is_empty() {
        args.urls.clone()
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        parse_url_lines(&buffer)
    } else {
        eprintln!("No input provided. Pass a video URL or pipe URLs via stdin.");
        eprintln!("Example: media-fetcher -c cookies.txt https://youtu.be/<id>");
        return Ok(ExitCode::from(2));
    };

    let summary = platform::run_app(settings, urls)?;
    if !args.quiet && summary.succeeded + summary.failed > 1 {
        eprintln!(
            "Finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
    }
    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn parse_url_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_url_lines;

    #[test]
    fn stdin_lines_are_trimmed_and_filtered() {
        let input = "https://youtu.be/a \n\n  # comment\n  https://youtu.be/b\n   \n";
        assert_eq!(
            parse_url_lines(input),
            vec!["https://youtu.be/a".to_string(), "https://youtu.be/b".to_string()]
        );
    }
}
