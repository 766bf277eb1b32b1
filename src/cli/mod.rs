//! CLI module for Tubebrief.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{ConsoleObserver, Output};

use clap::{ArgGroup, Parser};

/// Tubebrief - YouTube summaries, delivered
///
/// Classifies and summarizes YouTube videos with a generative model, saves
/// each one to a Notion database and pushes a daily digest of the news to LINE.
#[derive(Parser, Debug)]
#[command(name = "tubebrief")]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["url", "channel"])
))]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// YouTube video URL or ID to process
    #[arg(long)]
    pub url: Option<String>,

    /// YouTube channel ID(s), comma separated
    #[arg(long)]
    pub channel: Option<String>,

    /// Number of latest videos per channel (default from config: 5)
    #[arg(long)]
    pub count: Option<usize>,

    /// Skip saving to Notion and sending to LINE
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_url_or_channel() {
        assert!(Cli::try_parse_from(["tubebrief"]).is_err());
        assert!(Cli::try_parse_from(["tubebrief", "--dry-run"]).is_err());
    }

    #[test]
    fn test_url_and_channel_together() {
        let cli = Cli::try_parse_from([
            "tubebrief",
            "--url",
            "https://youtu.be/dQw4w9WgXcQ",
            "--channel",
            "UCa,UCb",
            "--count",
            "2",
            "--dry-run",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
        assert_eq!(cli.channel.as_deref(), Some("UCa,UCb"));
        assert_eq!(cli.count, Some(2));
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_count_must_be_number() {
        assert!(Cli::try_parse_from(["tubebrief", "--channel", "UCa", "--count", "many"]).is_err());
    }
}
