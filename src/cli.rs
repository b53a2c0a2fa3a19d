//! Command-line interface definitions for the headline scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also come from the YAML config file; explicit flags
//! always override file-supplied values (see [`crate::config`]).

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Command-line arguments for the headline scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape with the default selectors
/// headline_scraper https://www.bbc.com/news
///
/// # Custom selectors, capped result count, JSON output
/// headline_scraper https://www.bbc.com/news \
///     -s "a.gs-c-promo-heading" -s h2 --max-records 25 --format json
///
/// # Everything from a config file
/// headline_scraper --config scraper.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Target URL (HTML page or RSS/Atom feed)
    pub url: Option<String>,

    /// CSS selector to try, in order; repeat for multiple selectors
    #[arg(short, long = "selector")]
    pub selectors: Vec<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Per-attempt request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Retry attempts after the first, for transient failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Base backoff delay in seconds (doubles each retry unless --constant-backoff)
    #[arg(long)]
    pub backoff_base: Option<f64>,

    /// Use a fixed delay between retries instead of exponential backoff
    #[arg(long)]
    pub constant_backoff: bool,

    /// Stop after this many headlines
    #[arg(short = 'n', long)]
    pub max_records: Option<usize>,

    /// Skip headlines shorter than this many characters
    #[arg(long)]
    pub min_title_len: Option<usize>,

    /// Drop headlines for which no absolute link resolves
    #[arg(long)]
    pub require_links: bool,

    /// User-Agent header to send
    #[arg(long, env = "SCRAPER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Output file path (a timestamped name is generated when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Open the text report in the system viewer after writing
    #[arg(long)]
    pub open: bool,
}

/// Which report files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Txt,
    Json,
    Both,
}

impl OutputFormat {
    pub fn wants_txt(self) -> bool {
        matches!(self, OutputFormat::Txt | OutputFormat::Both)
    }

    pub fn wants_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "headline_scraper",
            "https://www.bbc.com/news",
            "--selector",
            "a.gs-c-promo-heading",
            "--selector",
            "h2",
            "--max-records",
            "25",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://www.bbc.com/news"));
        assert_eq!(cli.selectors, vec!["a.gs-c-promo-heading", "h2"]);
        assert_eq!(cli.max_records, Some(25));
        assert!(!cli.insecure);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "headline_scraper",
            "https://example.com",
            "-s",
            ".headline",
            "-n",
            "10",
            "-f",
            "json",
            "-k",
        ]);

        assert_eq!(cli.selectors, vec![".headline"]);
        assert_eq!(cli.max_records, Some(10));
        assert_eq!(cli.output_format, Some(OutputFormat::Json));
        assert!(cli.insecure);
    }

    #[test]
    fn test_cli_config_only() {
        let cli = Cli::parse_from(["headline_scraper", "--config", "scraper.yaml"]);
        assert!(cli.url.is_none());
        assert_eq!(cli.config.as_deref(), Some("scraper.yaml"));
    }

    #[test]
    fn test_output_format_helpers() {
        assert!(OutputFormat::Both.wants_txt());
        assert!(OutputFormat::Both.wants_json());
        assert!(OutputFormat::Txt.wants_txt());
        assert!(!OutputFormat::Txt.wants_json());
        assert!(!OutputFormat::Json.wants_txt());
    }
}
