//! Configuration loading and merging.
//!
//! Parameters come from three layers, lowest precedence first:
//!
//! 1. Built-in defaults (browser-like User-Agent, common headline selectors)
//! 2. An optional YAML config file (key/value mapping, all keys optional)
//! 3. Explicit command-line flags, which always win
//!
//! The resolved [`ScrapeConfig`] is immutable for the rest of the run. The
//! fetch-specific subset is carried as an explicit [`FetchConfig`] value
//! rather than mutable shared session state.

use crate::cli::{Cli, OutputFormat};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Default User-Agent: a real-browser-like string to avoid anti-bot rejection.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Selectors tried, in order, when none are configured.
pub const DEFAULT_SELECTORS: [&str; 5] = ["h1", "h2", "h3", ".headline", ".title"];

/// Delay schedule applied between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// `delay = base * 2^attempt`, attempt index starting at 0.
    Exponential { base: Duration },
    /// `delay = base` for every retry (legacy mode).
    Constant { base: Duration },
}

impl BackoffPolicy {
    /// The delay to wait after the failed attempt with index `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            BackoffPolicy::Exponential { base } => {
                // Shift capped so a pathological retry count cannot overflow.
                let factor = 1u32 << attempt.min(20);
                base.saturating_mul(factor)
            }
            BackoffPolicy::Constant { base } => base,
        }
    }
}

/// Everything the fetch stage needs, as one explicit configuration object.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Additional attempts after the first, for transient failures only.
    pub max_retries: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// When false, TLS certificate errors are ignored.
    pub verify_tls: bool,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// The single target URL for this invocation.
    pub url: Option<String>,
    /// Ordered selector list; earlier selectors' matches come first in output.
    pub selectors: Vec<String>,
    pub fetch: FetchConfig,
    /// Stop extraction once this many records are accepted.
    pub max_records: Option<usize>,
    /// Records with fewer normalized characters than this are skipped.
    pub min_title_len: usize,
    /// Drop records for which no valid absolute link resolves.
    pub require_links: bool,
    /// Explicit output path; a timestamped name is generated when absent.
    pub output: Option<String>,
    pub output_format: OutputFormat,
    /// Open the text report in the OS viewer after writing.
    pub open_report: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            url: None,
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            fetch: FetchConfig {
                timeout: Duration::from_secs(10),
                max_retries: 3,
                backoff: BackoffPolicy::Exponential {
                    base: Duration::from_secs(2),
                },
                user_agent: DEFAULT_USER_AGENT.to_string(),
                verify_tls: true,
            },
            max_records: None,
            min_title_len: 5,
            require_links: false,
            output: None,
            output_format: OutputFormat::Both,
            open_report: false,
        }
    }
}

/// On-disk config file shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub selectors: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub backoff_base_secs: Option<f64>,
    pub constant_backoff: Option<bool>,
    pub user_agent: Option<String>,
    pub verify_tls: Option<bool>,
    pub max_records: Option<usize>,
    pub min_title_len: Option<usize>,
    pub require_links: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<OutputFormat>,
}

impl ScrapeConfig {
    /// Builds the effective configuration: defaults, then the config file (if
    /// any), then CLI flags. A file that cannot be read or parsed is logged
    /// and skipped rather than aborting the run.
    pub fn resolve(cli: &Cli) -> ScrapeConfig {
        let mut config = ScrapeConfig::default();

        if let Some(path) = &cli.config {
            match load_file(path) {
                Ok(file) => {
                    info!(path = %path, "Configuration loaded from file");
                    config.apply_file(file);
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to load config file; using defaults");
                }
            }
        }

        config.apply_cli(cli);
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if file.url.is_some() {
            self.url = file.url;
        }
        if let Some(selectors) = file.selectors {
            self.selectors = selectors;
        }
        if let Some(secs) = file.timeout_secs {
            self.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = file.max_retries {
            self.fetch.max_retries = n;
        }
        let base = file.backoff_base_secs.map(backoff_base);
        let constant = file.constant_backoff;
        self.set_backoff(base, constant);
        if let Some(ua) = file.user_agent {
            self.fetch.user_agent = ua;
        }
        if let Some(v) = file.verify_tls {
            self.fetch.verify_tls = v;
        }
        if file.max_records.is_some() {
            self.max_records = file.max_records;
        }
        if let Some(n) = file.min_title_len {
            self.min_title_len = n;
        }
        if let Some(r) = file.require_links {
            self.require_links = r;
        }
        if file.output.is_some() {
            self.output = file.output;
        }
        if let Some(f) = file.output_format {
            self.output_format = f;
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if cli.url.is_some() {
            self.url = cli.url.clone();
        }
        if !cli.selectors.is_empty() {
            self.selectors = cli.selectors.clone();
        }
        if let Some(secs) = cli.timeout {
            self.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = cli.max_retries {
            self.fetch.max_retries = n;
        }
        let base = cli.backoff_base.map(backoff_base);
        let constant = cli.constant_backoff.then_some(true);
        self.set_backoff(base, constant);
        if let Some(ua) = &cli.user_agent {
            self.fetch.user_agent = ua.clone();
        }
        if cli.insecure {
            self.fetch.verify_tls = false;
        }
        if cli.max_records.is_some() {
            self.max_records = cli.max_records;
        }
        if let Some(n) = cli.min_title_len {
            self.min_title_len = n;
        }
        if cli.require_links {
            self.require_links = true;
        }
        if cli.output.is_some() {
            self.output = cli.output.clone();
        }
        if let Some(f) = cli.output_format {
            self.output_format = f;
        }
        if cli.open {
            self.open_report = true;
        }
    }

    /// Applies a backoff base and/or policy switch on top of the current
    /// policy, keeping the other half unchanged.
    fn set_backoff(&mut self, base: Option<Duration>, constant: Option<bool>) {
        let current_base = match self.fetch.backoff {
            BackoffPolicy::Exponential { base } | BackoffPolicy::Constant { base } => base,
        };
        let base = base.unwrap_or(current_base);
        let constant = constant.unwrap_or(matches!(
            self.fetch.backoff,
            BackoffPolicy::Constant { .. }
        ));
        self.fetch.backoff = if constant {
            BackoffPolicy::Constant { base }
        } else {
            BackoffPolicy::Exponential { base }
        };
    }
}

/// A negative or non-finite backoff base is treated as zero delay.
fn backoff_base(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn load_file(path: &str) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let file: FileConfig = serde_yaml::from_str(&raw)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["headline_scraper"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::resolve(&cli(&["https://example.com/news"]));
        assert_eq!(config.url.as_deref(), Some("https://example.com/news"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.min_title_len, 5);
        assert!(config.fetch.verify_tls);
        assert_eq!(config.selectors, DEFAULT_SELECTORS.to_vec());
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let config = ScrapeConfig::resolve(&cli(&[
            "https://example.com/news",
            "--selector",
            "a.gs-c-promo-heading",
            "--selector",
            ".title",
            "--timeout",
            "5",
            "--max-retries",
            "1",
            "--backoff-base",
            "0.5",
            "--insecure",
            "--max-records",
            "7",
        ]));
        assert_eq!(config.selectors, vec!["a.gs-c-promo-heading", ".title"]);
        assert_eq!(config.fetch.timeout, Duration::from_secs(5));
        assert_eq!(config.fetch.max_retries, 1);
        assert_eq!(
            config.fetch.backoff,
            BackoffPolicy::Exponential {
                base: Duration::from_millis(500)
            }
        );
        assert!(!config.fetch.verify_tls);
        assert_eq!(config.max_records, Some(7));
    }

    #[test]
    fn test_constant_backoff_flag() {
        let config = ScrapeConfig::resolve(&cli(&[
            "https://example.com",
            "--constant-backoff",
            "--backoff-base",
            "2",
        ]));
        assert_eq!(
            config.fetch.backoff,
            BackoffPolicy::Constant {
                base: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn test_file_config_applies_and_cli_wins() {
        let mut config = ScrapeConfig::default();
        config.apply_file(FileConfig {
            url: Some("https://file.example.com".to_string()),
            timeout_secs: Some(30),
            max_retries: Some(9),
            ..Default::default()
        });
        assert_eq!(config.url.as_deref(), Some("https://file.example.com"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(30));

        config.apply_cli(&cli(&["https://cli.example.com", "--timeout", "3"]));
        assert_eq!(config.url.as_deref(), Some("https://cli.example.com"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(3));
        // File value not overridden on the CLI survives.
        assert_eq!(config.fetch.max_retries, 9);
    }

    #[test]
    fn test_yaml_parsing() {
        let file: FileConfig = serde_yaml::from_str(
            "url: https://example.com/rss.xml\n\
             selectors:\n  - h2\n  - .headline\n\
             backoff_base_secs: 1.5\n\
             constant_backoff: true\n\
             output_format: json\n",
        )
        .unwrap();
        assert_eq!(file.url.as_deref(), Some("https://example.com/rss.xml"));
        assert_eq!(file.selectors.as_deref(), Some(&["h2".to_string(), ".headline".to_string()][..]));
        assert_eq!(file.backoff_base_secs, Some(1.5));
        assert_eq!(file.constant_backoff, Some(true));
        assert_eq!(file.output_format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_exponential_delay_schedule() {
        let policy = BackoffPolicy::Exponential {
            base: Duration::from_secs(2),
        };
        assert_eq!(policy.delay(0), Duration::from_secs(2));
        assert_eq!(policy.delay(1), Duration::from_secs(4));
        assert_eq!(policy.delay(2), Duration::from_secs(8));
    }

    #[test]
    fn test_constant_delay_schedule() {
        let policy = BackoffPolicy::Constant {
            base: Duration::from_secs(2),
        };
        assert_eq!(policy.delay(0), Duration::from_secs(2));
        assert_eq!(policy.delay(5), Duration::from_secs(2));
    }
}
