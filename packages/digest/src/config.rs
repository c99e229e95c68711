//! Configuration loading.
//!
//! Precedence, lowest first: built-in defaults, TOML file, CLI flags.
//! Secrets only ever come from the environment (`.env` is loaded first).

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use curation::{AggregatorConfig, CurationConfig, ScoringConfig, SummarizerConfig};

use crate::Cli;

/// Config file read when `--config` is not given, if present.
pub const DEFAULT_CONFIG_PATH: &str = "digest.toml";

const DEFAULT_DATABASE_URL: &str = "sqlite://digest.db?mode=rwc";

/// Tunables, as read from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub aggregator: AggregatorConfig,
    pub scoring: ScoringConfig,
    pub summarizer: SummarizerConfig,
    pub schedule: ScheduleConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Daily run time, `HH:MM` (UTC)
    pub time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            time: "09:00".to_string(),
        }
    }
}

impl ScheduleConfig {
    /// Parse `time` into hour and minute.
    pub fn hour_minute(&self) -> Result<(u32, u32)> {
        let Some((h, m)) = self.time.trim().split_once(':') else {
            bail!("schedule time must be HH:MM, got {:?}", self.time);
        };
        let hour: u32 = h.parse().with_context(|| format!("invalid hour in {:?}", self.time))?;
        let minute: u32 = m
            .parse()
            .with_context(|| format!("invalid minute in {:?}", self.time))?;
        if hour > 23 || minute > 59 {
            bail!("schedule time out of range: {:?}", self.time);
        }
        Ok((hour, minute))
    }

    /// Six-field cron expression firing once a day at `time`.
    pub fn cron_expression(&self) -> Result<String> {
        let (hour, minute) = self.hour_minute()?;
        Ok(format!("0 {} {} * * *", minute, hour))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the Markdown reports
    pub report_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("reports"),
        }
    }
}

impl DigestConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    tracing::debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration file loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(days) = cli.days {
            self.aggregator.lookback_days = days;
        }
        if let Some(top) = cli.top {
            self.aggregator.top_n = top;
        }
        if let Some(categories) = cli.categories.as_ref().filter(|c| !c.is_empty()) {
            self.aggregator.categories = categories.clone();
        }
        if let Some(time) = &cli.time {
            self.schedule.time = time.clone();
        }
        if let Some(dir) = &cli.report_dir {
            self.output.report_dir = dir.clone();
        }
    }

    /// The part of the config the curation library consumes.
    pub fn curation(&self) -> CurationConfig {
        CurationConfig {
            aggregator: self.aggregator.clone(),
            scoring: self.scoring.clone(),
            summarizer: self.summarizer.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.curation().validate().context("Invalid configuration")?;
        self.schedule.hour_minute()?;
        Ok(())
    }
}

/// Credentials and connection strings from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub has_openai_key: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub s2_api_key: Option<String>,
    pub crossref_mailto: Option<String>,
    pub database_url: String,
}

impl Secrets {
    /// Read from the process environment. Call after `dotenvy::dotenv()`.
    ///
    /// `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL` are read by
    /// the LLM client itself; only presence is recorded here.
    pub fn from_env() -> Self {
        Self {
            has_openai_key: env_opt("OPENAI_API_KEY").is_some(),
            telegram_bot_token: env_opt("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: env_opt("TELEGRAM_CHAT_ID"),
            s2_api_key: env_opt("S2_API_KEY"),
            crossref_mailto: env_opt("CROSSREF_MAILTO"),
            database_url: env_opt("DIGEST_DB_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        }
    }

    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("has_openai_key", &self.has_openai_key)
            .field("has_telegram", &self.has_telegram())
            .field("has_s2_api_key", &self.s2_api_key.is_some())
            .field("crossref_mailto", &self.crossref_mailto)
            .field("database_url", &self.database_url)
            .finish()
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use curation::OutputLanguage;

    #[test]
    fn test_defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.aggregator.top_n, 5);
        assert_eq!(config.schedule.time, "09:00");
        assert_eq!(config.output.report_dir, PathBuf::from("reports"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = DigestConfig::from_toml(
            r#"
            [aggregator]
            categories = ["cs.CL"]
            top_n = 3
            research_interests = "retrieval-augmented generation"

            [scoring.weights]
            citation = 50.0
            keyword = 50.0

            [scoring.keyword]
            keywords = ["retrieval", "rag"]

            [summarizer]
            language = "zh"

            [schedule]
            time = "07:30"
            "#,
        )
        .unwrap();

        assert_eq!(config.aggregator.categories, vec!["cs.CL"]);
        assert_eq!(config.aggregator.top_n, 3);
        assert_eq!(config.aggregator.lookback_days, 2);
        assert_eq!(config.aggregator.interests(), Some("retrieval-augmented generation"));
        assert_eq!(config.aggregator.relevance_limit, 10);
        assert_eq!(config.scoring.weights.len(), 2);
        assert_eq!(config.scoring.keyword.keywords, vec!["retrieval", "rag"]);
        assert_eq!(config.summarizer.language, OutputLanguage::Chinese);
        assert_eq!(config.schedule.cron_expression().unwrap(), "0 30 7 * * *");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(DigestConfig::from_toml("[aggregator]\ntop_n = \"five\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = DigestConfig::from_toml("[aggregator]\ntop_n = 3").unwrap();
        let cli = Cli::parse_from([
            "arxiv-digest",
            "--top",
            "8",
            "--days",
            "1",
            "--categories",
            "cs.LG",
            "stat.ML",
            "--time",
            "21:15",
        ]);
        config.apply_cli(&cli);

        assert_eq!(config.aggregator.top_n, 8);
        assert_eq!(config.aggregator.lookback_days, 1);
        assert_eq!(config.aggregator.categories, vec!["cs.LG", "stat.ML"]);
        assert_eq!(config.schedule.hour_minute().unwrap(), (21, 15));
    }

    #[test]
    fn test_schedule_time_validation() {
        for bad in ["24:00", "9", "09:60", "ab:cd", ""] {
            let schedule = ScheduleConfig {
                time: bad.to_string(),
            };
            assert!(schedule.hour_minute().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = DigestConfig::default();
        config.aggregator.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        assert!(DigestConfig::load(Some(Path::new("/nonexistent/digest.toml"))).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digest.toml");
        std::fs::write(&path, "[output]\nreport_dir = \"out\"").unwrap();

        let config = DigestConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output.report_dir, PathBuf::from("out"));
    }
}
