//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use calendar_pipeline::{EventKeywordDictionary, KeywordRules, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub notification: NotificationConfig,
    pub source: SourceConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub webhook_url: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout() -> u64 {
    10
}

/// Where the rendered calendar markup comes from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Plain HTTP GET of an already-rendered page
    Http {
        url: String,
        user_agent: Option<String>,
        #[serde(default = "default_source_timeout")]
        timeout_secs: u64,
    },
    /// Snapshot written by an external headless renderer
    File { path: PathBuf },
}

fn default_source_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// Path to the JSON keyword dictionary
    pub keywords: PathBuf,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    pub hard_macro: Option<Vec<String>>,
    pub soft_macro: Option<Vec<String>>,
}

fn default_utc_offset() -> i32 {
    calendar_pipeline::config::DEFAULT_UTC_OFFSET_HOURS
}

impl AppConfig {
    /// Build the pipeline configuration around a loaded dictionary
    pub fn pipeline_config(&self, dictionary: EventKeywordDictionary) -> PipelineConfig {
        let defaults = KeywordRules::default();
        let rules = KeywordRules::new(
            self.calendar.hard_macro.clone().unwrap_or(defaults.hard_macro),
            self.calendar.soft_macro.clone().unwrap_or(defaults.soft_macro),
        );

        PipelineConfig::new(dictionary)
            .with_rules(rules)
            .with_utc_offset_hours(self.calendar.utc_offset_hours)
    }

    /// Resolve relative paths against the directory holding the config file
    fn resolve_paths(&mut self, base: &Path) {
        if self.calendar.keywords.is_relative() {
            self.calendar.keywords = base.join(&self.calendar.keywords);
        }
        if let SourceConfig::File { path } = &mut self.source {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.notification.webhook_url.trim().is_empty() {
            bail!("notification.webhook_url must not be empty");
        }
        if let SourceConfig::Http { url, .. } = &self.source {
            if url.trim().is_empty() {
                bail!("source.url must not be empty");
            }
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config.validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);

    Ok(config)
}

/// Load the keyword dictionary (currencies + event translations) from JSON
pub fn load_dictionary(path: &Path) -> Result<EventKeywordDictionary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyword dictionary: {:?}", path))?;

    let dictionary = EventKeywordDictionary::from_json_str(&content)
        .with_context(|| format!("Failed to parse keyword dictionary: {:?}", path))?;

    log::debug!(
        "Loaded {} currencies and {} event names from {:?}",
        dictionary.currencies.len(),
        dictionary.events.len(),
        path
    );
    Ok(dictionary)
}
