//! Page source implementations
//!
//! The calendar only shows its impact markers and expanded rows after scripts
//! run, so production setups point `FilePageSource` at a snapshot written by a
//! headless renderer. `HttpPageSource` is for endpoints that serve the final
//! markup directly.

use crate::config::SourceConfig;
use anyhow::{Context, Result};
use calendar_pipeline::{CalendarError, PageSource};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Fetches markup with a blocking HTTP GET
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: impl Into<String>, user_agent: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl PageSource for HttpPageSource {
    fn fetch_rendered_markup(&self) -> calendar_pipeline::Result<String> {
        log::info!("Fetching calendar page: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| CalendarError::Transport(format!("GET {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Transport(format!("GET {} returned {}", self.url, status)));
        }

        response
            .text()
            .map_err(|e| CalendarError::Transport(format!("Failed to read response body: {}", e)))
    }
}

/// Reads markup from a pre-rendered snapshot file
pub struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for FilePageSource {
    fn fetch_rendered_markup(&self) -> calendar_pipeline::Result<String> {
        log::info!("Reading calendar snapshot: {:?}", self.path);
        std::fs::read_to_string(&self.path).map_err(|e| {
            CalendarError::Transport(format!("Failed to read snapshot {:?}: {}", self.path, e))
        })
    }
}

/// Build the configured page source
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn PageSource>> {
    match config {
        SourceConfig::Http { url, user_agent, timeout_secs } => Ok(Box::new(HttpPageSource::new(
            url.as_str(),
            user_agent.as_deref(),
            Duration::from_secs(*timeout_secs),
        )?)),
        SourceConfig::File { path } => Ok(Box::new(FilePageSource::new(path.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.html");
        std::fs::write(&path, "<table></table>").unwrap();

        let source = FilePageSource::new(&path);
        assert_eq!(source.fetch_rendered_markup().unwrap(), "<table></table>");
    }

    #[test]
    fn test_missing_snapshot_is_transport_error() {
        let source = FilePageSource::new("/nonexistent/snapshot.html");
        assert!(matches!(
            source.fetch_rendered_markup(),
            Err(CalendarError::Transport(_))
        ));
    }

    #[test]
    fn test_from_config_file_source() {
        let config = SourceConfig::File { path: PathBuf::from("snapshot.html") };
        assert!(from_config(&config).is_ok());
    }
}
