//! Pipeline configuration types
//!
//! This module defines the immutable configuration every stage reads: the
//! keyword dictionary with its currency set, the ordered macro keyword lists,
//! and the target UTC offset. Loading these from disk is the application's job.

use crate::types::{CalendarError, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Hard upper bound on blocks per notification (transport payload limit)
pub const MAX_BLOCKS: usize = 10;

/// Offset of the reference deployment (UTC+8)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Keyword dictionary: tracked currencies plus English → localized event names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventKeywordDictionary {
    /// Currency codes to keep (e.g. "USD", "JPY")
    #[serde(default)]
    pub currencies: BTreeSet<String>,

    /// English event-name fragment → localized display name
    #[serde(default)]
    pub events: BTreeMap<String, String>,
}

impl EventKeywordDictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON keyword file format
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dictionary: Self = serde_json::from_str(json)
            .map_err(|e| CalendarError::Config(format!("Invalid keyword dictionary: {}", e)))?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    /// Builder method: track a currency
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currencies.insert(code.into());
        self
    }

    /// Builder method: add an event translation
    pub fn with_event(mut self, english: impl Into<String>, localized: impl Into<String>) -> Self {
        self.events.insert(english.into(), localized.into());
        self
    }

    /// Check if a currency code is tracked
    pub fn tracks_currency(&self, code: &str) -> bool {
        self.currencies.contains(code)
    }

    /// Exact-key display-name lookup with fallback to the English title
    pub fn display_name<'a>(&'a self, english_title: &'a str) -> &'a str {
        self.events
            .get(english_title)
            .map(String::as_str)
            .unwrap_or(english_title)
    }

    /// Fail fast on a dictionary that cannot drive a run
    pub fn validate(&self) -> Result<()> {
        if self.currencies.is_empty() {
            return Err(CalendarError::Config(
                "keyword dictionary has no currencies".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered macro keyword lists used by the classifier
///
/// Order matters only across lists: the hard list is checked first, so a
/// title matching both lists is a hard-macro event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRules {
    /// Rate, employment, inflation and growth releases
    pub hard_macro: Vec<String>,

    /// Survey, index and sales releases
    pub soft_macro: Vec<String>,
}

const DEFAULT_HARD_MACRO: &[&str] = &[
    "fomc", "fed", "rate", "nfp", "nonfarm", "non-farm", "employment", "cpi", "gdp",
];

const DEFAULT_SOFT_MACRO: &[&str] = &["ism", "adp", "markit", "pmi", "ppi", "retail", "pce"];

impl Default for KeywordRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_HARD_MACRO.iter().map(|s| s.to_string()).collect(),
            DEFAULT_SOFT_MACRO.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl KeywordRules {
    /// Build rules from explicit lists (entries are lowercased, blanks dropped)
    pub fn new(hard_macro: Vec<String>, soft_macro: Vec<String>) -> Self {
        Self {
            hard_macro: normalize(hard_macro),
            soft_macro: normalize(soft_macro),
        }
    }

    /// The fixed known-macro set: hard keywords followed by soft keywords
    pub fn known_macro(&self) -> impl Iterator<Item = &str> {
        self.hard_macro
            .iter()
            .chain(self.soft_macro.iter())
            .map(String::as_str)
    }
}

fn normalize(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub dictionary: EventKeywordDictionary,
    pub rules: KeywordRules,
    /// Target time zone as a whole-hour UTC offset
    pub utc_offset_hours: i32,
    /// Maximum notification blocks, clamped to 1..=MAX_BLOCKS
    pub max_blocks: usize,
}

impl PipelineConfig {
    /// Create a configuration with default rules and the UTC+8 target zone
    pub fn new(dictionary: EventKeywordDictionary) -> Self {
        Self {
            dictionary,
            rules: KeywordRules::default(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            max_blocks: MAX_BLOCKS,
        }
    }

    /// Builder method: replace the keyword rules
    pub fn with_rules(mut self, rules: KeywordRules) -> Self {
        self.rules = rules;
        self
    }

    /// Builder method: set the target UTC offset
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// Builder method: lower the block cap (never above MAX_BLOCKS)
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks.clamp(1, MAX_BLOCKS);
        self
    }

    /// The target time zone
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            CalendarError::Config(format!("UTC offset out of range: {}h", self.utc_offset_hours))
        })
    }

    /// Validate everything a run depends on
    pub fn validate(&self) -> Result<()> {
        self.dictionary.validate()?;
        self.offset()?;
        if self.rules.hard_macro.is_empty() && self.rules.soft_macro.is_empty() {
            log::warn!("No macro keywords configured, only dictionary matches will classify");
        }
        Ok(())
    }
}
