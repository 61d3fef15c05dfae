//! Core types for the calendar pipeline
//!
//! This module defines the records each pipeline stage produces. Every stage
//! hands its output to the next one by value; nothing here is shared or mutated
//! across stages.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type used throughout the pipeline (localized to the target offset)
pub type LocalTime = DateTime<FixedOffset>;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, CalendarError>;

/// Sentinel used for forecast/previous values the page did not supply
pub const UNKNOWN_VALUE: &str = "—";

/// Errors that can occur while running the pipeline
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Failed to fetch calendar markup: {0}")]
    Transport(String),

    #[error("Failed to deliver notification: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A calendar row that passed every extraction gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Event title as printed on the calendar page
    pub english_title: String,
    /// Currency code, always a member of the configured currency set
    pub currency: String,
    /// Scheduled instant, inside the run's local-today window
    pub scheduled_time: LocalTime,
    /// True if the page flagged the row with its high-impact marker
    pub is_high_impact: bool,
    /// Forecast value or [`UNKNOWN_VALUE`]
    pub forecast: String,
    /// Previous value or [`UNKNOWN_VALUE`]
    pub previous: String,
    /// Whole minutes until release, 0 once the event is out
    pub minutes_until: u32,
}

impl RawEvent {
    /// True once the scheduled instant has passed
    pub fn is_released(&self) -> bool {
        self.minutes_until == 0
    }
}

/// Notification category assigned by the classifier
///
/// The declaration order is the display order of the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// High impact and a hard-macro release: stay flat
    NoTrade,
    /// High impact and a soft-macro release: expect volatility
    Volatility,
    /// High impact but not a tracked macro release
    General,
    /// Recognized event without the page's high-impact marker
    ForexSpecial,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 4] = [
        Category::NoTrade,
        Category::Volatility,
        Category::General,
        Category::ForexSpecial,
    ];

    /// Severity color attached to this category
    pub fn severity_color(self) -> SeverityColor {
        match self {
            Category::NoTrade => SeverityColor::RED,
            Category::Volatility => SeverityColor::YELLOW,
            Category::General => SeverityColor::GREY,
            Category::ForexSpecial => SeverityColor::PURPLE,
        }
    }

    /// Human-readable label used in notification blocks
    pub fn label(self) -> &'static str {
        match self {
            Category::NoTrade => "No Trade",
            Category::Volatility => "Volatility Watch",
            Category::General => "General",
            Category::ForexSpecial => "Forex / Special",
        }
    }

    /// Icon shown next to the category in the summary block
    pub fn icon(self) -> &'static str {
        match self {
            Category::NoTrade => "❌",
            Category::Volatility => "⚠️",
            Category::General => "📅",
            Category::ForexSpecial => "🌍",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Numeric color code used by the notification transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeverityColor(pub u32);

impl SeverityColor {
    pub const RED: SeverityColor = SeverityColor(0xE74C3C);
    pub const YELLOW: SeverityColor = SeverityColor(0xF1C40F);
    pub const GREY: SeverityColor = SeverityColor(0x95A5A6);
    pub const PURPLE: SeverityColor = SeverityColor(0x9B59B6);
    pub const GREEN: SeverityColor = SeverityColor(0x2ECC71);
}

impl fmt::Display for SeverityColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

/// A raw event with its display name and category resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub event: RawEvent,
    /// Localized display name (falls back to the English title)
    pub chinese_title: String,
    pub category: Category,
    pub severity_color: SeverityColor,
}

/// Classifier output: one ordered bucket per category
///
/// All four buckets always exist, possibly empty. Insertion order inside a
/// bucket follows document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvents {
    buckets: BTreeMap<Category, Vec<ClassifiedEvent>>,
}

impl ClassifiedEvents {
    /// Create an empty set of buckets
    pub fn new() -> Self {
        Self {
            buckets: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// Append an event to its category's bucket
    pub fn push(&mut self, event: ClassifiedEvent) {
        self.buckets.entry(event.category).or_default().push(event);
    }

    /// Events in one category
    pub fn get(&self, category: Category) -> &[ClassifiedEvent] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of events in one category
    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    /// Total number of classified events
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over events in category-then-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedEvent> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }
}

impl Default for ClassifiedEvents {
    fn default() -> Self {
        Self::new()
    }
}
