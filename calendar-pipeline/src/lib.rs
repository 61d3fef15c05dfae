//! Economic Calendar Pipeline Library
//!
//! A stateless library that turns a rendered economic-calendar page into a
//! structured notification of today's relevant events.
//!
//! # Architecture
//!
//! The pipeline has three pure stages:
//! - The extractor parses calendar rows into typed events for the local day
//! - The classifier assigns each event a category and severity color
//! - The composer groups classified events into a bounded set of message blocks
//!
//! The library does NOT:
//! - Drive a browser or make HTTP requests
//! - Send notifications
//! - Read configuration files
//!
//! Those are supplied through [`PageSource`] and [`NotificationSink`] by the
//! application layer (calendar-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use calendar_pipeline::{
//!     run_with_fallback, EventKeywordDictionary, NotificationSink, OutboundMessage,
//!     PageSource, PipelineConfig, Result,
//! };
//!
//! struct Snapshot;
//! impl PageSource for Snapshot {
//!     fn fetch_rendered_markup(&self) -> Result<String> {
//!         Ok(std::fs::read_to_string("calendar.html")?)
//!     }
//! }
//!
//! struct Stdout;
//! impl NotificationSink for Stdout {
//!     fn deliver(&self, message: &OutboundMessage) -> Result<()> {
//!         println!("{:?}", message);
//!         Ok(())
//!     }
//! }
//!
//! let dictionary = EventKeywordDictionary::new()
//!     .with_currency("USD")
//!     .with_event("CPI", "消費者物價指數");
//! let config = PipelineConfig::new(dictionary);
//! let now = chrono::Utc::now().with_timezone(&config.offset().unwrap());
//!
//! let report = run_with_fallback(&Snapshot, &Stdout, &config, now).unwrap();
//! println!("{} events classified", report.classified);
//! ```

// Public modules
pub mod classifier;
pub mod composer;
pub mod config;
pub mod extractor;
pub mod pipeline;
pub mod types;
pub mod window;

// Re-export main types for convenience
pub use classifier::Classifier;
pub use composer::{countdown_text, BlockField, Composer, MessageBlock, NotificationBundle};
pub use config::{EventKeywordDictionary, KeywordRules, PipelineConfig, MAX_BLOCKS};
pub use extractor::EventExtractor;
pub use pipeline::{
    localize, run, run_with_fallback, NotificationSink, OutboundMessage, PageSource, RunReport,
};
pub use types::{
    CalendarError, Category, ClassifiedEvent, ClassifiedEvents, LocalTime, RawEvent, Result,
    SeverityColor, UNKNOWN_VALUE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
