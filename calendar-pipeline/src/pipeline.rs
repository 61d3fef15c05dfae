//! Pipeline runner and collaborator interfaces
//!
//! The library performs no I/O itself. The page source and the notification
//! sink are supplied by the application; everything between them is a pure
//! transformation. Extraction completes before anything is delivered.

use crate::classifier::Classifier;
use crate::composer::{Composer, NotificationBundle};
use crate::config::PipelineConfig;
use crate::extractor::EventExtractor;
use crate::types::{CalendarError, LocalTime, Result};
use chrono::{DateTime, TimeZone};

/// Provides the calendar page as rendered markup
pub trait PageSource {
    /// Return markup with dynamic content already settled
    ///
    /// Fails with [`CalendarError::Transport`] on network or render failure.
    fn fetch_rendered_markup(&self) -> Result<String>;
}

/// Delivers one structured message
pub trait NotificationSink {
    /// Fails with [`CalendarError::Delivery`] if the transport rejects the message
    fn deliver(&self, message: &OutboundMessage) -> Result<()>;
}

/// Message handed to the notification sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Regular run output
    Bundle(NotificationBundle),
    /// Minimal text-only message, used to report a failed run
    Text(String),
}

/// Counts from a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub extracted: usize,
    pub classified: usize,
    pub blocks_sent: usize,
}

/// Convert any instant into the configured target offset
pub fn localize<Tz: TimeZone>(instant: DateTime<Tz>, config: &PipelineConfig) -> Result<LocalTime> {
    Ok(instant.with_timezone(&config.offset()?))
}

/// Run fetch → extract → classify → compose → deliver once
pub fn run(
    source: &dyn PageSource,
    sink: &dyn NotificationSink,
    config: &PipelineConfig,
    now: LocalTime,
) -> Result<RunReport> {
    config.validate()?;
    let now = localize(now, config)?;

    let markup = source.fetch_rendered_markup()?;
    log::debug!("Fetched {} bytes of calendar markup", markup.len());

    let extractor = EventExtractor::new(&config.dictionary)?;
    let events = extractor.extract(&markup, now)?;
    let extracted = events.len();

    let classifier = Classifier::new(&config.dictionary, &config.rules);
    let classified = classifier.classify_all(events);

    let bundle = Composer::new(now, config.max_blocks).compose(&classified);
    let blocks_sent = bundle.len();
    sink.deliver(&OutboundMessage::Bundle(bundle))?;
    log::info!("Delivered notification with {} blocks", blocks_sent);

    Ok(RunReport {
        extracted,
        classified: classified.total(),
        blocks_sent,
    })
}

/// Run the pipeline; on failure, attempt one text delivery describing the error
///
/// The run's own error is always returned. A failure of the fallback delivery
/// is logged and swallowed.
pub fn run_with_fallback(
    source: &dyn PageSource,
    sink: &dyn NotificationSink,
    config: &PipelineConfig,
    now: LocalTime,
) -> Result<RunReport> {
    run(source, sink, config, now).map_err(|err| {
        report_failure(sink, &err);
        err
    })
}

/// Best-effort delivery of a failure notice
pub fn report_failure(sink: &dyn NotificationSink, err: &CalendarError) {
    log::error!("Calendar run failed: {}", err);
    let notice = OutboundMessage::Text(format!("🛑 Economic calendar run failed: {}", err));
    if let Err(fallback_err) = sink.deliver(&notice) {
        log::error!("Fallback notification also failed: {}", fallback_err);
    }
}
