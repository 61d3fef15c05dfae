//! Event extraction
//!
//! Turns rendered calendar markup into [`RawEvent`] records for the run's local
//! day. A row is dropped, never reported as an error, when it fails any gate:
//! tracked currency, title present, scheduled time, inside today's window.

use crate::config::EventKeywordDictionary;
use crate::types::{CalendarError, LocalTime, RawEvent, Result, UNKNOWN_VALUE};
use crate::window::{self, LocalDay, TimeLabel};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::fmt;

const ROW: &str = "tr.calendar__row";
const IMPACT_MARKER: &str = r#"td.calendar__impact span[title*="High Impact Expected"]"#;
const CURRENCY_SPAN: &str = "td.calendar__currency span";
const CURRENCY_CELL: &str = "td.calendar__currency";
const TITLE: &str = "span.calendar__event-title";
const TIME: &str = "td.calendar__time span";
const FORECAST: &str = "td.calendar__forecast span";
const PREVIOUS: &str = "td.calendar__previous span";

/// Compiled selectors for one calendar row
struct RowSelectors {
    row: Selector,
    impact_marker: Selector,
    currency_span: Selector,
    currency_cell: Selector,
    title: Selector,
    time: Selector,
    forecast: Selector,
    previous: Selector,
}

impl RowSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            row: parse_selector(ROW)?,
            impact_marker: parse_selector(IMPACT_MARKER)?,
            currency_span: parse_selector(CURRENCY_SPAN)?,
            currency_cell: parse_selector(CURRENCY_CELL)?,
            title: parse_selector(TITLE)?,
            time: parse_selector(TIME)?,
            forecast: parse_selector(FORECAST)?,
            previous: parse_selector(PREVIOUS)?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CalendarError::Selector(format!("{}: {:?}", css, e)))
}

/// Why a row produced no event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rejection {
    MissingCurrency,
    UntrackedCurrency,
    MissingTitle,
    Unscheduled,
    MalformedTime,
    OutsideWindow,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::MissingCurrency => "missing currency",
            Rejection::UntrackedCurrency => "untracked currency",
            Rejection::MissingTitle => "missing title",
            Rejection::Unscheduled => "unscheduled",
            Rejection::MalformedTime => "malformed time",
            Rejection::OutsideWindow => "outside today",
        };
        write!(f, "{}", reason)
    }
}

/// Extracts today's events for the tracked currencies
pub struct EventExtractor<'a> {
    dictionary: &'a EventKeywordDictionary,
    selectors: RowSelectors,
}

impl<'a> EventExtractor<'a> {
    /// Create an extractor that keeps only the dictionary's currencies
    pub fn new(dictionary: &'a EventKeywordDictionary) -> Result<Self> {
        Ok(Self {
            dictionary,
            selectors: RowSelectors::compile()?,
        })
    }

    /// Extract events from rendered markup, in document order
    ///
    /// `now` must already be expressed in the target offset; the local-day
    /// window is derived from it.
    pub fn extract(&self, markup: &str, now: LocalTime) -> Result<Vec<RawEvent>> {
        let day = LocalDay::containing(now).ok_or_else(|| {
            CalendarError::Config(format!("cannot compute local day for {}", now))
        })?;

        let document = Html::parse_document(markup);
        let mut events = Vec::new();
        let mut rejected: BTreeMap<Rejection, usize> = BTreeMap::new();
        let mut rows = 0usize;

        for row in document.select(&self.selectors.row) {
            rows += 1;
            match self.extract_row(row, &day, &now) {
                Ok(event) => {
                    log::trace!("Extracted {} {} at {}", event.currency, event.english_title, event.scheduled_time);
                    events.push(event);
                }
                Err(reason) => *rejected.entry(reason).or_default() += 1,
            }
        }

        log::info!("Extracted {} of {} calendar rows for {}", events.len(), rows, day.date());
        for (reason, count) in &rejected {
            log::debug!("Dropped {} rows: {}", count, reason);
        }

        Ok(events)
    }

    fn extract_row(
        &self,
        row: ElementRef<'_>,
        day: &LocalDay,
        now: &LocalTime,
    ) -> std::result::Result<RawEvent, Rejection> {
        let is_high_impact = row.select(&self.selectors.impact_marker).next().is_some();

        let currency = self.currency_text(row).ok_or(Rejection::MissingCurrency)?;
        if !self.dictionary.tracks_currency(&currency) {
            log::trace!("Skipping untracked currency {}", currency);
            return Err(Rejection::UntrackedCurrency);
        }

        let english_title = first_text(row, &self.selectors.title).ok_or(Rejection::MissingTitle)?;

        let label = first_text(row, &self.selectors.time).unwrap_or_default();
        let time = match window::parse_time_label(&label) {
            TimeLabel::Scheduled(time) => time,
            TimeLabel::Unscheduled => {
                log::debug!("Skipping unscheduled event {:?} ({:?})", english_title, label);
                return Err(Rejection::Unscheduled);
            }
            TimeLabel::Malformed => {
                log::debug!("Unparseable time label {:?} for {:?}", label, english_title);
                return Err(Rejection::MalformedTime);
            }
        };

        let scheduled_time = day.at(time).ok_or(Rejection::MalformedTime)?;
        if !day.contains(&scheduled_time) {
            return Err(Rejection::OutsideWindow);
        }

        Ok(RawEvent {
            english_title,
            currency,
            scheduled_time,
            is_high_impact,
            forecast: first_text(row, &self.selectors.forecast)
                .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
            previous: first_text(row, &self.selectors.previous)
                .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
            minutes_until: window::minutes_until(&scheduled_time, now),
        })
    }

    /// Currency code from the inner span, or the bare cell text
    fn currency_text(&self, row: ElementRef<'_>) -> Option<String> {
        first_text(row, &self.selectors.currency_span)
            .or_else(|| first_text(row, &self.selectors.currency_cell))
    }
}

/// Trimmed text of the first matching element, `None` if absent or blank
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = row.select(selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn now() -> LocalTime {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 8, 6, 0, 0)
            .unwrap()
    }

    fn dictionary() -> EventKeywordDictionary {
        EventKeywordDictionary::new()
            .with_currency("USD")
            .with_currency("EUR")
    }

    fn row(impact: bool, currency: &str, title: &str, time: &str, forecast: Option<&str>) -> String {
        let impact_cell = if impact {
            r#"<span title="High Impact Expected" class="icon icon--ff-impact-red"></span>"#
        } else {
            r#"<span title="Low Impact Expected" class="icon icon--ff-impact-yel"></span>"#
        };
        let forecast_cell = forecast.map(|f| format!("<span>{}</span>", f)).unwrap_or_default();
        format!(
            r#"<tr class="calendar__row">
                <td class="calendar__time"><span>{time}</span></td>
                <td class="calendar__currency"><span>{currency}</span></td>
                <td class="calendar__impact">{impact_cell}</td>
                <td class="calendar__event"><span class="calendar__event-title">{title}</span></td>
                <td class="calendar__forecast">{forecast_cell}</td>
                <td class="calendar__previous"><span>0.3%</span></td>
            </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows.concat())
    }

    #[test]
    fn test_extracts_tracked_scheduled_rows() {
        let markup = page(&[
            row(true, "USD", "Non-Farm Employment Change", "8:30am", Some("200K")),
            row(false, "EUR", "German Factory Orders m/m", "3:00pm", None),
        ]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        let events = extractor.extract(&markup, now()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].english_title, "Non-Farm Employment Change");
        assert!(events[0].is_high_impact);
        assert_eq!(events[0].forecast, "200K");
        assert_eq!(events[0].previous, "0.3%");
        assert_eq!(events[0].minutes_until, 150);
        assert!(!events[1].is_high_impact);
        assert_eq!(events[1].forecast, UNKNOWN_VALUE);
    }

    #[test]
    fn test_drops_untracked_and_unscheduled_rows() {
        let markup = page(&[
            row(true, "GBP", "BOE Gov Bailey Speaks", "9:00am", None),
            row(true, "USD", "Bank Holiday", "All Day", None),
            row(true, "USD", "Treasury Currency Report", "Tentative", None),
            row(true, "USD", "FOMC Member Speaks", "", None),
            row(true, "USD", "Broken Row", "25:99pm", None),
        ]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        let events = extractor.extract(&markup, now()).unwrap();

        assert!(events.is_empty());
    }

    #[test]
    fn test_past_events_are_released() {
        let markup = page(&[row(true, "USD", "CPI m/m", "1:00am", None)]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        let events = extractor.extract(&markup, now()).unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].is_released());
    }

    #[test]
    fn test_day_boundary_rows_kept_at_end_of_day() {
        let late = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 8, 23, 59, 59)
            .unwrap();
        let markup = page(&[
            row(true, "USD", "Midnight Release", "12:00am", None),
            row(true, "USD", "Last Release", "11:59pm", None),
        ]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        let events = extractor.extract(&markup, late).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].scheduled_time.format("%Y-%m-%d %H:%M").to_string(), "2024-03-08 00:00");
        assert_eq!(events[1].scheduled_time.format("%Y-%m-%d %H:%M").to_string(), "2024-03-08 23:59");
        assert!(events.iter().all(|e| e.minutes_until == 0));
    }

    #[test]
    fn test_row_without_title_is_dropped() {
        let markup = page(&[row(true, "USD", "", "8:30am", None)]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        assert!(extractor.extract(&markup, now()).unwrap().is_empty());
    }

    #[test]
    fn test_currency_in_bare_cell() {
        let markup = page(&[r#"<tr class="calendar__row">
                <td class="calendar__time"><span>10:00am</span></td>
                <td class="calendar__currency">EUR</td>
                <td class="calendar__event"><span class="calendar__event-title">ECB Press Conference</span></td>
            </tr>"#
            .to_string()]);
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        let events = extractor.extract(&markup, now()).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].currency, "EUR");
        assert_eq!(events[0].previous, UNKNOWN_VALUE);
    }

    #[test]
    fn test_empty_markup() {
        let dictionary = dictionary();
        let extractor = EventExtractor::new(&dictionary).unwrap();
        assert!(extractor.extract("", now()).unwrap().is_empty());
    }
}
