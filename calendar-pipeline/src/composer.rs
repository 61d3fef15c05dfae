//! Notification composition
//!
//! Groups classified events into message blocks: one summary block followed by
//! one detail block per event, or a single all-clear block when nothing
//! qualified. The block count is capped for the transport's payload limit.

use crate::config::MAX_BLOCKS;
use crate::types::{Category, ClassifiedEvent, ClassifiedEvents, LocalTime, SeverityColor};
use serde::Serialize;
use std::fmt::Write;

const DISPLAY_TIME_FORMAT: &str = "%m/%d %H:%M";

/// A name/value pair shown inside a block (serialized as a webhook embed field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl BlockField {
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}

/// One structured message block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub title: String,
    pub description: String,
    pub color: SeverityColor,
    pub fields: Vec<BlockField>,
    pub footer: Option<String>,
}

/// Ordered message blocks for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBundle {
    pub blocks: Vec<MessageBlock>,
}

impl NotificationBundle {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Countdown text relative to the run's current instant
pub fn countdown_text(minutes_until: u32) -> String {
    match minutes_until {
        0 => "released".to_string(),
        1..=60 => format!("{} minutes", minutes_until),
        _ => format!("{} hours {} minutes", minutes_until / 60, minutes_until % 60),
    }
}

/// Builds notification bundles
pub struct Composer {
    now: LocalTime,
    max_blocks: usize,
}

impl Composer {
    /// Create a composer stamping blocks with `now`, capped at `max_blocks`
    pub fn new(now: LocalTime, max_blocks: usize) -> Self {
        Self {
            now,
            max_blocks: max_blocks.clamp(1, MAX_BLOCKS),
        }
    }

    /// Compose the bundle for a classified run
    pub fn compose(&self, classified: &ClassifiedEvents) -> NotificationBundle {
        if classified.is_empty() {
            log::info!("No qualifying events, composing all-clear notification");
            return NotificationBundle {
                blocks: vec![self.all_clear_block()],
            };
        }

        let mut blocks = Vec::with_capacity(self.max_blocks);
        blocks.push(self.summary_block(classified));
        blocks.extend(
            classified
                .iter()
                .take(self.max_blocks - 1)
                .map(|event| self.detail_block(event)),
        );

        let dropped = classified.total() + 1 - blocks.len();
        if dropped > 0 {
            log::warn!("Dropped {} detail blocks over the {}-block limit", dropped, self.max_blocks);
        }

        NotificationBundle { blocks }
    }

    fn offset_label(&self) -> String {
        format!("UTC{}", self.now.offset())
    }

    fn updated_footer(&self) -> String {
        format!("Updated {} • {}", self.now.format(DISPLAY_TIME_FORMAT), self.offset_label())
    }

    fn all_clear_block(&self) -> MessageBlock {
        MessageBlock {
            title: "No high-impact events today".to_string(),
            description: "Nothing on the calendar for the tracked currencies. Trade as usual.".to_string(),
            color: SeverityColor::GREEN,
            fields: Vec::new(),
            footer: Some(self.updated_footer()),
        }
    }

    fn summary_block(&self, classified: &ClassifiedEvents) -> MessageBlock {
        let mut description = format!("**Total {} events**\n\n", classified.total());
        for category in Category::ALL {
            let _ = writeln!(
                description,
                "{} **{}** {}",
                category.icon(),
                classified.count(category),
                category.label()
            );
        }

        let color = if classified.count(Category::NoTrade) > 0 {
            SeverityColor::RED
        } else if classified.count(Category::Volatility) > 0 {
            SeverityColor::YELLOW
        } else {
            SeverityColor::GREEN
        };

        MessageBlock {
            title: "Economic Calendar Overview (today)".to_string(),
            description,
            color,
            fields: Vec::new(),
            footer: Some(self.updated_footer()),
        }
    }

    fn detail_block(&self, classified: &ClassifiedEvent) -> MessageBlock {
        let event = &classified.event;
        let time = format!(
            "{}\n{}",
            event.scheduled_time.format(DISPLAY_TIME_FORMAT),
            countdown_text(event.minutes_until)
        );

        MessageBlock {
            title: format!("{} {}", classified.category.label(), classified.chinese_title),
            description: format!("**{}** {}", event.currency, event.english_title),
            color: classified.severity_color,
            fields: vec![
                BlockField::inline("🕓 Time", time),
                BlockField::inline("🪙 Forecast", event.forecast.as_str()),
                BlockField::inline("📊 Previous", event.previous.as_str()),
            ],
            footer: Some(self.offset_label()),
        }
    }
}
