//! Two-stage event classification
//!
//! Stage 1 decides whether an event is dictionary-known: its lowercased title
//! contains any dictionary key, any dictionary value, or any known macro keyword.
//! Stage 2 maps `(is_high_impact, dictionary_known)` to a category, checking the
//! hard-macro list before the soft-macro list.

use crate::config::{EventKeywordDictionary, KeywordRules};
use crate::types::{Category, ClassifiedEvent, ClassifiedEvents, RawEvent};

/// Stateless rule engine over a fixed dictionary and keyword lists
pub struct Classifier<'a> {
    dictionary: &'a EventKeywordDictionary,
    rules: &'a KeywordRules,
}

impl<'a> Classifier<'a> {
    pub fn new(dictionary: &'a EventKeywordDictionary, rules: &'a KeywordRules) -> Self {
        Self { dictionary, rules }
    }

    /// Classify every event, dropping low-impact events nobody recognizes
    pub fn classify_all<I>(&self, events: I) -> ClassifiedEvents
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut classified = ClassifiedEvents::new();
        for event in events {
            if let Some(event) = self.classify(event) {
                classified.push(event);
            }
        }

        log::info!(
            "Classified {} events (no-trade {}, volatility {}, general {}, forex/special {})",
            classified.total(),
            classified.count(Category::NoTrade),
            classified.count(Category::Volatility),
            classified.count(Category::General),
            classified.count(Category::ForexSpecial),
        );
        classified
    }

    /// Classify one event, `None` if it is excluded
    pub fn classify(&self, event: RawEvent) -> Option<ClassifiedEvent> {
        let Some(category) = self.category_for(&event.english_title, event.is_high_impact) else {
            log::debug!("Excluded low-impact unknown event {:?}", event.english_title);
            return None;
        };

        let chinese_title = self.dictionary.display_name(&event.english_title).to_string();
        Some(ClassifiedEvent {
            event,
            chinese_title,
            category,
            severity_color: category.severity_color(),
        })
    }

    /// Stage 2: category from the impact flag and stage-1 membership
    pub fn category_for(&self, title: &str, is_high_impact: bool) -> Option<Category> {
        let lower = title.to_lowercase();
        let known = self.is_known_lowercase(&lower);

        match (is_high_impact, known) {
            (true, true) => {
                if contains_any(&lower, &self.rules.hard_macro) {
                    Some(Category::NoTrade)
                } else if contains_any(&lower, &self.rules.soft_macro) {
                    Some(Category::Volatility)
                } else {
                    Some(Category::General)
                }
            }
            (true, false) => Some(Category::General),
            (false, true) => Some(Category::ForexSpecial),
            (false, false) => None,
        }
    }

    /// Stage 1: case-insensitive substring membership against the dictionary
    /// and macro keywords
    ///
    /// Blank dictionary entries never match.
    pub fn is_dictionary_known(&self, title: &str) -> bool {
        self.is_known_lowercase(&title.to_lowercase())
    }

    fn is_known_lowercase(&self, lower: &str) -> bool {
        let in_dictionary = self.dictionary.events.iter().any(|(english, localized)| {
            matches_fragment(lower, english) || matches_fragment(lower, localized)
        });

        in_dictionary || self.rules.known_macro().any(|keyword| lower.contains(keyword))
    }
}

fn matches_fragment(lower: &str, fragment: &str) -> bool {
    let fragment = fragment.trim();
    !fragment.is_empty() && lower.contains(&fragment.to_lowercase())
}

fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
}
