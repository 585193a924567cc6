//! Keyword- and pattern-based entity extraction.
//!
//! Pure over (text, fixed tables): no external NLP service. Any future
//! statistical extractor must keep this same input/output shape.

use regex::Regex;
use serde::{Deserialize, Serialize};

use tugendane_core::ServiceCategory;

/// Entities pulled from one message, each list in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMap {
    pub service_types: Vec<ServiceCategory>,
    pub locations: Vec<String>,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub dates: Vec<String>,
}

impl EntityMap {
    /// First extracted service category, if any.
    pub fn service_type(&self) -> Option<ServiceCategory> {
        self.service_types.first().copied()
    }

    /// First extracted location phrase, if any.
    pub fn location(&self) -> Option<&str> {
        self.locations.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.service_types.is_empty()
            && self.locations.is_empty()
            && self.persons.is_empty()
            && self.organizations.is_empty()
            && self.dates.is_empty()
    }
}

/// Category keyword table, in declaration order. A category is recorded
/// once, the first time any of its keywords appears as a substring.
const SERVICE_KEYWORDS: &[(ServiceCategory, &[&str])] = &[
    (
        ServiceCategory::Health,
        &["hospital", "clinic", "health center", "doctor", "medical", "healthcare"],
    ),
    (
        ServiceCategory::Education,
        &["school", "university", "college", "education", "academic"],
    ),
    (
        ServiceCategory::Identification,
        &["passport", "identification", "identity card", "birth certificate", "national id"],
    ),
    (
        ServiceCategory::Taxation,
        &["tax", "taxes", "revenue", "payment", "financial"],
    ),
    (
        ServiceCategory::Social,
        &["social security", "welfare", "unemployment", "benefits", "assistance"],
    ),
];

/// Words whose following token is taken as a location candidate.
const LOCATION_MARKERS: &[&str] = &["in", "at", "near", "around", "by"];

/// Tokens never accepted as a location.
const LOCATION_STOPWORDS: &[&str] = &["the", "a", "an"];

/// Title prefixes accepted before a person name.
const PERSON_TITLES: &[&str] = &["mr", "mrs", "ms", "dr", "prof"];

/// Suffixes that close an organization name.
const ORG_SUFFIXES: &[&str] = &[
    "ministry",
    "department",
    "office",
    "agency",
    "authority",
    "center",
    "commission",
];

/// Extractor with patterns compiled once and reused.
pub struct EntityExtractor {
    org_regexes: Vec<Regex>,
    date_regexes: Vec<Regex>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        let org_regexes = ORG_SUFFIXES
            .iter()
            .map(|suffix| {
                Regex::new(&format!(r"\b(?:[A-Z][a-z]+ )+(?i:{})\b", suffix))
                    .expect("Invalid org pattern")
            })
            .collect();

        let date_regexes = vec![
            Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").expect("Invalid date pattern"),
            Regex::new(r"\b\d{1,2}-\d{1,2}-\d{2,4}\b").expect("Invalid date pattern"),
            Regex::new(
                r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2}(?:st|nd|rd|th)?,? \d{4}\b",
            )
            .expect("Invalid date pattern"),
        ];

        Self {
            org_regexes,
            date_regexes,
        }
    }

    /// Extract all recognized entities from the given text.
    pub fn extract(&self, text: &str) -> EntityMap {
        let mut entities = EntityMap::default();
        let text_lower = text.to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();

        // Service categories via keyword substring match.
        for (category, keywords) in SERVICE_KEYWORDS {
            if keywords.iter().any(|k| text_lower.contains(k)) {
                entities.service_types.push(*category);
            }
        }

        // Location: token after a marker word, first match only.
        'outer: for (i, word) in words.iter().enumerate() {
            if LOCATION_MARKERS.contains(&word.to_lowercase().as_str()) {
                if let Some(candidate) = words.get(i + 1) {
                    // Guards apply to the bare token, not trailing punctuation.
                    let candidate = trim_punct(candidate);
                    let lower = candidate.to_lowercase();
                    if !LOCATION_STOPWORDS.contains(&lower.as_str()) && candidate.len() > 2 {
                        entities.locations.push(candidate.to_string());
                        break 'outer;
                    }
                }
            }
        }

        // Person: title prefix followed by a capitalized token, first only.
        for (i, word) in words.iter().enumerate() {
            let bare = word.to_lowercase();
            let bare = bare.trim_end_matches('.');
            if PERSON_TITLES.contains(&bare) {
                if let Some(name) = words.get(i + 1) {
                    if name.len() > 1 && name.chars().next().is_some_and(|c| c.is_uppercase()) {
                        entities
                            .persons
                            .push(format!("{} {}", word, trim_punct(name)));
                        break;
                    }
                }
            }
        }

        // Organization: capitalized words closed by a known suffix, first only.
        for re in &self.org_regexes {
            if let Some(m) = re.find(text) {
                entities.organizations.push(m.as_str().to_string());
                break;
            }
        }

        // Dates: all matches, in pattern order.
        for re in &self.date_regexes {
            for m in re.find_iter(text) {
                entities.dates.push(m.as_str().to_string());
            }
        }

        entities
    }
}

/// Strip trailing sentence punctuation from a token.
fn trim_punct(token: &str) -> &str {
    token.trim_end_matches(['.', ',', '!', '?', ';', ':'])
}
