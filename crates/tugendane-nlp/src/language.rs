//! Wordlist-based language detection.

use tugendane_core::Language;

/// Common Kinyarwanda words used as detection evidence.
const KINYARWANDA_WORDS: &[&str] = &[
    "muraho", "amakuru", "yego", "oya", "murakoze", "ndashaka", "mfasha", "kubona", "serivisi",
    "aho", "kugera",
];

/// Detect the language of a message.
///
/// Two or more Kinyarwanda words mark the text as `rw`; anything else
/// defaults to `en`.
pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();
    let hits = KINYARWANDA_WORDS
        .iter()
        .filter(|w| lower.contains(*w))
        .count();
    if hits >= 2 {
        Language::Rw
    } else {
        Language::En
    }
}

/// Whether the text contains any Kinyarwanda evidence word at all.
///
/// Used to avoid flipping a stored `rw` preference back to English on a
/// short reply like "yego" that falls below the detection threshold.
pub fn has_kinyarwanda_evidence(text: &str) -> bool {
    let lower = text.to_lowercase();
    KINYARWANDA_WORDS.iter().any(|w| lower.contains(*w))
}
