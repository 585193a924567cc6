//! Rule-based intent classification.
//!
//! Each intent owns an ordered set of regex patterns. A message is scored
//! per intent by summing non-overlapping match counts across the intent's
//! patterns; the strictly highest total wins. Ties fall to the earlier
//! declared intent, so declaration order below is part of the contract.

use regex::Regex;

use tugendane_core::Intent;

/// Classifier holding all compiled patterns in declaration order.
pub struct IntentClassifier {
    patterns: Vec<(Intent, Vec<Regex>)>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Compile the full pattern table.
    pub fn new() -> Self {
        let table: Vec<(Intent, Vec<&str>)> = vec![
            (
                Intent::FindService,
                vec![
                    r"(?i)find|locate|search|looking for|need|where (is|can I find)",
                    r"(?i)nearby|closest|nearest",
                    r"(?i)help (me )?(find|locate|with)",
                ],
            ),
            (
                Intent::GetDirections,
                vec![
                    r"(?i)directions?|way to|route to|path to|how (do I|to) get to",
                    r"(?i)guide me to|navigate|go to",
                ],
            ),
            (
                Intent::ServiceHours,
                vec![
                    r"(?i)hours|open|close|when|time",
                    r"(?i)operating hours|business hours|working hours",
                ],
            ),
            (
                Intent::RequiredDocuments,
                vec![
                    r"(?i)documents?|papers?|bring|need to have|requirements?",
                    r"(?i)what (do I|should I) bring|identification|ID",
                ],
            ),
            (
                Intent::ConnectCall,
                vec![
                    r"(?i)call|phone|speak|talk to|connect( me)? (with|to)",
                    r"(?i)contact (details|information|number)",
                ],
            ),
            (
                Intent::ConfirmService,
                vec![
                    r"(?i)done|completed|finished|received|got (the )?service",
                    r"(?i)success(ful)?|thank you|thanks|yes|yego",
                ],
            ),
            (
                Intent::DenyService,
                vec![
                    r"(?i)not (done|completed|received)|didn't (get|receive)",
                    r"(?i)problem|issue|failed|unsuccessful|no|oya",
                ],
            ),
            (
                Intent::Greeting,
                vec![r"(?i)hello|hi|hey|greetings|muraho|good (morning|afternoon|evening)"],
            ),
            (
                Intent::Help,
                vec![r"(?i)help|assist|support|how (do|can) (I|you)|what can you do"],
            ),
        ];

        let patterns = table
            .into_iter()
            .map(|(intent, pats)| {
                let compiled = pats
                    .iter()
                    .map(|p| Regex::new(p).expect("Invalid intent pattern"))
                    .collect();
                (intent, compiled)
            })
            .collect();

        Self { patterns }
    }

    /// Classify a message, returning the winning intent and its score.
    ///
    /// Never fails: a text matching nothing scores zero and yields
    /// `GeneralInquiry`.
    pub fn classify(&self, text: &str) -> (Intent, u32) {
        let mut best = (Intent::GeneralInquiry, 0u32);
        for (intent, pats) in &self.patterns {
            let score: u32 = pats.iter().map(|p| p.find_iter(text).count() as u32).sum();
            if score > best.1 {
                best = (*intent, score);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cl() -> IntentClassifier {
        IntentClassifier::new()
    }

    #[test]
    fn test_find_service() {
        let (intent, score) = cl().classify("I need a hospital nearby");
        assert_eq!(intent, Intent::FindService);
        assert!(score >= 2); // "need" + "nearby"
    }

    #[test]
    fn test_get_directions() {
        let (intent, _) = cl().classify("directions to the sector office");
        assert_eq!(intent, Intent::GetDirections);
    }

    #[test]
    fn test_service_hours() {
        let (intent, _) = cl().classify("what are the operating hours");
        assert_eq!(intent, Intent::ServiceHours);
    }

    #[test]
    fn test_required_documents() {
        let (intent, _) = cl().classify("what documents do I bring for a passport");
        assert_eq!(intent, Intent::RequiredDocuments);
    }

    #[test]
    fn test_greeting() {
        let (intent, _) = cl().classify("hello there");
        assert_eq!(intent, Intent::Greeting);
    }

    #[test]
    fn test_greeting_kinyarwanda() {
        let (intent, _) = cl().classify("muraho");
        assert_eq!(intent, Intent::Greeting);
    }

    #[test]
    fn test_no_match_is_general_inquiry() {
        let (intent, score) = cl().classify("qwzx vrbl");
        assert_eq!(intent, Intent::GeneralInquiry);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_empty_text_is_general_inquiry() {
        let (intent, score) = cl().classify("");
        assert_eq!(intent, Intent::GeneralInquiry);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_deterministic() {
        let c = cl();
        let a = c.classify("I need a health clinic nearby");
        for _ in 0..10 {
            assert_eq!(c.classify("I need a health clinic nearby"), a);
        }
    }

    #[test]
    fn test_tie_breaks_to_earlier_declared_intent() {
        // "go to" (get_directions) vs "call" (connect_call): one match each,
        // so the earlier declared intent must win.
        let (intent, score) = cl().classify("go to call");
        assert_eq!(score, 1);
        assert_eq!(intent, Intent::GetDirections);
    }

    #[test]
    fn test_confirm_service() {
        let (intent, _) = cl().classify("done, received the service, thanks");
        assert_eq!(intent, Intent::ConfirmService);
    }

    #[test]
    fn test_deny_service() {
        let (intent, _) = cl().classify("there was a problem, it failed");
        assert_eq!(intent, Intent::DenyService);
    }

    #[test]
    fn test_strictly_highest_total_wins() {
        // Two direction hits beat one find hit.
        let (intent, _) = cl().classify("find the route to and way to the office");
        assert_eq!(intent, Intent::GetDirections);
    }

    #[test]
    fn test_long_garbage_text_does_not_panic() {
        let text = "\u{0} \u{fffd} 漢字 ".repeat(500);
        let (intent, _) = cl().classify(&text);
        assert_eq!(intent, Intent::GeneralInquiry);
    }
}
