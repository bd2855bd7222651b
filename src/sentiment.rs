//! Polarity scoring behind a trait seam.
//!
//! The three-way positive/neutral/negative mapping lives in the analyzer; a
//! scorer only turns text into a signed number. The bundled [`LexiconScorer`]
//! keeps the binary self-contained, and tests inject fixed scores through the
//! same trait.

use std::collections::HashMap;

/// A signed polarity score for a piece of text. Greater than zero leans
/// positive, less than zero negative, exactly zero neutral.
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> f64;
}

/// Word-list scorer: mean weight of the matched words, with a single-token
/// negation flip. Texts with no matched words score exactly 0.0, which the
/// classifier maps to neutral.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    weights: HashMap<&'static str, f64>,
}

const POSITIVE: &[(&str, f64)] = &[
    ("amazing", 0.8),
    ("awesome", 0.75),
    ("best", 0.8),
    ("brilliant", 0.8),
    ("excellent", 0.8),
    ("fantastic", 0.8),
    ("glad", 0.5),
    ("good", 0.6),
    ("great", 0.7),
    ("happy", 0.7),
    ("love", 0.7),
    ("nice", 0.5),
    ("perfect", 0.8),
    ("proud", 0.6),
    ("success", 0.6),
    ("thanks", 0.4),
    ("win", 0.6),
    ("wonderful", 0.8),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("angry", -0.6),
    ("awful", -0.8),
    ("bad", -0.6),
    ("disaster", -0.8),
    ("fail", -0.6),
    ("hate", -0.8),
    ("horrible", -0.8),
    ("lose", -0.5),
    ("sad", -0.6),
    ("shame", -0.6),
    ("terrible", -0.8),
    ("ugly", -0.6),
    ("worst", -0.9),
    ("wrong", -0.5),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "dont", "cant", "wont", "isnt"];

impl LexiconScorer {
    pub fn new() -> Self {
        let weights = POSITIVE.iter().chain(NEGATIVE).copied().collect();
        Self { weights }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut matched = 0u32;
        let mut negated = false;

        for token in tokens(text) {
            if NEGATIONS.contains(&token.as_str()) {
                negated = true;
                continue;
            }
            if let Some(weight) = self.weights.get(token.as_str()) {
                total += if negated { -weight } else { *weight };
                matched += 1;
            }
            negated = false;
        }

        if matched == 0 {
            0.0
        } else {
            total / f64::from(matched)
        }
    }
}

/// Lowercased alphanumeric runs; punctuation (including apostrophes) splits.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("Great day! http://x.co") > 0.0);
        assert!(scorer.polarity("what a wonderful, amazing launch") > 0.0);
    }

    #[test]
    fn test_negative_text() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("Terrible news @bob") < 0.0);
        assert!(scorer.polarity("the worst day") < 0.0);
    }

    #[test]
    fn test_unmatched_text_scores_exactly_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("It is Tuesday"), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn test_negation_flips_the_following_word() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("not good") < 0.0);
        assert!(scorer.polarity("never terrible") > 0.0);
    }

    #[test]
    fn test_negation_only_reaches_one_token() {
        let scorer = LexiconScorer::new();
        // "not" is spent on "really", so "good" keeps its sign.
        assert!(scorer.polarity("not really good") > 0.0);
    }

    #[test]
    fn test_mixed_text_averages() {
        let scorer = LexiconScorer::new();
        // great (0.7) and terrible (-0.8) average below zero.
        assert!(scorer.polarity("great start terrible finish") < 0.0);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let scorer = LexiconScorer::new();
        assert_eq!(
            scorer.polarity("GREAT!!!"),
            scorer.polarity("great")
        );
    }
}
