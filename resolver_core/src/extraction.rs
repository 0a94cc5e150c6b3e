//! Candidate extraction interface and the built-in lexicon extractor.
//!
//! Free-text tokenization is an external collaborator: the engine only
//! consumes the `Extraction` contract. `LexiconExtractor` is a
//! self-contained default implementation (keyword lexicons plus regex budget
//! parsing) so the pipeline works end-to-end without an NLP service.

use apparel_catalog::{AttributeKey, AttributeMap, AttributeValue, Category};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Result of extracting attribute candidates from one utterance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Extraction {
    /// Attributes pulled directly from the text. Absent key = not extracted.
    pub candidates: AttributeMap,

    /// Multi-word phrases worth matching against the knowledge base.
    pub key_phrases: Vec<String>,
}

/// Turns a free-text query into attribute candidates and key phrases.
pub trait CandidateExtractor: Send + Sync {
    /// Extract candidates from the user's utterance.
    fn extract(&self, query: &str) -> Extraction;
}

/// Keyword-lexicon extractor with regex budget parsing.
pub struct LexiconExtractor {
    budget_patterns: Vec<Regex>,
}

const FILLER_PHRASES: &[&str] = &[
    "i want",
    "i need",
    "i'm looking for",
    "looking for",
    "can you find",
    "help me find",
    "show me",
    "find me",
    "could you find",
    "could you show me",
    "do you have",
    "i would like",
    "i'm interested in",
    "give me",
    "tell me about",
    "please find",
    "please show",
    "please help me",
    "let me see",
    "i'm searching for",
    "looking to",
];

const OCCASIONS: &[&str] = &[
    "brunch", "lunch", "dinner", "party", "wedding", "office", "work", "date", "business",
    "workout", "gym", "beach", "vacation", "travel", "interview", "meeting", "event",
];

const SEASONS: &[&str] = &[
    "summer", "winter", "spring", "fall", "autumn", "hot", "cold", "warm", "cool",
];

const STYLES: &[&str] = &[
    "casual", "formal", "dressy", "elegant", "edgy", "bohemian", "boho", "chic", "trendy",
    "classic", "vintage", "modern", "minimalist", "romantic", "sporty", "preppy",
];

const CATEGORIES: &[&str] = &["dress", "dresses", "top", "tops", "pants", "skirt", "skirts"];

const FITS: &[&str] = &[
    "relaxed", "stretch to fit", "body hugging", "tailored", "oversized", "flowy", "bodycon",
    "slim", "sleek and straight", "fitted", "loose",
];

const COVERAGE: &[&str] = &[
    "short sleeves", "long sleeves", "sleeveless", "spaghetti straps", "cap sleeves",
    "quarter sleeves", "full sleeves", "halter", "tube", "one-shoulder", "bell sleeves",
    "balloon sleeves", "bishop sleeves", "cropped",
];

const COLORS: &[&str] = &[
    "pastel yellow", "deep blue", "floral print", "red", "off-white", "sapphire blue",
    "ruby red", "black", "white", "navy", "pastel", "floral",
];

impl LexiconExtractor {
    /// Build the extractor, compiling the budget patterns.
    pub fn new() -> Self {
        let raw_patterns = [
            r"\$(\d+(?:\.\d{2})?)",
            r"(\d+(?:\.\d{2})?)\s*dollars?",
            r"under\s*\$?(\d+(?:\.\d{2})?)",
            r"below\s*\$?(\d+(?:\.\d{2})?)",
            r"less\s*than\s*\$?(\d+(?:\.\d{2})?)",
            r"budget\s*of\s*\$?(\d+(?:\.\d{2})?)",
            r"(\d+(?:\.\d{2})?)\s*dollar\s*budget",
            r"around\s*\$?(\d+(?:\.\d{2})?)",
            r"up\s*to\s*\$?(\d+(?:\.\d{2})?)",
            r"max\s*\$?(\d+(?:\.\d{2})?)",
        ];
        let budget_patterns = raw_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();
        Self { budget_patterns }
    }

    /// Lowercase, strip filler phrases, and collapse whitespace.
    fn clean_text(&self, text: &str) -> String {
        let mut text = text.to_lowercase();
        for filler in FILLER_PHRASES {
            text = text.replace(filler, " ");
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn extract_budget(&self, text: &str) -> Option<f64> {
        let text = text.to_lowercase();
        for pattern in &self.budget_patterns {
            if let Some(captures) = pattern.captures(&text) {
                if let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                    return Some(value);
                }
            }
        }
        None
    }

    fn normalize_size(token: &str) -> Option<&'static str> {
        match token {
            "xs" => Some("XS"),
            "s" | "small" => Some("S"),
            "m" | "medium" => Some("M"),
            "l" | "large" => Some("L"),
            "xl" => Some("XL"),
            "xxl" | "2xl" => Some("XXL"),
            _ => None,
        }
    }

    /// First lexicon entry found in the text, preferring longer entries.
    ///
    /// Multi-word entries match as substrings; single words must match a
    /// whole token.
    fn find_in_lexicon(text: &str, tokens: &[&str], lexicon: &[&str]) -> Option<String> {
        let mut entries: Vec<&&str> = lexicon.iter().collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.len()));

        for entry in entries {
            let hit = if entry.contains(' ') || entry.contains('-') {
                text.contains(entry)
            } else {
                tokens.contains(entry)
            };
            if hit {
                return Some((*entry).to_string());
            }
        }
        None
    }
}

impl Default for LexiconExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateExtractor for LexiconExtractor {
    fn extract(&self, query: &str) -> Extraction {
        let cleaned = self.clean_text(query);
        let tokens: Vec<&str> = cleaned
            .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '\'')
            .filter(|t| !t.is_empty())
            .collect();

        let mut candidates = AttributeMap::new();
        let mut insert = |key: AttributeKey, value: Option<String>| {
            if let Some(value) = value {
                candidates.entry(key).or_insert(AttributeValue::Scalar(value));
            }
        };

        insert(
            AttributeKey::Occasion,
            Self::find_in_lexicon(&cleaned, &tokens, OCCASIONS),
        );
        insert(
            AttributeKey::Season,
            Self::find_in_lexicon(&cleaned, &tokens, SEASONS),
        );
        insert(
            AttributeKey::Style,
            Self::find_in_lexicon(&cleaned, &tokens, STYLES),
        );
        insert(
            AttributeKey::Category,
            Self::find_in_lexicon(&cleaned, &tokens, CATEGORIES)
                .and_then(|c| Category::parse(&c))
                .map(|c| c.as_str().to_string()),
        );
        insert(AttributeKey::Fit, Self::find_in_lexicon(&cleaned, &tokens, FITS));
        insert(
            AttributeKey::ColorOrPrint,
            Self::find_in_lexicon(&cleaned, &tokens, COLORS),
        );
        insert(
            AttributeKey::SleeveLength,
            Self::find_in_lexicon(&cleaned, &tokens, COVERAGE),
        );

        if let Some(size) = tokens.iter().find_map(|t| Self::normalize_size(t)) {
            candidates.insert(AttributeKey::Size, AttributeValue::scalar(size));
        }

        // Budget is parsed from the raw query: filler stripping must not
        // disturb number formats.
        if let Some(budget) = self.extract_budget(query) {
            candidates.insert(AttributeKey::Budget, AttributeValue::Number(budget));
        }

        // Compound season+occasion phrases are the strongest vibe signals.
        let mut key_phrases = Vec::new();
        for window in tokens.windows(2) {
            if SEASONS.contains(&window[0]) && OCCASIONS.contains(&window[1]) {
                key_phrases.push(window.join(" "));
            }
        }
        // A short query is itself a candidate phrase ("summer brunch").
        if !cleaned.is_empty() && tokens.len() >= 2 && tokens.len() <= 4 {
            let phrase = tokens.join(" ");
            if !key_phrases.contains(&phrase) {
                key_phrases.push(phrase);
            }
        }

        Extraction {
            candidates,
            key_phrases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_attributes() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("Something casual for a summer brunch");

        assert_eq!(
            extraction.candidates.get(&AttributeKey::Style),
            Some(&AttributeValue::scalar("casual"))
        );
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Season),
            Some(&AttributeValue::scalar("summer"))
        );
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Occasion),
            Some(&AttributeValue::scalar("brunch"))
        );
        assert!(extraction.key_phrases.contains(&"summer brunch".to_string()));
    }

    #[test]
    fn test_filler_phrases_removed() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("I'm looking for a formal dress");

        assert_eq!(
            extraction.candidates.get(&AttributeKey::Category),
            Some(&AttributeValue::scalar("dress"))
        );
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Style),
            Some(&AttributeValue::scalar("formal"))
        );
    }

    #[test]
    fn test_budget_patterns() {
        let extractor = LexiconExtractor::new();

        let cases = [
            ("a dress for $50", 50.0),
            ("something under 100", 100.0),
            ("budget of $75.50", 75.5),
            ("200 dollars max", 200.0),
            ("up to $120", 120.0),
        ];
        for (query, expected) in cases {
            let extraction = extractor.extract(query);
            assert_eq!(
                extraction.candidates.get(&AttributeKey::Budget),
                Some(&AttributeValue::Number(expected)),
                "query: {query}"
            );
        }
    }

    #[test]
    fn test_no_budget_extracted() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("a cheap dress");
        assert!(extraction.candidates.get(&AttributeKey::Budget).is_none());
    }

    #[test]
    fn test_size_normalization() {
        let extractor = LexiconExtractor::new();

        let extraction = extractor.extract("a medium black top");
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Size),
            Some(&AttributeValue::scalar("M"))
        );

        let extraction = extractor.extract("size xl please");
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Size),
            Some(&AttributeValue::scalar("XL"))
        );
    }

    #[test]
    fn test_category_singularized() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("comfortable tops for work");
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Category),
            Some(&AttributeValue::scalar("top"))
        );
    }

    #[test]
    fn test_multiword_fit_matches() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("a body hugging evening dress");
        assert_eq!(
            extraction.candidates.get(&AttributeKey::Fit),
            Some(&AttributeValue::scalar("body hugging"))
        );
    }

    #[test]
    fn test_empty_query() {
        let extractor = LexiconExtractor::new();
        let extraction = extractor.extract("   ");
        assert!(extraction.candidates.is_empty());
        assert!(extraction.key_phrases.is_empty());
    }
}
