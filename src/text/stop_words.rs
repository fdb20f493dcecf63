//! Closed list of function words dropped from answer signatures.
//!
//! Only conjunctions and prepositions are listed. Entries are stored in
//! normalized form (lower case, diacritics folded) because the filter runs
//! after normalization and lemmatization.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    // conjunctions
    "i", "oraz", "a", "albo", "lub", "czy", "ale", "lecz", "ani", "ze", "bo", "wiec",
    // prepositions
    "w", "we", "z", "na", "do", "od", "ode", "o", "u", "po", "za", "przy", "dla", "bez", "pod",
    "nad", "przed", "przez", "miedzy", "ku", "spod", "zza", "znad", "obok", "wokol",
];

/// Stop-word filter over lemma sequences
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<&'static str>,
}

impl StopWords {
    pub fn new() -> Self {
        Self {
            words: STOP_WORDS.iter().copied().collect(),
        }
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.words.contains(lemma)
    }

    /// Remove stop words, keeping the order of the remaining lemmas
    pub fn filter(&self, lemmas: Vec<String>) -> Vec<String> {
        lemmas
            .into_iter()
            .filter(|lemma| !self.contains(lemma))
            .collect()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemmas(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_preserves_order() {
        let filter = StopWords::new();
        assert_eq!(
            filter.filter(lemmas(&["chleb", "z", "maslo", "i", "dzem"])),
            lemmas(&["chleb", "maslo", "dzem"])
        );
    }

    #[test]
    fn test_all_stop_words_yield_empty() {
        let filter = StopWords::new();
        assert!(filter.filter(lemmas(&["i", "w", "na", "z"])).is_empty());
        assert!(filter.filter(Vec::new()).is_empty());
    }

    #[test]
    fn test_entries_are_normalized() {
        for word in STOP_WORDS {
            assert_eq!(
                crate::text::normalize(word, crate::text::NormalizeMode::Tokenizing),
                *word
            );
        }
    }
}
