//! Optional synonym groups.
//!
//! Each line of the file is a comma-separated group of single-word lemma
//! forms. The first word is the group head; every member maps to it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::text::{normalize, NormalizeMode};

#[derive(Debug, thiserror::Error)]
pub enum SynonymError {
    #[error("Failed to read synonyms from {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct SynonymDictionary {
    heads: HashMap<String, String>,
    groups: usize,
}

impl SynonymDictionary {
    pub fn from_groups<G, W>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut dict = Self::default();
        for group in groups {
            let words: Vec<String> = group
                .into_iter()
                .map(|w| normalize(w.as_ref(), NormalizeMode::Tokenizing))
                .filter(|w| !w.is_empty())
                .collect();

            if words.iter().any(|w| w.contains(char::is_whitespace)) {
                tracing::warn!("Skipping synonym group with multi-word entry: {:?}", words);
                continue;
            }
            let Some(head) = words.first().cloned() else {
                continue;
            };

            for word in words {
                // First group wins when a word is listed twice
                dict.heads.entry(word).or_insert_with(|| head.clone());
            }
            dict.groups += 1;
        }
        dict
    }

    pub fn parse(content: &str) -> Self {
        Self::from_groups(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| line.split(',').map(str::trim).collect::<Vec<_>>()),
        )
    }

    pub fn load(path: &Path) -> Result<Self, SynonymError> {
        let content = std::fs::read_to_string(path).map_err(|e| SynonymError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    /// Group head for `token`, or `token` itself when it has no synonyms
    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.heads.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn group_count(&self) -> usize {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups() {
        let dict = SynonymDictionary::parse("# cars\nauto, samochód, wóz\n\nkot,kocur\n");
        assert_eq!(dict.group_count(), 2);
        assert_eq!(dict.canonical("samochod"), "auto");
        assert_eq!(dict.canonical("woz"), "auto");
        assert_eq!(dict.canonical("auto"), "auto");
        assert_eq!(dict.canonical("kocur"), "kot");
        assert_eq!(dict.canonical("pies"), "pies");
    }

    #[test]
    fn test_multi_word_groups_are_skipped() {
        let dict = SynonymDictionary::parse("pociag, kolej zelazna\n");
        assert_eq!(dict.group_count(), 0);
        assert_eq!(dict.canonical("pociag"), "pociag");
    }

    #[test]
    fn test_first_group_wins() {
        let dict = SynonymDictionary::parse("a1, b\nb2, b\n");
        assert_eq!(dict.canonical("b"), "a1");
        assert_eq!(dict.canonical("b2"), "b2");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SynonymDictionary::load(Path::new("/no/such/synonyms.txt")).is_err());
    }
}
