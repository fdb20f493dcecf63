//! File-backed lemmatizer.
//!
//! The model file holds one `form<TAB>lemma` pair per line. Blank lines and
//! lines starting with `#` are ignored, lines without a tab are skipped.

use std::collections::HashMap;
use std::path::Path;

use super::{LinguisticModel, ModelError, ModelResult};
use crate::text::{normalize, NormalizeMode};

pub struct DictionaryModel {
    lemmas: HashMap<String, String>,
}

impl DictionaryModel {
    /// Build a model from `(form, lemma)` pairs, normalizing both sides
    pub fn from_entries<I, F, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (F, L)>,
        F: AsRef<str>,
        L: AsRef<str>,
    {
        let lemmas = entries
            .into_iter()
            .map(|(form, lemma)| {
                (
                    normalize(form.as_ref(), NormalizeMode::Tokenizing),
                    normalize(lemma.as_ref(), NormalizeMode::Tokenizing),
                )
            })
            .filter(|(form, lemma)| !form.is_empty() && !lemma.is_empty())
            .collect();
        Self { lemmas }
    }

    /// Parse the tab-separated model format
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let parsed = line.split_once('\t');
                if parsed.is_none() {
                    tracing::debug!("Skipping malformed model line: {:?}", line);
                }
                parsed
            });
        Self::from_entries(entries)
    }

    /// Load the model from disk
    pub fn load(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Unavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let model = Self::parse(&content);
        if model.is_empty() {
            return Err(ModelError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(
            "Loaded linguistic model from {} ({} forms)",
            path.display(),
            model.len()
        );
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

impl LinguisticModel for DictionaryModel {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn lemmatize(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .map(|token| {
                self.lemmas
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| token.clone())
            })
            .collect()
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}
