//! Linguistic reduction: tokenization, lemmatization and the services handle
//! that turns raw answer text into a comparable signature.

mod dictionary;
mod synonyms;

use std::path::PathBuf;

pub use dictionary::DictionaryModel;
pub use synonyms::{SynonymDictionary, SynonymError};

use crate::config::EngineConfig;
use crate::text::{normalize, NormalizeMode, StopWords};

/// Result type for model loading
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while loading the linguistic model.
///
/// Both variants are fatal: without a model no answer can be judged.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Linguistic model unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("Linguistic model at {path} contains no usable entries")]
    Empty { path: PathBuf },
}

/// Tokenizer and lemmatizer pair backing the reducer.
///
/// Implementations must be deterministic and return exactly one lemma per
/// input token, in order.
pub trait LinguisticModel: Send + Sync {
    /// Split normalized text into word tokens
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Map each token to its dictionary base form
    fn lemmatize(&self, tokens: &[String]) -> Vec<String>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Process-wide linguistic resources, loaded once at startup and shared
/// read-only by every judge call.
pub struct LinguisticServices {
    model: Box<dyn LinguisticModel>,
    stop_words: StopWords,
    synonyms: Option<SynonymDictionary>,
}

impl LinguisticServices {
    pub fn new(model: Box<dyn LinguisticModel>) -> Self {
        Self {
            model,
            stop_words: StopWords::new(),
            synonyms: None,
        }
    }

    /// Enable synonym canonicalization of signature tokens
    pub fn with_synonyms(mut self, synonyms: SynonymDictionary) -> Self {
        self.synonyms = Some(synonyms);
        self
    }

    /// Load the model (fatal on failure) and the optional synonym groups
    /// (logged and skipped on failure).
    pub fn load(config: &EngineConfig) -> ModelResult<Self> {
        let model = DictionaryModel::load(&config.lemma_dictionary_path)?;
        let mut services = Self::new(Box::new(model));

        if let Some(path) = &config.synonyms_path {
            match SynonymDictionary::load(path) {
                Ok(synonyms) => {
                    tracing::info!(
                        "Loaded {} synonym groups from {}",
                        synonyms.group_count(),
                        path.display()
                    );
                    services = services.with_synonyms(synonyms);
                }
                Err(e) => {
                    tracing::warn!("{}. Matching continues without synonyms.", e);
                }
            }
        }

        Ok(services)
    }

    /// Turn normalized text into its lemma sequence
    pub fn reduce(&self, normalized: &str) -> Vec<String> {
        let tokens = self.model.tokenize(normalized);
        self.model.lemmatize(&tokens)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Normalize, reduce and filter `text` into signature tokens
    pub fn signature_tokens(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text, NormalizeMode::Tokenizing);
        let filtered = self.stop_words.filter(self.reduce(&normalized));

        match &self.synonyms {
            Some(synonyms) => filtered
                .into_iter()
                .map(|token| synonyms.canonical(&token).to_string())
                .collect(),
            None => filtered,
        }
    }
}
