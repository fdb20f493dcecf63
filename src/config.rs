use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LEMMA_DICTIONARY: &str = "data/lemmas.tsv";
const DEFAULT_QUESTIONS: &str = "data/questions.json";
const DEFAULT_HISTORY: &str = "data/used_questions.txt";

/// Runtime configuration for the judging engine and its HTTP surface
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Form-to-lemma model file; the engine refuses to start without it
    pub lemma_dictionary_path: PathBuf,
    /// Optional synonym groups
    pub synonyms_path: Option<PathBuf>,
    pub questions_path: PathBuf,
    pub history_path: PathBuf,
    pub listen_addr: SocketAddr,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lemma_dictionary_path: PathBuf::from(DEFAULT_LEMMA_DICTIONARY),
            synonyms_path: None,
            questions_path: PathBuf::from(DEFAULT_QUESTIONS),
            history_path: PathBuf::from(DEFAULT_HISTORY),
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 6574))
}

/// Read a variable, treating unset and blank alike
pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let listen_addr = match env_var("LISTEN_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Invalid LISTEN_ADDR '{}': {}. Using default.", raw, e);
                default_listen_addr()
            }),
            None => default_listen_addr(),
        };

        Self {
            lemma_dictionary_path: env_var("LEMMA_DICTIONARY_PATH")
                .unwrap_or_else(|| DEFAULT_LEMMA_DICTIONARY.to_string())
                .into(),
            synonyms_path: env_var("SYNONYMS_PATH").map(PathBuf::from),
            questions_path: env_var("QUESTIONS_PATH")
                .unwrap_or_else(|| DEFAULT_QUESTIONS.to_string())
                .into(),
            history_path: env_var("HISTORY_PATH")
                .unwrap_or_else(|| DEFAULT_HISTORY.to_string())
                .into(),
            listen_addr,
        }
    }
}
