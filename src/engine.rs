//! Judging engine: composes the question source, the history store and the
//! linguistic services behind the operations a round owner calls.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::answers::CanonicalAnswerSet;
use crate::config::EngineConfig;
use crate::history::QuestionHistoryStore;
use crate::linguistics::{LinguisticServices, ModelError};
use crate::matcher;
use crate::questions::{QuestionBank, QuestionSource, QuestionSourceError};
use crate::types::{Question, QuestionId, SubmissionResult};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Fatal at startup
    #[error(transparent)]
    ModelUnavailable(#[from] ModelError),

    #[error(transparent)]
    QuestionSource(#[from] QuestionSourceError),

    #[error("No question is currently loaded")]
    NoActiveQuestion,
}

pub struct Engine {
    services: Arc<LinguisticServices>,
    source: Arc<dyn QuestionSource>,
    history: Arc<QuestionHistoryStore>,
    /// Question of the running round; signatures are final once stored here
    current: RwLock<Option<Arc<Question>>>,
}

impl Engine {
    pub fn new(
        services: Arc<LinguisticServices>,
        source: Arc<dyn QuestionSource>,
        history: Arc<QuestionHistoryStore>,
    ) -> Self {
        Self {
            services,
            source,
            history,
            current: RwLock::new(None),
        }
    }

    /// Build the engine from configuration.
    ///
    /// Fails if the linguistic model or the question bank cannot be loaded.
    /// An unusable history path only disables deduplication.
    pub async fn bootstrap(config: &EngineConfig) -> Result<Self, EngineError> {
        let services = LinguisticServices::load(config)?;
        tracing::info!("Linguistic services ready ({} model)", services.model_name());

        let bank = QuestionBank::load(&config.questions_path)?;
        let history = QuestionHistoryStore::open(&config.history_path).await;

        Ok(Self::new(
            Arc::new(services),
            Arc::new(bank),
            Arc::new(history),
        ))
    }

    /// Fetch an unused question and make it the current one.
    ///
    /// Replaces any question already loaded without recording it as used.
    pub async fn load_question(&self, category: Option<&str>) -> Result<Arc<Question>, EngineError> {
        let excluded = self.history.load_all().await;
        let row = self
            .source
            .fetch_random_question(category, &excluded)
            .await?;

        let answers = CanonicalAnswerSet::build(&row.answers, &self.services).map_err(|reason| {
            QuestionSourceError::Malformed {
                id: row.id,
                reason,
            }
        })?;

        let question = Arc::new(Question {
            id: row.id,
            category: row.category,
            prompt: row.prompt,
            answers,
        });

        let previous = self.current.write().await.replace(question.clone());
        if let Some(previous) = previous {
            tracing::info!("Question {} replaced before its round ended", previous.id);
        }

        tracing::info!(
            "Loaded question {} ({} answers, category {:?})",
            question.id,
            question.answers.len(),
            question.category
        );
        Ok(question)
    }

    /// Judge a submission against the current question.
    ///
    /// Returns `NoMatch` when no question is loaded.
    pub async fn judge(&self, user_text: &str) -> SubmissionResult {
        let Some(question) = self.current_question().await else {
            tracing::debug!("Submission judged with no question loaded");
            return SubmissionResult::NoMatch;
        };

        let result = matcher::judge(user_text, &question.answers, &self.services);
        tracing::debug!(
            "Judged {:?} for question {}: {:?}",
            user_text,
            question.id,
            result
        );
        result
    }

    /// End the round: record the current question as used and discard it
    pub async fn mark_current_question_used(&self) -> Result<QuestionId, EngineError> {
        let question = self
            .current
            .write()
            .await
            .take()
            .ok_or(EngineError::NoActiveQuestion)?;

        if !self.history.mark_used(question.id).await {
            tracing::debug!("Question {} was not newly recorded", question.id);
        }
        tracing::info!("Round ended for question {}", question.id);
        Ok(question.id)
    }

    pub async fn current_question(&self) -> Option<Arc<Question>> {
        self.current.read().await.clone()
    }

    /// Administrative reset of the question history
    pub async fn clear_history(&self) {
        self.history.clear().await;
    }

    pub async fn categories(&self) -> Vec<String> {
        self.source.categories().await
    }

    pub fn history(&self) -> &QuestionHistoryStore {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::StoreState;
    use crate::linguistics::DictionaryModel;
    use std::collections::HashSet;

    const BANK: &str = r#"[
        {"id": 10, "category": "napoje", "prompt": "Co pijemy rano?",
         "answers": [
            {"text": "woda", "points": 35},
            {"text": "herbata", "points": 25},
            {"text": "kawa z mlekiem", "points": 15}
         ]},
        {"id": 11, "category": "napoje", "prompt": "Co pijemy latem?",
         "answers": [{"text": "lemoniada", "points": 50}, {"text": "piwo", "points": 20}]}
    ]"#;

    fn engine() -> Engine {
        let services = LinguisticServices::new(Box::new(DictionaryModel::from_entries([(
            "mlekiem", "mleko",
        )])));
        Engine::new(
            Arc::new(services),
            Arc::new(QuestionBank::from_json(BANK).unwrap()),
            Arc::new(QuestionHistoryStore::in_memory()),
        )
    }

    #[tokio::test]
    async fn test_judge_without_question_is_no_match() {
        let engine = engine();
        assert_eq!(engine.judge("woda").await, SubmissionResult::NoMatch);
    }

    #[tokio::test]
    async fn test_rounds_never_repeat_until_cleared() {
        let engine = engine();
        let mut served = HashSet::new();

        for _ in 0..2 {
            let question = engine.load_question(Some("napoje")).await.unwrap();
            assert!(served.insert(question.id), "question {} repeated", question.id);
            engine.mark_current_question_used().await.unwrap();
        }

        let result = engine.load_question(Some("napoje")).await;
        assert!(matches!(
            result,
            Err(EngineError::QuestionSource(QuestionSourceError::Exhausted { .. }))
        ));

        engine.clear_history().await;
        assert!(engine.load_question(Some("napoje")).await.is_ok());
    }

    #[tokio::test]
    async fn test_judge_against_loaded_question() {
        let engine = engine();
        let excluded: HashSet<QuestionId> = [11].into_iter().collect();
        for id in excluded {
            engine.history().mark_used(id).await;
        }

        let question = engine.load_question(None).await.unwrap();
        assert_eq!(question.id, 10);
        assert_eq!(
            engine.judge("Kawa z Mlekiem").await,
            SubmissionResult::Matched {
                rank: 3,
                points: 15,
                raw_text: "kawa z mlekiem".to_string()
            }
        );
        assert_eq!(engine.judge("sok").await, SubmissionResult::NoMatch);
    }

    #[tokio::test]
    async fn test_mark_used_without_question() {
        let engine = engine();
        assert!(matches!(
            engine.mark_current_question_used().await,
            Err(EngineError::NoActiveQuestion)
        ));
    }

    #[tokio::test]
    async fn test_mark_used_discards_current_question() {
        let engine = engine();
        let question = engine.load_question(None).await.unwrap();
        let id = engine.mark_current_question_used().await.unwrap();
        assert_eq!(id, question.id);
        assert!(engine.current_question().await.is_none());
        assert!(engine.history().is_used(id).await);
    }

    #[tokio::test]
    async fn test_disabled_history_still_serves_questions() {
        let services = LinguisticServices::new(Box::new(DictionaryModel::from_entries([(
            "mlekiem", "mleko",
        )])));
        let engine = Engine::new(
            Arc::new(services),
            Arc::new(QuestionBank::from_json(BANK).unwrap()),
            Arc::new(QuestionHistoryStore::disabled()),
        );
        assert_eq!(engine.history().state().await, StoreState::Disabled);

        for _ in 0..5 {
            engine.load_question(None).await.unwrap();
            engine.mark_current_question_used().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_concurrent_judges_share_question() {
        let engine = Arc::new(engine());
        engine.history().mark_used(11).await;
        engine.load_question(None).await.unwrap();

        let handles: Vec<_> = ["woda", "herbata", "kawa z mlekiem", "nic"]
            .into_iter()
            .map(|text| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.judge(text).await.rank() })
            })
            .collect();

        let mut ranks = Vec::new();
        for handle in handles {
            ranks.push(handle.await.unwrap());
        }
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3), None]);
    }

    #[tokio::test]
    async fn test_bootstrap_fails_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            lemma_dictionary_path: dir.path().join("missing.tsv"),
            questions_path: dir.path().join("questions.json"),
            history_path: dir.path().join("used.txt"),
            ..EngineConfig::default()
        };
        let result = Engine::bootstrap(&config).await;
        assert!(matches!(result, Err(EngineError::ModelUnavailable(_))));
    }
}
