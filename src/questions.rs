//! Question source: picks a random, not-yet-used question row.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::answers::{ranked_rows, AnswerSetError};
use crate::text::{normalize, NormalizeMode};
use crate::types::QuestionId;

/// Result type for question source operations
pub type QuestionResult<T> = Result<T, QuestionSourceError>;

/// Errors a round-lifecycle owner must handle when fetching a question
#[derive(Debug, thiserror::Error)]
pub enum QuestionSourceError {
    #[error("Question source unavailable: {0}")]
    Unavailable(String),

    #[error("No questions in category {}", label(.category))]
    EmptyCategory { category: Option<String> },

    #[error("All questions in category {} have already been used", label(.category))]
    Exhausted { category: Option<String> },

    #[error("Question {id} is malformed: {reason}")]
    Malformed {
        id: QuestionId,
        reason: AnswerSetError,
    },
}

fn label(category: &Option<String>) -> String {
    match category {
        Some(name) => format!("'{}'", name),
        None => "(any)".to_string(),
    }
}

/// A raw answer as stored alongside its question
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRow {
    pub text: String,
    #[serde(default)]
    pub points: u32,
    /// Display position; defaults to the answer's position in the row
    #[serde(default)]
    pub rank: Option<u8>,
}

/// A raw question row as stored in the question source
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRow {
    pub id: QuestionId,
    #[serde(default)]
    pub category: Option<String>,
    pub prompt: String,
    pub answers: Vec<AnswerRow>,
}

/// Source of questions for new rounds
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Pick a random question in `category` (any category when `None`)
    /// whose id is not in `excluded`
    async fn fetch_random_question(
        &self,
        category: Option<&str>,
        excluded: &HashSet<QuestionId>,
    ) -> QuestionResult<QuestionRow>;

    /// Known categories, for the host UI
    async fn categories(&self) -> Vec<String>;
}

/// In-memory question bank loaded from a JSON array of rows
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    rows: Vec<QuestionRow>,
}

impl QuestionBank {
    /// Build a bank, skipping rows that violate the answer-set invariants
    /// and rows whose id was already seen.
    pub fn new(rows: Vec<QuestionRow>) -> Self {
        let mut ids = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| {
                if let Err(e) = ranked_rows(&row.answers) {
                    tracing::warn!("Skipping question {}: {}", row.id, e);
                    return false;
                }
                if !ids.insert(row.id) {
                    tracing::warn!("Skipping question {}: duplicate id", row.id);
                    return false;
                }
                true
            })
            .collect();
        Self { rows }
    }

    /// Parse a JSON array of rows. A row that does not fit the row shape
    /// (missing prompt, rank or points out of range) is skipped like any
    /// other malformed row; only a document that is not an array fails.
    pub fn from_json(json: &str) -> QuestionResult<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| QuestionSourceError::Unavailable(format!("invalid question JSON: {}", e)))?;

        let rows = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let id = value.get("id").cloned();
                match serde_json::from_value::<QuestionRow>(value) {
                    Ok(row) => Some(row),
                    Err(e) => {
                        match id {
                            Some(id) => tracing::warn!("Skipping question {}: {}", id, e),
                            None => tracing::warn!("Skipping question row #{}: {}", index, e),
                        }
                        None
                    }
                }
            })
            .collect();
        Ok(Self::new(rows))
    }

    pub fn load(path: &Path) -> QuestionResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            QuestionSourceError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        let bank = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} questions from {}",
            bank.len(),
            path.display()
        );
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn in_category<'a>(&'a self, category: Option<&'a str>) -> impl Iterator<Item = &'a QuestionRow> {
        let wanted = category.map(|c| normalize(c, NormalizeMode::Tokenizing));
        self.rows.iter().filter(move |row| match &wanted {
            None => true,
            Some(wanted) => row
                .category
                .as_deref()
                .is_some_and(|c| normalize(c, NormalizeMode::Tokenizing) == *wanted),
        })
    }
}

#[async_trait]
impl QuestionSource for QuestionBank {
    async fn fetch_random_question(
        &self,
        category: Option<&str>,
        excluded: &HashSet<QuestionId>,
    ) -> QuestionResult<QuestionRow> {
        let in_category: Vec<&QuestionRow> = self.in_category(category).collect();
        if in_category.is_empty() {
            return Err(QuestionSourceError::EmptyCategory {
                category: category.map(str::to_string),
            });
        }

        let eligible: Vec<&QuestionRow> = in_category
            .into_iter()
            .filter(|row| !excluded.contains(&row.id))
            .collect();

        eligible
            .choose(&mut rand::rng())
            .map(|row| (*row).clone())
            .ok_or_else(|| QuestionSourceError::Exhausted {
                category: category.map(str::to_string),
            })
    }

    async fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .rows
            .iter()
            .filter_map(|row| row.category.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        categories.sort();
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"[
        {"id": 1, "category": "Jedzenie", "prompt": "Co pijemy rano?",
         "answers": [{"text": "kawa", "points": 40}, {"text": "herbata", "points": 30}]},
        {"id": 2, "category": "jedzenie", "prompt": "Co jemy na obiad?",
         "answers": [{"text": "zupa", "points": 50, "rank": 1}]},
        {"id": 3, "category": "Sport", "prompt": "Popularna dyscyplina?",
         "answers": [{"text": "pilka nozna", "points": 60}]},
        {"id": 4, "category": "Sport", "prompt": "Zepsute pytanie",
         "answers": [{"text": "a", "rank": 1}, {"text": "b", "rank": 1}]},
        {"id": 3, "category": "Sport", "prompt": "Duplikat",
         "answers": [{"text": "x"}]}
    ]"#;

    #[test]
    fn test_bank_skips_malformed_and_duplicate_rows() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn test_rows_with_out_of_range_fields_are_skipped() {
        let json = r#"[
            {"id": 1, "prompt": "Dobre", "answers": [{"text": "kawa", "points": 10}]},
            {"id": 2, "prompt": "Ranga", "answers": [{"text": "kawa", "rank": 300}]},
            {"id": 3, "prompt": "Punkty", "answers": [{"text": "kawa", "points": -1}]},
            {"id": 4, "answers": [{"text": "kawa"}]},
            "not a row",
            {"id": 5, "prompt": "Też dobre", "answers": [{"text": "herbata", "rank": 1}]}
        ]"#;
        let bank = QuestionBank::from_json(json).unwrap();
        let ids: Vec<QuestionId> = bank.rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_invalid_json_is_unavailable() {
        let result = QuestionBank::from_json("{not json");
        assert!(matches!(result, Err(QuestionSourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_filters_category_case_insensitively() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        for _ in 0..20 {
            let row = bank
                .fetch_random_question(Some("JEDZENIE"), &HashSet::new())
                .await
                .unwrap();
            assert!(row.id == 1 || row.id == 2);
        }
    }

    #[tokio::test]
    async fn test_fetch_skips_excluded_ids() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        let excluded: HashSet<QuestionId> = [1].into_iter().collect();
        for _ in 0..20 {
            let row = bank
                .fetch_random_question(Some("jedzenie"), &excluded)
                .await
                .unwrap();
            assert_eq!(row.id, 2);
        }
    }

    #[tokio::test]
    async fn test_fetch_any_category() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        let excluded: HashSet<QuestionId> = [1, 2].into_iter().collect();
        let row = bank.fetch_random_question(None, &excluded).await.unwrap();
        assert_eq!(row.id, 3);
    }

    #[tokio::test]
    async fn test_exhausted_and_empty_categories() {
        let bank = QuestionBank::from_json(BANK).unwrap();

        let excluded: HashSet<QuestionId> = [3].into_iter().collect();
        let result = bank.fetch_random_question(Some("Sport"), &excluded).await;
        assert!(matches!(result, Err(QuestionSourceError::Exhausted { .. })));

        let result = bank
            .fetch_random_question(Some("Historia"), &HashSet::new())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, QuestionSourceError::EmptyCategory { .. }));
        assert!(err.to_string().contains("'Historia'"));
    }

    #[tokio::test]
    async fn test_categories_are_sorted_and_unique() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        assert_eq!(bank.categories().await, vec!["Jedzenie", "Sport", "jedzenie"]);
    }
}
