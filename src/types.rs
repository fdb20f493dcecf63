use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

use crate::answers::CanonicalAnswerSet;
use crate::text::{normalize, NormalizeMode};

/// Identifier of a question row in the question source
pub type QuestionId = i64;

/// Comparison form of an answer: normalized, lemmatized, stop-word-filtered
/// tokens, with the set and collapsed phrase derived once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    tokens: Vec<String>,
    set: HashSet<String>,
    phrase: String,
}

impl Signature {
    pub fn new(tokens: Vec<String>) -> Self {
        let set = tokens.iter().cloned().collect();
        let phrase = normalize(&tokens.join(" "), NormalizeMode::Collapsed);
        Self {
            tokens,
            set,
            phrase,
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens with duplicates collapsed and order ignored
    pub fn token_set(&self) -> &HashSet<String> {
        &self.set
    }

    /// Tokens joined with whitespace stripped, used for typo scoring
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.tokens)
    }
}

/// One of the predefined correct answers for a question
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalAnswer {
    /// Answer as authored, shown to the audience once revealed
    pub raw_text: String,
    /// Display position, 1..=6
    pub rank: u8,
    pub points: u32,
    pub signature: Signature,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: Option<String>,
    pub prompt: String,
    /// Ordered by rank ascending
    pub answers: CanonicalAnswerSet,
}

/// Outcome of judging one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionResult {
    Matched {
        rank: u8,
        points: u32,
        raw_text: String,
    },
    NoMatch,
}

impl SubmissionResult {
    pub fn rank(&self) -> Option<u8> {
        match self {
            SubmissionResult::Matched { rank, .. } => Some(*rank),
            SubmissionResult::NoMatch => None,
        }
    }
}

impl From<&CanonicalAnswer> for SubmissionResult {
    fn from(answer: &CanonicalAnswer) -> Self {
        SubmissionResult::Matched {
            rank: answer.rank,
            points: answer.points,
            raw_text: answer.raw_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_derived_forms() {
        let sig = Signature::new(vec![
            "kawa".to_string(),
            "mleko".to_string(),
            "kawa".to_string(),
        ]);
        assert_eq!(sig.len(), 3);
        assert_eq!(sig.token_set().len(), 2);
        assert_eq!(sig.phrase(), "kawamlekokawa");
    }

    #[test]
    fn test_submission_result_json_shape() {
        let matched = SubmissionResult::Matched {
            rank: 3,
            points: 15,
            raw_text: "kawa z mlekiem".to_string(),
        };
        let json = serde_json::to_value(&matched).unwrap();
        assert_eq!(json["result"], "MATCHED");
        assert_eq!(json["rank"], 3);
        assert_eq!(json["points"], 15);

        let json = serde_json::to_value(SubmissionResult::NoMatch).unwrap();
        assert_eq!(json["result"], "NO_MATCH");
    }

    #[test]
    fn test_signature_serializes_as_tokens() {
        let sig = Signature::new(vec!["kawa".to_string(), "mleko".to_string()]);
        assert_eq!(
            serde_json::to_value(&sig).unwrap(),
            serde_json::json!(["kawa", "mleko"])
        );
    }
}
