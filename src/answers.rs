//! Canonical answer set of the active question.
//!
//! Signatures are computed once when the set is built and never change
//! afterwards, so the set can be shared freely between concurrent judges.

use serde::Serialize;
use std::collections::HashSet;

use crate::linguistics::LinguisticServices;
use crate::questions::AnswerRow;
use crate::types::{CanonicalAnswer, Signature};

/// Upper bound on answers per question
pub const MAX_ANSWERS: usize = 6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnswerSetError {
    #[error("Question has no answers")]
    NoAnswers,

    #[error("Question has {0} answers, at most {max} are allowed", max = MAX_ANSWERS)]
    TooManyAnswers(usize),

    #[error("Answer rank {0} is outside 1..={max}", max = MAX_ANSWERS)]
    RankOutOfRange(u8),

    #[error("Answer rank {0} is used more than once")]
    DuplicateRank(u8),
}

/// Drop blank answers, resolve ranks and check the set invariants.
///
/// A missing rank defaults to the answer's 1-based position among the
/// non-blank answers.
pub(crate) fn ranked_rows(rows: &[AnswerRow]) -> Result<Vec<(u8, &AnswerRow)>, AnswerSetError> {
    let present: Vec<&AnswerRow> = rows.iter().filter(|r| !r.text.trim().is_empty()).collect();

    if present.is_empty() {
        return Err(AnswerSetError::NoAnswers);
    }
    if present.len() > MAX_ANSWERS {
        return Err(AnswerSetError::TooManyAnswers(present.len()));
    }

    let mut seen = HashSet::new();
    let mut ranked = Vec::with_capacity(present.len());
    for (position, row) in present.into_iter().enumerate() {
        let rank = row.rank.unwrap_or(position as u8 + 1);
        if rank == 0 || rank as usize > MAX_ANSWERS {
            return Err(AnswerSetError::RankOutOfRange(rank));
        }
        if !seen.insert(rank) {
            return Err(AnswerSetError::DuplicateRank(rank));
        }
        ranked.push((rank, row));
    }

    ranked.sort_by_key(|(rank, _)| *rank);
    Ok(ranked)
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CanonicalAnswerSet {
    answers: Vec<CanonicalAnswer>,
}

impl CanonicalAnswerSet {
    /// Build the set, precomputing every answer's signature
    pub fn build(
        rows: &[AnswerRow],
        services: &LinguisticServices,
    ) -> Result<Self, AnswerSetError> {
        let answers = ranked_rows(rows)?
            .into_iter()
            .map(|(rank, row)| CanonicalAnswer {
                raw_text: row.text.clone(),
                rank,
                points: row.points,
                signature: build_signature(services, &row.text),
            })
            .collect();

        Ok(Self { answers })
    }

    pub fn lookup(&self, rank: u8) -> Option<&CanonicalAnswer> {
        self.answers.iter().find(|a| a.rank == rank)
    }

    /// All answers in rank order
    pub fn all(&self) -> &[CanonicalAnswer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

pub fn build_signature(services: &LinguisticServices, raw_text: &str) -> Signature {
    Signature::new(services.signature_tokens(raw_text))
}
