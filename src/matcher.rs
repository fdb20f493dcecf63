//! Judging a free-text submission against the canonical answer set.
//!
//! An answer matches when its signature equals the candidate's as a set.
//! Two-token signatures additionally forgive small typos: the collapsed
//! phrases are compared by edit distance. Every answer is tried for an exact
//! match before any typo fallback, and within each pass the first answer in
//! the set's iteration order wins.
//!
//! Typo tolerance works on reduced signatures, so it only forgives typos the
//! linguistic model still reduces to a nearby lemma. A misspelled inflected
//! form the model does not know keeps its surface form and is usually too
//! far from the canonical lemma to match.

use crate::answers::CanonicalAnswerSet;
use crate::linguistics::LinguisticServices;
use crate::types::{Signature, SubmissionResult};

/// Largest edit distance still accepted by the typo-tolerant fallback
pub const TYPO_TOLERANCE: usize = 2;

/// Signature length the typo-tolerant fallback applies to
const TYPO_SIGNATURE_LEN: usize = 2;

/// Judge `user_text` against `answers`.
///
/// Pure with respect to engine state; safe to call concurrently against the
/// same set.
pub fn judge(
    user_text: &str,
    answers: &CanonicalAnswerSet,
    services: &LinguisticServices,
) -> SubmissionResult {
    if user_text.trim().is_empty() {
        return SubmissionResult::NoMatch;
    }

    let candidate = Signature::new(services.signature_tokens(user_text));

    let all = answers.all();
    all.iter()
        .find(|answer| exact_match(&candidate, &answer.signature))
        .or_else(|| {
            all.iter()
                .find(|answer| within_typo_tolerance(&candidate, &answer.signature))
        })
        .map(SubmissionResult::from)
        .unwrap_or(SubmissionResult::NoMatch)
}

fn exact_match(candidate: &Signature, canonical: &Signature) -> bool {
    candidate.token_set() == canonical.token_set()
}

fn within_typo_tolerance(candidate: &Signature, canonical: &Signature) -> bool {
    candidate.len() == TYPO_SIGNATURE_LEN
        && canonical.len() == TYPO_SIGNATURE_LEN
        && levenshtein_distance(candidate.phrase(), canonical.phrase()) <= TYPO_TOLERANCE
}

/// Character-level Levenshtein distance
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}
