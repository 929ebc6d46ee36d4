//! # Stream Classification
//!
//! Maps a student's three chosen subjects to an academic stream.
//!
//! A selection is an unordered set, so the three ids are normalized into a
//! sorted [`SubjectTriple`] before lookup. The valid combinations live in the
//! database but are loaded once at startup into a [`CombinationIndex`] held in
//! server state, giving O(1) lookups per request with no query.
//!
//! Classification is a pure read: no match is an empty result, not an error.
//! Validation failures (wrong count, non-positive ids, duplicates) are errors.

use std::collections::HashMap;

use crate::{
    error::AppError,
    models::{ClassificationResult, CombinationRow},
};

/// Normalized, order-independent key for exactly three distinct subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectTriple([i64; 3]);

impl SubjectTriple {
    /// Validates and normalizes a subject selection.
    ///
    /// Duplicates are rejected rather than deduplicated: two identical ids
    /// mean the caller never picked three subjects.
    pub fn new(ids: &[i64]) -> Result<Self, AppError> {
        if ids.len() != 3 {
            return Err(AppError::InvalidSelection {
                details: format!("expected exactly 3 subject ids, got {}", ids.len()),
            });
        }

        if let Some(bad) = ids.iter().find(|id| **id <= 0) {
            return Err(AppError::InvalidSelection {
                details: format!("subject ids must be positive, got {bad}"),
            });
        }

        let mut key = [ids[0], ids[1], ids[2]];
        key.sort_unstable();

        if key[0] == key[1] || key[1] == key[2] {
            return Err(AppError::InvalidSelection {
                details: format!("subject ids must be distinct, got {ids:?}"),
            });
        }

        Ok(Self(key))
    }

    pub fn ids(&self) -> [i64; 3] {
        self.0
    }
}

/// The stream a combination rule points at.
#[derive(Debug, Clone)]
pub struct CombinationRule {
    pub stream_id: i64,
    pub stream_name: String,
    pub rule_label: String,
}

/// In-memory lookup table from normalized triples to streams.
pub struct CombinationIndex {
    rules: HashMap<SubjectTriple, CombinationRule>,
}

impl CombinationIndex {
    /// Builds the index from combination rows.
    ///
    /// The same triple mapping to two streams would make classification
    /// ambiguous, so that is rejected here at load time rather than
    /// resolved at query time.
    pub fn from_rows(rows: Vec<CombinationRow>) -> Result<Self, AppError> {
        let mut rules = HashMap::with_capacity(rows.len());

        for row in rows {
            let triple = SubjectTriple::new(&[row.subject_a, row.subject_b, row.subject_c])?;
            let rule = CombinationRule {
                stream_id: row.stream_id,
                stream_name: row.stream_name,
                rule_label: row.rule_label,
            };

            if let Some(existing) = rules.insert(triple, rule) {
                return Err(AppError::AmbiguousCombination {
                    details: format!(
                        "combination {:?} maps to more than one stream, including {}",
                        triple.ids(),
                        existing.stream_name,
                    ),
                });
            }
        }

        Ok(Self { rules })
    }

    /// Classifies a subject selection. `Ok(None)` means no seeded combination
    /// matches, which is a valid empty outcome.
    pub fn classify(&self, ids: &[i64]) -> Result<Option<ClassificationResult>, AppError> {
        let triple = SubjectTriple::new(ids)?;

        Ok(self.rules.get(&triple).map(|rule| ClassificationResult {
            stream_id: rule.stream_id,
            stream_name: rule.stream_name.clone(),
            matched_rule: rule.rule_label.clone(),
            subject_ids: triple.ids().to_vec(),
        }))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
