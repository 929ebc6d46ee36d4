//! # Wire & Reference Types
//!
//! Everything that crosses the HTTP boundary or comes out of the database.
//!
//! ## Response Envelope
//!
//! Every endpoint answers with the same envelope:
//! - `{ success: true, data: ... }` on success (`data` is `null` when a
//!   classification finds no matching stream)
//! - `{ success: false, error, details }` on failure
//!
//! Field names are camelCase on the wire to match the frontend payloads.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An A-level subject. Immutable reference data, seeded out of band.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// An academic track a student can be classified into.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// A degree course offered under a stream.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub university: String,
    pub stream_id: i64,
}

/// A course bookmarked by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedCourse {
    pub user_ref: String,
    pub course_id: i64,
    pub saved_at: i64,
}

/// One row of the valid-combination table, joined with its stream name.
#[derive(Debug, Clone, FromRow)]
pub struct CombinationRow {
    pub id: i64,
    pub stream_id: i64,
    pub stream_name: String,
    pub rule_label: String,
    pub subject_a: i64,
    pub subject_b: i64,
    pub subject_c: i64,
}

/// Outcome of a classification. Built fresh per request, never persisted.
///
/// `subject_ids` echoes the classified triple in normalized (ascending)
/// order, so `[1,2,3]` and `[3,1,2]` produce byte-identical responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub stream_id: i64,
    pub stream_name: String,
    pub matched_rule: String,
    pub subject_ids: Vec<i64>,
}

/// Body of `POST /api/streams/classify`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    pub subject_ids: Vec<i64>,
}

/// Body of `POST /api/saved-courses`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCourseRequest {
    pub user_ref: String,
    pub course_id: i64,
}

/// The response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    /// Success with no payload, e.g. a classification that matched nothing.
    pub fn none() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            details: None,
        }
    }

    pub fn err(error: String, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            details,
        }
    }
}
