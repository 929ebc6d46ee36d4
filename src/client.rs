//! # Classification Client
//!
//! Typed client over the classification endpoint, mirroring the front-end
//! hook: it holds the request state machine `idle -> loading -> {classified,
//! no-match, error}`, re-entrant on every input change.
//!
//! The client is constructed explicitly with its base URL. No global
//! instance, no ambient configuration.
//!
//! Rapid input changes can leave an older request in flight; its response
//! must not overwrite state set by a newer one. Every request therefore
//! carries a generation number and a response is dropped when a later
//! `set_subjects` call has bumped the generation past it.

use std::sync::Mutex;

use reqwest::Client;

use crate::models::{ApiResponse, ClassificationResult, ClassifyRequest};

const NETWORK_ERROR: &str = "Network error occurred";
const CLASSIFY_ERROR: &str = "Failed to classify subjects";

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationState {
    Idle,
    Loading,
    Classified(ClassificationResult),
    NoMatch,
    Error(String),
}

struct Inner {
    state: ClassificationState,
    generation: u64,
}

pub struct ClassificationClient {
    http: Client,
    base_url: String,
    inner: Mutex<Inner>,
}

impl ClassificationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner: Mutex::new(Inner {
                state: ClassificationState::Idle,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> ClassificationState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Reacts to an input change. Classifies only when exactly three distinct
    /// positive subject ids are present; anything else clears back to idle
    /// without issuing a request.
    pub async fn set_subjects(&self, subject_ids: &[i64]) {
        if !complete_selection(subject_ids) {
            let mut inner = self.inner.lock().unwrap();
            // Bumping the generation also invalidates any request in flight.
            inner.generation += 1;
            inner.state = ClassificationState::Idle;
            return;
        }

        let generation = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            inner.state = ClassificationState::Loading;
            inner.generation
        };

        let outcome = self.classify(subject_ids).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            // A newer input change superseded this request.
            return;
        }

        inner.state = match outcome {
            Ok(Some(result)) => ClassificationState::Classified(result),
            Ok(None) => ClassificationState::NoMatch,
            Err(message) => ClassificationState::Error(message),
        };
    }

    async fn classify(&self, subject_ids: &[i64]) -> Result<Option<ClassificationResult>, String> {
        let url = format!("{}/api/streams/classify", self.base_url);
        let payload = ClassifyRequest {
            subject_ids: subject_ids.to_vec(),
        };

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|_| NETWORK_ERROR.to_string())?;

        let envelope: ApiResponse<ClassificationResult> = response
            .json()
            .await
            .map_err(|_| NETWORK_ERROR.to_string())?;

        if !envelope.success {
            return Err(envelope.error.unwrap_or_else(|| CLASSIFY_ERROR.to_string()));
        }

        Ok(envelope.data)
    }
}

fn complete_selection(ids: &[i64]) -> bool {
    ids.len() == 3
        && ids.iter().all(|id| *id > 0)
        && ids[0] != ids[1]
        && ids[1] != ids[2]
        && ids[0] != ids[2]
}
