//! Candidate operations behind the HTTP handlers
//!
//! Reads load the current snapshot directly. Every write runs its whole
//! load → merge → swap cycle while holding the writer lock, and the swap is
//! additionally checked against the snapshot version, so overlapping
//! submissions can never silently discard each other.

use std::sync::Arc;

use intake_common::merge::{merge, MergeResult, RecordOutcome, Rejection};
use intake_common::pagination::{paginate, Page};
use intake_common::schema::{validate_candidate, Violation};
use intake_common::{CandidateRecord, CandidateStore, Snapshot};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Counts reported for an accepted batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub added: usize,
    pub merged: usize,
    pub outcomes: Vec<RecordOutcome>,
}

/// Outcome of one batch submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(BatchSummary),
    Rejected(Vec<Rejection>),
}

/// A looked-up record plus its completeness report
#[derive(Debug, Clone, Serialize)]
pub struct CandidateDetails {
    pub candidate: CandidateRecord,
    /// Present only when the record fails the completeness check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completeness: Option<Vec<Violation>>,
}

/// Candidate operations over one store
#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    writer: Arc<Mutex<()>>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// One page of the stored record set
    pub async fn list(&self, page: usize) -> ApiResult<Page<CandidateRecord>> {
        let snapshot = self.load().await?;
        Ok(paginate(&snapshot.records, page))
    }

    /// Find a record by session id and report what it is still missing
    ///
    /// The completeness check runs on the entry as stored, so a hand-edited
    /// entry with null or wrongly-typed members is reported, not refused.
    pub async fn get_by_session_id(&self, session_id: &str) -> ApiResult<CandidateDetails> {
        let documents = self.load_documents().await?;
        let document = documents
            .into_iter()
            .find(|doc| doc.get("sessionId").and_then(Value::as_str) == Some(session_id))
            .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))?;

        let report = validate_candidate(&document);
        let completeness = (!report.is_valid()).then(|| report.violations().to_vec());

        if let Some(violations) = &completeness {
            debug!(
                "Candidate {} is incomplete ({} fields)",
                session_id,
                violations.len()
            );
        }

        let candidate: CandidateRecord = serde_json::from_value(document)
            .map_err(|e| ApiError::Internal(format!("Decode candidate failed: {}", e)))?;

        Ok(CandidateDetails {
            candidate,
            completeness,
        })
    }

    /// Merge a batch into the store; all entries apply or none do
    pub async fn submit_batch(&self, entries: Vec<Value>) -> ApiResult<SubmitOutcome> {
        let _guard = self.writer.lock().await;
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || -> ApiResult<SubmitOutcome> {
            let snapshot = store.load()?;

            match merge(&snapshot.records, &entries) {
                MergeResult::Applied {
                    updated_set,
                    added_count,
                    merged_count,
                    outcomes,
                } => {
                    let version = store.try_swap(snapshot.version, &updated_set)?;
                    info!(
                        "Batch of {} accepted: {} added, {} merged (store version {})",
                        entries.len(),
                        added_count,
                        merged_count,
                        version
                    );
                    Ok(SubmitOutcome::Accepted(BatchSummary {
                        added: added_count,
                        merged: merged_count,
                        outcomes,
                    }))
                }
                MergeResult::Rejected { rejections } => {
                    warn!(
                        "Batch of {} rejected: {} invalid entries, nothing written",
                        entries.len(),
                        rejections.len()
                    );
                    Ok(SubmitOutcome::Rejected(rejections))
                }
            }
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Merge task failed: {}", e)))?
    }

    async fn load(&self) -> ApiResult<Snapshot> {
        let store = Arc::clone(&self.store);
        let snapshot = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| ApiError::Internal(format!("Load task failed: {}", e)))??;
        Ok(snapshot)
    }

    async fn load_documents(&self) -> ApiResult<Vec<Value>> {
        let store = Arc::clone(&self.store);
        let documents = tokio::task::spawn_blocking(move || store.load_documents())
            .await
            .map_err(|e| ApiError::Internal(format!("Load task failed: {}", e)))??;
        Ok(documents)
    }
}
