//! In-memory upload job tracking.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// State of one upload job.
///
/// A job transitions exactly once, from `Processing` to either `Completed`
/// or `Error`. Serializes to the polling payload the front-end consumes:
/// `{"status": "completed", "message": ..., "title": ..., "cover_url": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Processing,
    Completed {
        message: String,
        title: String,
        cover_url: String,
    },
    Error {
        message: String,
    },
}

/// Concurrency-safe job id → state map shared by the accept, pipeline, and
/// polling paths.
///
/// States live only in process memory. Unknown ids read as `Processing`
/// so a client that polls across a restart sees a stale spinner rather
/// than a crash; it never learns more because there is nothing to know.
#[derive(Default)]
pub struct JobTracker {
    states: RwLock<HashMap<Uuid, JobState>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted job as processing and return its id.
    pub async fn start(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.states.write().await.insert(id, JobState::Processing);
        id
    }

    /// Record a terminal state for `id`.
    pub async fn finish(&self, id: Uuid, state: JobState) {
        self.states.write().await.insert(id, state);
    }

    /// Current state for `id`; unknown ids read as processing.
    pub async fn status(&self, id: Uuid) -> JobState {
        self.states
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or(JobState::Processing)
    }
}
