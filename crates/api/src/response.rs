use serde::Serialize;
use uuid::Uuid;

/// Acknowledgement returned as soon as an upload has been staged and queued.
///
/// The client polls `/job/{job_id}` for the outcome.
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: Uuid,
}

impl JobAccepted {
    pub fn new(job_id: Uuid) -> Self {
        Self { job_id }
    }
}

/// Outcome envelope for synchronous actions (device selection, removal).
///
/// Serializes to `{"status": ..., "message": ...}` with optional `path` and
/// `warnings` fields only when set.
#[derive(Debug, Serialize)]
pub struct ActionOutcome {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            path: None,
            warnings: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            path: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}
