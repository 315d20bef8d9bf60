//! Error types shared across the backend crates.

/// Domain-level error for library, device, and filesystem operations.
///
/// Variants carry the user-facing message directly; callers that need a
/// different rendering (HTTP status, job message) match on the variant.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation (bad path, unset storage root, bad value).
    #[error("{0}")]
    Validation(String),

    /// Written data does not match its source.
    #[error("{0}")]
    Integrity(String),

    /// Filesystem operation failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// No mounted volume matches, or the volume could not be inspected.
    #[error("{0}")]
    Device(String),

    /// A referenced entity does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
}
