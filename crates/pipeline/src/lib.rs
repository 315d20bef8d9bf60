//! Ingestion pipeline: upload jobs, title resolution, cover fetching.
//!
//! [`UploadController`] owns one background unit of work per accepted
//! upload: extract the serial from the staged image, resolve and sanitize
//! the title, file the image into the size-based layout on the storage
//! device, verify the copy, register the catalog row, and fetch cover art.
//! Outcomes are exposed through the in-memory [`JobTracker`], which the
//! HTTP layer polls.

pub mod covers;
pub mod ingest;
pub mod jobs;
pub mod titles;

pub use covers::CoverFetcher;
pub use ingest::{IngestError, RemovalOutcome, UploadController};
pub use jobs::{JobState, JobTracker};
pub use titles::TitleResolver;
