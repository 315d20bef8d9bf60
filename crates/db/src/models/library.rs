//! Catalog row for an ingested game.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `library` table, serialized as-is in API listings.
///
/// `serial` holds the canonical form (`SLUS-20002`); `filepath` is the
/// absolute destination the image was copied to, which keeps the raw
/// on-disc serial in its file name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub serial: String,
    pub title: String,
    pub filepath: String,
    pub size: Option<i64>,
    pub cover_url: Option<String>,
}
