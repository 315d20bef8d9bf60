//! Serial→title mapping row.

use serde::Serialize;
use sqlx::FromRow;

/// One row of the `title_map` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TitleMapping {
    pub serial: String,
    pub title: String,
}
