//! Row types for the catalog and title-map tables.

pub mod library;
pub mod title;

pub use library::LibraryEntry;
pub use title::TitleMapping;
