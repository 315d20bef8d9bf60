//! Data access, one repository per table.

pub mod library_repo;
pub mod title_map_repo;

pub use library_repo::LibraryRepo;
pub use title_map_repo::TitleMapRepo;
