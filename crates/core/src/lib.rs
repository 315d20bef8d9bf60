//! Domain types and pure logic shared across the romen backend.
//!
//! Holds the error taxonomy, the serial/title normalization and media
//! classification rules, and the settings file that configures the library
//! (storage root, staging directory, cover source, device folder layout).

pub mod error;
pub mod media;
pub mod settings;

pub use error::CoreError;
