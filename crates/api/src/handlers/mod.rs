//! HTTP request handlers, grouped by resource.

pub mod device;
pub mod library;
pub mod upload;
