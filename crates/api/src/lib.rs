//! HTTP surface for the game library server.
//!
//! Routes, handlers, and shared application state live here; the binary in
//! `main.rs` wires them to the runtime pieces (settings, catalog, pipeline)
//! and starts the server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;
