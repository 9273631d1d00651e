//! HTTP surface of the upload ingestion service
//!
//! The binary in `main.rs` wires [`state::AppState`] from the environment and
//! serves [`routes::create_router`]. Tests build the same router around
//! in-memory collaborators.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
