//! # dochub-api
//!
//! HTTP API layer for DocHub built on Axum.
//!
//! Provides the REST endpoints for workspaces and the documentation tree,
//! the chat event stream, middleware (CORS, compression, request logging),
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
