//! HTTP facade over ingestion and retrieval.
//!
//! Exposes two tool endpoints, `POST /tools/embed_and_upsert` and
//! `POST /tools/search_similar`, plus `GET /health`. Handlers validate
//! request shape up front, delegate to the ingest pipeline or the ranking
//! engine, and map domain errors to stable JSON error bodies.

pub mod api;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use api::{EmbedAndUpsertRequest, HealthResponse, SearchSimilarRequest};
pub use error::{ApiError, ServiceError};
pub use routes::router;
pub use server::{serve, serve_with_shutdown};
pub use state::AppState;
