//! HTTP surface for the review pipeline.
//!
//! Two concerns: the thin review CRUD boundary that feeds the Publisher,
//! and operator endpoints (health, queue stats, dead letters, metrics,
//! rating reads with snapshot fallback).

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
