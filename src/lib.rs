//! Dynasty: REST service for college-football dynasty save data.
//!
//! The domain model and store live in `dynasty-core` and are re-exported
//! here; this crate adds the HTTP API, runtime configuration and a typed
//! client for the API.

pub mod api;
pub mod client;
pub mod config;

pub use dynasty_core::{db, models, seed, Database, StoreError};
