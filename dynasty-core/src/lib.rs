//! Core library for Dynasty.
//!
//! This crate provides the domain models, validation rules and document
//! storage for dynasty save data (schools, coaches, season schedules),
//! independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use dynasty_core::db::Database;
//! use dynasty_core::seed;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//! db.seed_schools(seed::bundled_schools()?)?;
//!
//! let conferences = db.conferences()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod validate;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{InvariantError, StoreError, StoreResult, ValidationErrors};
