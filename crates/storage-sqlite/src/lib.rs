//! SQLite storage implementation for the regression engine.
//!
//! This crate provides the persistent masters a dump is taken from and a
//! restore writes into, using Diesel ORM with SQLite. It contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - A document-per-record master implementing `MasterTrait` for every category
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core
//! crate is storage-agnostic and talks to masters through traits.
//!
//! ```text
//!   core (dump, restore, compare)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod masters;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};
pub use masters::{open_masters, SqliteMaster};

// Re-export from regression-core for convenience
pub use regression_core::errors::{Error, Result};
