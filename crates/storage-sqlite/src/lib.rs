//! SQLite storage implementation for Kakebo.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in `kakebo-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel queries are
//! written. `kakebo-core` stays database-agnostic apart from its transaction
//! seam and works with traits.
//!
//! ```text
//!        kakebo-core (domain)
//!               │
//!               ▼
//!     kakebo-storage-sqlite (this crate)
//!               │
//!               ▼
//!           SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod accounts;
pub mod executions;
pub mod plans;
pub mod reconciliation;
pub mod reminders;
pub mod transactions;
pub mod valuations;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from kakebo-core for convenience
pub use kakebo_core::db::{DbConnection, DbPool, DbTransactionExecutor};
pub use kakebo_core::errors::{DatabaseError, Error, Result};
