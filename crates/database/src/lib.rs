//! # Class Portal Database Crate
//!
//! This crate is the only place that knows about SQL. It owns the single
//! `class_semester_info` table and exposes it through the [`RecordStore`]
//! trait so the web layer can be handed either the PostgreSQL-backed
//! [`DbRepository`] or the [`InMemoryRepository`] test double.
//!
//! ## Public API
//!
//! - `connect`: builds the `PgPool` from the `[database]` settings.
//! - `run_migrations`: applies the bundled schema.
//! - `RecordStore`: the data access seam used by every handler.
//! - `DbError`: the error type returned by every store operation.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_options, run_migrations};
pub use error::DbError;
pub use memory::InMemoryRepository;
pub use repository::{DbRepository, RecordStore};
