//! `SQLite` storage layer for `support_tickets`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - One short-lived connection per operation
//! - Transactions around every write
//! - WAL mode for concurrent reads
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main `SQLite` storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::TicketStore;
