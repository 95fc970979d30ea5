//! `support_tickets` - persistence layer for support tickets
//!
//! Stores tickets in a single `SQLite` table and exposes four operations on
//! [`TicketStore`]: initialize, create, list (optionally filtered by status)
//! and update status.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`model`] - Data types (Ticket)
//! - [`storage`] - `SQLite` database layer
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`logging`] - Subscriber setup and log capture
//! - [`util`] - ID generation and clock capabilities
//!
//! # Quick Start
//!
//! ```no_run
//! use support_tickets::TicketStore;
//!
//! let store = TicketStore::new("support_tickets.db");
//! store.initialize()?;
//!
//! let id = store.create_ticket("u1", "printer broken", "t1.pdf")?;
//! store.update_ticket_status(&id, "Resolved")?;
//!
//! for ticket in store.list_tickets(Some("Resolved"))? {
//!     println!("{} {}", ticket.ticket_id, ticket.description);
//! }
//! # Ok::<(), support_tickets::TicketError>(())
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;

pub use config::StoreConfig;
pub use error::{Result, StorageStage, TicketError};
pub use model::{STATUS_OPEN, Ticket};
pub use storage::TicketStore;
