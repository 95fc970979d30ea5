//! `SQLite` storage implementation.
//!
//! Every operation opens its own connection, runs a single statement (writes
//! inside a committed transaction) and drops the connection before returning,
//! on success and on failure alike. Nothing is cached between calls.

use crate::config::StoreConfig;
use crate::error::{Result, StorageStage, TicketError};
use crate::model::{STATUS_OPEN, Ticket};
use crate::storage::schema::apply_schema;
use crate::util::id::{IdSource, UuidIds};
use crate::util::time::{Clock, SystemClock, format_timestamp};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Dispatch, debug, error, info, warn};

const SELECT_TICKETS: &str = "SELECT ticket_id, user_id, description, timestamp, status, pdf_file_name
     FROM tickets";

/// SQLite-backed ticket store.
///
/// Holds only settings and injected capabilities; there is no open connection
/// between calls, so one store can be shared freely across threads.
#[derive(Debug)]
pub struct TicketStore {
    db_path: PathBuf,
    busy_timeout: Duration,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
    dispatch: Option<Dispatch>,
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl TicketStore {
    /// Store backed by the database file at `db_path`.
    ///
    /// The file is created on first connection if it does not exist.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::from_config(&StoreConfig {
            db_path: db_path.into(),
            ..StoreConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            busy_timeout: config.busy_timeout(),
            ids: Box::new(UuidIds),
            clock: Box::new(SystemClock),
            dispatch: None,
        }
    }

    /// Replace the ticket ID generator.
    #[must_use]
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the clock used for creation timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Route this store's diagnostics to `dispatch` instead of the caller's
    /// current default subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Create the `tickets` table if it does not exist yet.
    ///
    /// Idempotent: an initialized store keeps its schema and rows.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the database cannot be opened or the schema
    /// cannot be applied.
    pub fn initialize(&self) -> Result<()> {
        self.in_scope(|| {
            self.ensure_schema()
                .inspect(|()| {
                    info!(path = %self.db_path.display(), "Database initialized successfully");
                })
                .inspect_err(|err| {
                    error!(
                        op = "initialize",
                        path = %self.db_path.display(),
                        error = %err,
                        "Error initializing database"
                    );
                })
        })
    }

    /// Insert a new ticket with status `Open` and return its generated ID.
    ///
    /// Inputs are stored as given; this layer does not validate them.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the row cannot be inserted or committed.
    pub fn create_ticket(
        &self,
        user_id: &str,
        description: &str,
        pdf_file_name: &str,
    ) -> Result<String> {
        self.in_scope(|| {
            let ticket = Ticket {
                ticket_id: self.ids.next_id(),
                user_id: user_id.to_string(),
                description: description.to_string(),
                timestamp: format_timestamp(&self.clock.now()),
                status: STATUS_OPEN.to_string(),
                pdf_file_name: pdf_file_name.to_string(),
            };

            match self.insert_ticket(&ticket) {
                Ok(()) => {
                    info!(
                        ticket_id = %ticket.ticket_id,
                        user_id,
                        "Saved ticket {} for user {}",
                        ticket.ticket_id,
                        user_id
                    );
                    Ok(ticket.ticket_id)
                }
                Err(err) => {
                    error!(
                        op = "create_ticket",
                        ticket_id = %ticket.ticket_id,
                        user_id,
                        error = %err,
                        "Error saving ticket"
                    );
                    Err(err)
                }
            }
        })
    }

    /// List tickets, optionally only those whose status equals `status` exactly.
    ///
    /// An empty `status` is no filter at all, the same as `None`. Results are
    /// ordered by creation timestamp, then insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the query fails or a row cannot be decoded.
    pub fn list_tickets(&self, status: Option<&str>) -> Result<Vec<Ticket>> {
        self.in_scope(|| {
            self.query_tickets(status)
                .inspect(|tickets| debug!(status, count = tickets.len(), "Listed tickets"))
                .inspect_err(|err| {
                    error!(op = "list_tickets", status, error = %err, "Error retrieving tickets");
                })
        })
    }

    /// Set the status of a ticket.
    ///
    /// Any string is accepted. An unknown `ticket_id` is not an error: nothing
    /// changes and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the update cannot be executed or committed.
    pub fn update_ticket_status(&self, ticket_id: &str, status: &str) -> Result<()> {
        self.in_scope(|| match self.set_status(ticket_id, status) {
            Ok(0) => {
                warn!(ticket_id, status, "No ticket {} to update", ticket_id);
                Ok(())
            }
            Ok(_) => {
                info!(
                    ticket_id,
                    status, "Updated ticket {} to status {}", ticket_id, status
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    op = "update_ticket_status",
                    ticket_id,
                    status,
                    error = %err,
                    "Error updating ticket status"
                );
                Err(err)
            }
        })
    }

    /// Get a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the query fails or the row cannot be decoded.
    pub fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        self.in_scope(|| {
            self.query_ticket(ticket_id)
                .inspect(|found| debug!(ticket_id, found = found.is_some(), "Looked up ticket"))
                .inspect_err(|err| {
                    error!(op = "get_ticket", ticket_id, error = %err, "Error retrieving ticket");
                })
        })
    }

    /// Count tickets, with the same status filter semantics as [`Self::list_tickets`]
    /// (an empty `status` counts every ticket).
    ///
    /// # Errors
    ///
    /// Returns a storage failure if the query fails.
    pub fn count_tickets(&self, status: Option<&str>) -> Result<usize> {
        self.in_scope(|| {
            self.query_count(status).inspect_err(|err| {
                error!(op = "count_tickets", status, error = %err, "Error counting tickets");
            })
        })
    }

    fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    fn connect(&self, op: &'static str) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).map_err(at(op, StorageStage::Open))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(at(op, StorageStage::Open))?;
        Ok(conn)
    }

    fn ensure_schema(&self) -> Result<()> {
        const OP: &str = "initialize";
        let conn = self.connect(OP)?;
        apply_schema(&conn).map_err(at(OP, StorageStage::Execute))
    }

    fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        const OP: &str = "create_ticket";
        let mut conn = self.connect(OP)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(at(OP, StorageStage::Execute))?;
        tx.execute(
            "INSERT INTO tickets (ticket_id, user_id, description, timestamp, status, pdf_file_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                ticket.ticket_id,
                ticket.user_id,
                ticket.description,
                ticket.timestamp,
                ticket.status,
                ticket.pdf_file_name,
            ],
        )
        .map_err(at(OP, StorageStage::Execute))?;
        tx.commit().map_err(at(OP, StorageStage::Commit))
    }

    fn set_status(&self, ticket_id: &str, status: &str) -> Result<usize> {
        const OP: &str = "update_ticket_status";
        let mut conn = self.connect(OP)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(at(OP, StorageStage::Execute))?;
        let changed = tx
            .execute(
                "UPDATE tickets SET status = ?1 WHERE ticket_id = ?2",
                rusqlite::params![status, ticket_id],
            )
            .map_err(at(OP, StorageStage::Execute))?;
        tx.commit().map_err(at(OP, StorageStage::Commit))?;
        Ok(changed)
    }

    fn query_tickets(&self, status: Option<&str>) -> Result<Vec<Ticket>> {
        const OP: &str = "list_tickets";
        let status = status.filter(|s| !s.is_empty());
        let conn = self.connect(OP)?;

        let mut sql = String::from(SELECT_TICKETS);
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(" ORDER BY timestamp ASC, rowid ASC");

        let mut stmt = conn.prepare(&sql).map_err(at(OP, StorageStage::Execute))?;
        let rows = match status {
            Some(status) => stmt.query_map([status], ticket_from_row),
            None => stmt.query_map([], ticket_from_row),
        }
        .map_err(at(OP, StorageStage::Execute))?;
        let tickets = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(at(OP, StorageStage::Execute))?;
        Ok(tickets)
    }

    fn query_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        const OP: &str = "get_ticket";
        let conn = self.connect(OP)?;
        let sql = format!("{SELECT_TICKETS} WHERE ticket_id = ?1");
        let ticket = conn
            .query_row(&sql, [ticket_id], ticket_from_row)
            .optional()
            .map_err(at(OP, StorageStage::Execute))?;
        Ok(ticket)
    }

    fn query_count(&self, status: Option<&str>) -> Result<usize> {
        const OP: &str = "count_tickets";
        let status = status.filter(|s| !s.is_empty());
        let conn = self.connect(OP)?;
        let count: i64 = match status {
            Some(status) => conn.query_row(
                "SELECT count(*) FROM tickets WHERE status = ?1",
                [status],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT count(*) FROM tickets", [], |row| row.get(0)),
        }
        .map_err(at(OP, StorageStage::Execute))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn at(op: &'static str, stage: StorageStage) -> impl Fn(rusqlite::Error) -> TicketError {
    move |source| TicketError::storage(op, stage, source)
}

// NULL text columns read as empty strings; the text itself is never reinterpreted.
fn ticket_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        ticket_id: row.get(0)?,
        user_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        timestamp: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        pdf_file_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}
