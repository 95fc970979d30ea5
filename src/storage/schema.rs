//! Database schema definitions.
//!
//! There is no versioning or migration step: the table is created if missing
//! and otherwise left alone.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the ticket database.
pub const SCHEMA_SQL: &str = r"
    -- Tickets table
    -- Columns other than ticket_id are TEXT with no constraints; status is a
    -- free-form label and callers may store any string.
    CREATE TABLE IF NOT EXISTS tickets (
        ticket_id TEXT PRIMARY KEY,
        user_id TEXT,
        description TEXT,
        timestamp TEXT,
        status TEXT,
        pdf_file_name TEXT
    );

    -- Status filter
    CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
";

/// Apply the schema to the database.
///
/// Safe to call on an already initialized database; existing rows are untouched.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // WAL is persistent for the file: readers no longer block on a writer.
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}

/// Whether the `tickets` table exists on this connection.
#[must_use]
pub fn tickets_table_exists(conn: &Connection) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='tickets'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false)
}
