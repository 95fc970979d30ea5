//! Data types for support tickets.

use crate::util::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status assigned to every newly created ticket.
pub const STATUS_OPEN: &str = "Open";

/// Column names of the `tickets` table, in storage order.
pub const TICKET_COLUMNS: [&str; 6] = [
    "ticket_id",
    "user_id",
    "description",
    "timestamp",
    "status",
    "pdf_file_name",
];

/// A single support request.
///
/// Every field except `status` is fixed at creation. `status` is a free-form
/// workflow label; this layer does not restrict its values.
///
/// `timestamp` holds the stored text as-is. Tickets written by this crate use
/// RFC 3339 UTC with microseconds; see [`Ticket::created_at`] for a parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub user_id: String,
    pub description: String,
    pub timestamp: String,
    pub status: String,
    pub pdf_file_name: String,
}

impl Ticket {
    /// Field-name to value view of the ticket, keyed by [`TICKET_COLUMNS`].
    #[must_use]
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("ticket_id".into(), Value::String(self.ticket_id.clone()));
        record.insert("user_id".into(), Value::String(self.user_id.clone()));
        record.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        record.insert(
            "timestamp".into(),
            Value::String(self.timestamp.clone()),
        );
        record.insert("status".into(), Value::String(self.status.clone()));
        record.insert(
            "pdf_file_name".into(),
            Value::String(self.pdf_file_name.clone()),
        );
        record
    }

    /// Creation time, if the stored text is a recognizable date-time.
    ///
    /// Naive ISO-8601 text is read as UTC.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}
