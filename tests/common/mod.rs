#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Once;
use support_tickets::util::{FixedClock, SequentialIds};
use support_tickets::{Ticket, TicketStore};
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        support_tickets::logging::init_test_logging();
    });
}

/// An uninitialized store on a fresh file in a temp dir.
pub fn test_store() -> (TicketStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = TicketStore::new(dir.path().join("support_tickets.db"));
    (store, dir)
}

/// An initialized store.
pub fn test_db() -> (TicketStore, TempDir) {
    let (store, dir) = test_store();
    store.initialize().expect("Failed to initialize test database");
    (store, dir)
}

/// An initialized store with predictable IDs (`tk-1`, `tk-2`, ...) and a frozen clock.
pub fn deterministic_db() -> (TicketStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = TicketStore::new(dir.path().join("support_tickets.db"))
        .with_id_source(SequentialIds::new("tk"))
        .with_clock(FixedClock(
            chrono::DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        ));
    store.initialize().expect("Failed to initialize test database");
    (store, dir)
}

pub fn ticket_ids(tickets: &[Ticket]) -> HashSet<String> {
    tickets.iter().map(|t| t.ticket_id.clone()).collect()
}
