//! Storage tests for the ticket store: schema idempotence, create/list
//! round-trips, status filtering and status updates. Real `SQLite`, no mocks.

mod common;

use common::{deterministic_db, test_db, test_store, ticket_ids};
use rusqlite::Connection;
use std::collections::HashSet;
use support_tickets::{STATUS_OPEN, StorageStage, TicketStore};

fn column_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('tickets') ORDER BY cid")
        .expect("prepare table info");
    stmt.query_map([], |row| row.get(0))
        .expect("query table info")
        .collect::<std::result::Result<Vec<String>, _>>()
        .expect("collect table info")
}

// ============================================================================
// INITIALIZE
// ============================================================================

#[test]
fn initialize_creates_tickets_table() {
    let (store, _dir) = test_db();
    let conn = Connection::open(store.db_path()).expect("open db");
    assert_eq!(
        column_names(&conn),
        [
            "ticket_id",
            "user_id",
            "description",
            "timestamp",
            "status",
            "pdf_file_name"
        ]
    );
}

#[test]
fn initialize_twice_keeps_schema_and_rows() {
    let (store, _dir) = test_db();
    let id = store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();
    let before = store.list_tickets(None).unwrap();

    store.initialize().unwrap();
    store.initialize().unwrap();

    let after = store.list_tickets(None).unwrap();
    assert_eq!(before, after);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].ticket_id, id);

    let conn = Connection::open(store.db_path()).expect("open db");
    assert_eq!(column_names(&conn).len(), 6);
}

#[test]
fn initialize_in_missing_directory_fails_at_open() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = TicketStore::new(dir.path().join("no").join("such").join("db.sqlite"));
    let err = store.initialize().unwrap_err();
    assert!(err.is_storage_failure());
    assert_eq!(err.storage_stage(), Some(StorageStage::Open));
}

#[test]
fn operations_before_initialize_fail() {
    let (store, _dir) = test_store();
    assert!(store.list_tickets(None).is_err());
    assert!(store.create_ticket("u", "d", "f").is_err());
    assert!(store.update_ticket_status("x", "Closed").is_err());
}

// ============================================================================
// CREATE / LIST
// ============================================================================

#[test]
fn create_then_list_round_trip() {
    let (store, _dir) = test_db();
    let id = store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();

    let tickets = store.list_tickets(None).unwrap();
    let matching: Vec<_> = tickets.iter().filter(|t| t.ticket_id == id).collect();
    assert_eq!(matching.len(), 1);

    let ticket = matching[0];
    assert_eq!(ticket.user_id, "u1");
    assert_eq!(ticket.description, "printer broken");
    assert_eq!(ticket.pdf_file_name, "t1.pdf");
    assert_eq!(ticket.status, STATUS_OPEN);
}

#[test]
fn create_stores_inputs_verbatim() {
    let (store, _dir) = test_db();
    let description = "quote ' and \"double\"; DROP TABLE tickets; -- ünïcødé\nsecond line";
    let id = store.create_ticket("", description, "").unwrap();

    let ticket = store.get_ticket(&id).unwrap().expect("ticket exists");
    assert_eq!(ticket.user_id, "");
    assert_eq!(ticket.description, description);
    assert_eq!(ticket.pdf_file_name, "");
    assert_eq!(store.count_tickets(None).unwrap(), 1);
}

#[test]
fn create_records_current_time() {
    let (store, _dir) = test_db();
    let before = chrono::Utc::now();
    let id = store.create_ticket("u1", "d", "f.pdf").unwrap();
    let after = chrono::Utc::now();

    let created = store.get_ticket(&id).unwrap().unwrap().created_at().unwrap();
    // Stored with microsecond precision.
    assert!(created.timestamp_micros() >= before.timestamp_micros());
    assert!(created.timestamp_micros() <= after.timestamp_micros());
}

#[test]
fn generated_ids_are_distinct() {
    let (store, _dir) = test_db();
    let ids: HashSet<String> = (0..50)
        .map(|i| store.create_ticket(&format!("u{i}"), "d", "f.pdf").unwrap())
        .collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(ticket_ids(&store.list_tickets(None).unwrap()), ids);
}

#[test]
fn list_orders_by_creation() {
    let (store, _dir) = deterministic_db();
    // Same frozen timestamp for all rows: insertion order breaks the tie.
    for i in 0..5 {
        store.create_ticket("u", &format!("ticket {i}"), "f.pdf").unwrap();
    }
    let ids: Vec<String> = store
        .list_tickets(None)
        .unwrap()
        .into_iter()
        .map(|t| t.ticket_id)
        .collect();
    assert_eq!(ids, ["tk-1", "tk-2", "tk-3", "tk-4", "tk-5"]);
}

#[test]
fn list_on_empty_store_is_empty() {
    let (store, _dir) = test_db();
    assert!(store.list_tickets(None).unwrap().is_empty());
    assert!(store.list_tickets(Some(STATUS_OPEN)).unwrap().is_empty());
}

// ============================================================================
// STATUS FILTER
// ============================================================================

#[test]
fn status_filter_is_exact_and_case_sensitive() {
    let (store, _dir) = test_db();
    let open = store.create_ticket("u1", "a", "a.pdf").unwrap();
    let closed = store.create_ticket("u2", "b", "b.pdf").unwrap();
    let lower = store.create_ticket("u3", "c", "c.pdf").unwrap();
    store.update_ticket_status(&closed, "Closed").unwrap();
    store.update_ticket_status(&lower, "closed").unwrap();

    let ids = |status| ticket_ids(&store.list_tickets(Some(status)).unwrap());
    assert_eq!(ids("Open"), HashSet::from([open.clone()]));
    assert_eq!(ids("Closed"), HashSet::from([closed.clone()]));
    assert_eq!(ids("closed"), HashSet::from([lower.clone()]));
    assert!(ids("Clos").is_empty());
    assert!(ids("Closed ").is_empty());
    assert!(ids("%").is_empty());
}

#[test]
fn empty_status_filter_lists_everything() {
    let (store, _dir) = test_db();
    let first = store.create_ticket("u1", "a", "a.pdf").unwrap();
    let second = store.create_ticket("u2", "b", "b.pdf").unwrap();

    let tickets = store.list_tickets(Some("")).unwrap();
    assert_eq!(ticket_ids(&tickets), HashSet::from([first.clone(), second]));

    store.update_ticket_status(&first, "Closed").unwrap();
    assert_eq!(store.list_tickets(Some("")).unwrap().len(), 2);
    assert_eq!(store.count_tickets(Some("")).unwrap(), 2);
}

#[test]
fn odd_timestamp_cells_do_not_hide_tickets() {
    let (store, _dir) = test_db();
    let id = store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();

    let conn = Connection::open(store.db_path()).expect("open db");
    conn.execute(
        "INSERT INTO tickets (ticket_id, status) VALUES ('bare', 'Open')",
        [],
    )
    .expect("insert bare row");
    conn.execute(
        "INSERT INTO tickets VALUES ('odd', 'u2', 'd', 'last tuesday', 'Open', 'f.pdf')",
        [],
    )
    .expect("insert odd row");
    drop(conn);

    let tickets = store.list_tickets(None).unwrap();
    assert_eq!(
        ticket_ids(&tickets),
        HashSet::from([id, "bare".to_string(), "odd".to_string()])
    );
    let odd = store.get_ticket("odd").unwrap().unwrap();
    assert_eq!(odd.timestamp, "last tuesday");
    assert_eq!(odd.to_record()["timestamp"], "last tuesday");
}

// ============================================================================
// UPDATE STATUS
// ============================================================================

#[test]
fn update_status_changes_only_status() {
    let (store, _dir) = test_db();
    let id = store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();
    let before = store.get_ticket(&id).unwrap().unwrap();

    store.update_ticket_status(&id, "Closed").unwrap();

    let after = store.get_ticket(&id).unwrap().unwrap();
    assert_eq!(after.status, "Closed");
    assert_eq!(after.ticket_id, before.ticket_id);
    assert_eq!(after.user_id, before.user_id);
    assert_eq!(after.description, before.description);
    assert_eq!(after.timestamp, before.timestamp);
    assert_eq!(after.pdf_file_name, before.pdf_file_name);
}

#[test]
fn update_status_accepts_any_transition() {
    let (store, _dir) = test_db();
    let id = store.create_ticket("u1", "d", "f.pdf").unwrap();
    for status in ["Closed", "Open", "Waiting on customer", "✓", "Open"] {
        store.update_ticket_status(&id, status).unwrap();
        assert_eq!(store.get_ticket(&id).unwrap().unwrap().status, status);
    }
}

#[test]
fn update_unknown_ticket_is_silent_noop() {
    let (store, _dir) = test_db();
    store.create_ticket("u1", "a", "a.pdf").unwrap();
    store.create_ticket("u2", "b", "b.pdf").unwrap();
    let before = store.list_tickets(None).unwrap();

    store
        .update_ticket_status("does-not-exist", "Closed")
        .expect("unknown id is not an error");

    assert_eq!(store.list_tickets(None).unwrap(), before);
}

// ============================================================================
// SCENARIO
// ============================================================================

#[test]
fn printer_and_vpn_scenario() {
    let (store, _dir) = test_store();
    store.initialize().unwrap();

    let id1 = store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();
    let id2 = store.create_ticket("u2", "vpn down", "t2.pdf").unwrap();

    let all = store.list_tickets(None).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|t| t.status == "Open"));

    store.update_ticket_status(&id1, "Resolved").unwrap();

    let resolved = store.list_tickets(Some("Resolved")).unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].ticket_id, id1);

    let open = store.list_tickets(Some("Open")).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].ticket_id, id2);
}

#[test]
fn separate_stores_share_the_file() {
    let (writer, dir) = test_db();
    let reader = TicketStore::new(dir.path().join("support_tickets.db"));

    let id = writer.create_ticket("u1", "d", "f.pdf").unwrap();
    assert_eq!(reader.get_ticket(&id).unwrap().unwrap().user_id, "u1");

    reader.update_ticket_status(&id, "Closed").unwrap();
    assert_eq!(writer.get_ticket(&id).unwrap().unwrap().status, "Closed");
}

#[test]
fn records_expose_field_mapping() {
    let (store, _dir) = deterministic_db();
    store.create_ticket("u1", "printer broken", "t1.pdf").unwrap();

    let record = store.list_tickets(None).unwrap()[0].to_record();
    assert_eq!(record["ticket_id"], "tk-1");
    assert_eq!(record["user_id"], "u1");
    assert_eq!(record["description"], "printer broken");
    assert_eq!(record["timestamp"], "2024-06-01T12:00:00.000000Z");
    assert_eq!(record["status"], "Open");
    assert_eq!(record["pdf_file_name"], "t1.pdf");
}
