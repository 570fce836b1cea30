//! Transcript flow: one ask turn recorded the way the transport layer does it
//! — user message first, assistant message with sources second.

mod helpers;

use chrono::{TimeZone, Utc};
use helpers::{insert, test_db, MockGenerator};
use hindsight::ask::answer_query;
use hindsight::items::store::SqliteItemStore;
use hindsight::items::types::ItemType;
use hindsight::session::{get_or_create_session, record_message, session_messages, Role};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn one_turn_round_trip_through_the_ledger() {
    let conn = test_db();
    insert(
        &conn,
        "u1",
        ItemType::EmailReceived,
        "2026-08-26T09:00:00Z",
        "Invoice due",
        "Please pay by Friday",
    );
    let db = Arc::new(Mutex::new(conn));
    let store = SqliteItemStore::new(Arc::clone(&db));
    let generator = MockGenerator::answering("One invoice email [1].");
    let now = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();

    let query = "what emails do I have";
    let session = {
        let conn = db.lock().unwrap();
        let session = get_or_create_session(&conn, "u1", None).unwrap();
        record_message(&conn, &session, Role::User, query, &[]).unwrap();
        session
    };

    let outcome = answer_query(&store, &generator, now, "u1", "Ada", query)
        .await
        .unwrap();

    let conn = db.lock().unwrap();
    record_message(&conn, &session, Role::Assistant, &outcome.answer, &outcome.sources).unwrap();

    let (_, messages) = session_messages(&conn, "u1", &session).unwrap().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[0].text, query);
    assert_eq!(messages[1].role, "assistant");
    assert_eq!(messages[1].sources.len(), 1);
    assert_eq!(messages[1].sources[0].reason, "Matches email intent");
}
