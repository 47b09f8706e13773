//! File-backed store behaviour across handles and reopen.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use parish_roster_core::id::{EventId, PersonId};
use parish_roster_core::{Assignment, AssignmentFilter, AssignmentPatch, Conflict, SlotState};
use parish_roster_store::{FileStore, InsertOutcome, StoreError, UpdateOutcome};
use std::fs;
use std::thread;
use tempfile::TempDir;

fn setup() -> (TempDir, FileStore) {
    let dir = TempDir::with_prefix("parish-roster-store-").expect("create temp dir");
    let store = FileStore::open(dir.path().join("data").join("roster.json"));
    (dir, store)
}

#[test]
fn missing_file_reads_as_empty() {
    let (_dir, store) = setup();
    let rows = store
        .find(&AssignmentFilter::event(EventId::new()))
        .expect("find on missing file");
    assert!(rows.is_empty());
}

#[test]
fn rows_survive_reopen() {
    let (_dir, store) = setup();
    let event = EventId::new();
    let volunteer = PersonId::new();
    let replacement = PersonId::new();

    let outcome = store
        .insert_if_vacant(&[Assignment::new(event, volunteer, PersonId::new())])
        .expect("insert");
    assert_eq!(outcome, InsertOutcome::Inserted(1));
    let touched = store
        .update(
            &AssignmentFilter::event(event).volunteer(volunteer),
            &AssignmentPatch::replaced_by(replacement),
        )
        .expect("update");
    assert_eq!(touched, 1);

    let reopened = FileStore::open(store.path());
    let rows = reopened
        .find(&AssignmentFilter::event(event))
        .expect("find after reopen");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].slot, SlotState::Replaced { by: replacement });

    let raw = fs::read_to_string(store.path()).expect("read raw file");
    assert!(raw.contains("\"replacedById\""));
    assert!(raw.contains("\"volunteerId\""));
}

#[test]
fn conflicting_insert_leaves_file_untouched() {
    let (_dir, store) = setup();
    let event = EventId::new();
    let (a, b) = (PersonId::new(), PersonId::new());
    store
        .insert_if_vacant(&[Assignment::new(event, b, a)])
        .expect("seed");
    let before = fs::read_to_string(store.path()).expect("read before");

    let outcome = store
        .insert_if_vacant(&[Assignment::new(event, a, a), Assignment::new(event, b, a)])
        .expect("insert");
    assert_eq!(
        outcome,
        InsertOutcome::Conflict {
            event,
            person: b,
            conflict: Conflict::AlreadyActive,
        }
    );
    let after = fs::read_to_string(store.path()).expect("read after");
    assert_eq!(before, after);
}

#[test]
fn delete_with_no_match_is_a_no_op() {
    let (_dir, store) = setup();
    let event = EventId::new();
    store
        .insert_if_vacant(&[Assignment::new(event, PersonId::new(), PersonId::new())])
        .expect("seed");
    let removed = store
        .delete(&AssignmentFilter::event(event).volunteer(PersonId::new()))
        .expect("delete");
    assert_eq!(removed, 0);
    assert_eq!(store.find(&AssignmentFilter::event(event)).expect("find").len(), 1);
}

#[test]
fn separate_handles_do_not_double_book() {
    let (_dir, store) = setup();
    let event = EventId::new();
    let person = PersonId::new();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let handle = FileStore::open(store.path());
            thread::spawn(move || {
                handle
                    .insert_if_vacant(&[Assignment::new(event, person, PersonId::new())])
                    .expect("insert")
            })
        })
        .collect();
    let inserted = handles
        .into_iter()
        .map(|h| h.join().expect("join"))
        .filter(|o| matches!(o, InsertOutcome::Inserted(_)))
        .count();

    assert_eq!(inserted, 1);
    let active = store
        .find(&AssignmentFilter::event(event).volunteer(person).replaced(false))
        .expect("find");
    assert_eq!(active.len(), 1);
}

#[test]
fn concurrent_handovers_to_one_person_land_once() {
    let (_dir, store) = setup();
    let event = EventId::new();
    let incoming = PersonId::new();
    let originals: Vec<PersonId> = (0..6).map(|_| PersonId::new()).collect();
    let batch: Vec<Assignment> = originals
        .iter()
        .map(|&p| Assignment::new(event, p, p))
        .collect();
    store.insert_if_vacant(&batch).expect("seed");

    let handles: Vec<_> = originals
        .iter()
        .map(|&original| {
            let handle = FileStore::open(store.path());
            thread::spawn(move || {
                handle
                    .update_if_vacant(
                        &AssignmentFilter::event(event).volunteer(original).replaced(false),
                        &AssignmentPatch::replaced_by(incoming),
                        incoming,
                    )
                    .expect("update")
            })
        })
        .collect();
    let landed = handles
        .into_iter()
        .map(|h| h.join().expect("join"))
        .filter(|o| matches!(o, UpdateOutcome::Updated(1)))
        .count();

    assert_eq!(landed, 1);
    let serving = store
        .find(&AssignmentFilter::event(event).replaced_by(incoming))
        .expect("find");
    assert_eq!(serving.len(), 1);
}

#[test]
fn malformed_file_reports_parse_error() {
    let (_dir, store) = setup();
    fs::create_dir_all(store.path().parent().unwrap()).expect("mkdir");
    fs::write(store.path(), "{ not json").expect("write garbage");
    let err = store
        .find(&AssignmentFilter::event(EventId::new()))
        .expect_err("must fail to parse");
    assert!(matches!(err, StoreError::Parse { .. }));
}
