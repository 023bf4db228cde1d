#![forbid(unsafe_code)]
use chrono::NaiveDate;
use creneau::{BookingInterval, BookingStore, JsonStore, Ledger, ServiceKind, StoreError, TimeSlot};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

#[test]
fn save_and_load_ledger_roundtrip() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("bookings.json")).unwrap();

    let mut ledger = Ledger::default();
    ledger.days.insert(
        "2026-06-13".into(),
        vec![
            BookingInterval::new(slot("14:00", "18:00"), BTreeSet::from([ServiceKind::Dj])),
            BookingInterval::new(
                slot("19:00", "22:00"),
                BTreeSet::from([ServiceKind::Karaoke, ServiceKind::Photography]),
            ),
        ],
    );
    store.save(&ledger).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.days.len(), 1);
    let day = &loaded.days["2026-06-13"];
    assert_eq!(day.len(), 2);
    assert_eq!(day[0].slot, slot("14:00", "18:00"));
    assert_eq!(day[1].services.len(), 2);
}

#[test]
fn missing_file_reads_as_empty_ledger() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("absent.json")).unwrap();
    assert!(store.load().unwrap().days.is_empty());

    let date = NaiveDate::from_ymd_opt(2026, 6, 13).unwrap();
    assert!(store.intervals_for_date(date).unwrap().is_empty());
}

#[test]
fn intervals_for_date_reads_only_that_day() {
    let dir = tempdir().unwrap();
    let store = JsonStore::open(dir.path().join("bookings.json")).unwrap();

    let mut ledger = Ledger::default();
    ledger.days.insert(
        "2026-06-13".into(),
        vec![BookingInterval::new(slot("14:00", "18:00"), BTreeSet::new())],
    );
    ledger.days.insert(
        "2026-06-14".into(),
        vec![BookingInterval::new(slot("09:00", "11:00"), BTreeSet::new())],
    );
    store.save(&ledger).unwrap();

    let day = store
        .intervals_for_date(NaiveDate::from_ymd_opt(2026, 6, 13).unwrap())
        .unwrap();
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].slot, slot("14:00", "18:00"));
}

#[test]
fn corrupt_file_surfaces_as_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bookings.json");
    std::fs::write(&path, b"pas du json").unwrap();

    let store = JsonStore::open(&path).unwrap();
    assert!(store.load().is_err());

    let date = NaiveDate::from_ymd_opt(2026, 6, 13).unwrap();
    let err = store.intervals_for_date(date).unwrap_err();
    assert!(matches!(err, StoreError::Other(_)));
}
