#![forbid(unsafe_code)]
use chrono::NaiveDate;
use creneau::{BookingInterval, MemoryStore, Notifier, Subscription, TimeSlot};
use std::collections::BTreeSet;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 13).unwrap()
}

const POLL: Duration = Duration::from_millis(10);
// Laisse passer plusieurs ticks de poll.
const SETTLE: Duration = Duration::from_millis(80);

#[test]
fn callback_fires_with_added_interval() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(store.clone(), POLL);
    let (tx, rx) = mpsc::channel();

    let sub = notifier.subscribe(date(), move |summary| {
        let _ = tx.send(summary);
    });
    thread::sleep(SETTLE); // instantané de base posé

    let interval = BookingInterval::new(slot("14:00", "18:00"), BTreeSet::new());
    store.insert(date(), interval.clone());

    let summary = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(summary.date, date());
    assert_eq!(summary.added, vec![interval]);
    assert!(summary.removed.is_empty());

    sub.unsubscribe();
}

#[test]
fn removal_is_reported_as_removed() {
    let store = Arc::new(MemoryStore::new());
    let interval = BookingInterval::new(slot("09:00", "11:00"), BTreeSet::new());
    store.insert(date(), interval.clone());

    let notifier = Notifier::new(store.clone(), POLL);
    let (tx, rx) = mpsc::channel();
    let sub = notifier.subscribe(date(), move |summary| {
        let _ = tx.send(summary);
    });
    thread::sleep(SETTLE);

    assert!(store.remove(date(), &interval.booking_id));
    let summary = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(summary.added.is_empty());
    assert_eq!(summary.removed, vec![interval]);

    sub.unsubscribe();
}

#[test]
fn unsubscribe_stops_callbacks_and_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(store.clone(), POLL);
    let (tx, rx) = mpsc::channel();

    let sub = notifier.subscribe(date(), move |summary| {
        let _ = tx.send(summary);
    });
    thread::sleep(SETTLE);

    sub.unsubscribe();
    sub.unsubscribe(); // double désabonnement : no-op
    assert!(!sub.is_active());
    thread::sleep(SETTLE);

    store.insert(
        date(),
        BookingInterval::new(slot("14:00", "18:00"), BTreeSet::new()),
    );
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn unsubscribe_from_inside_the_callback() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(store.clone(), POLL);
    let (tx, rx) = mpsc::channel();

    let shared: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let inner = Arc::clone(&shared);
    let sub = notifier.subscribe(date(), move |summary| {
        let _ = tx.send(summary);
        if let Some(sub) = inner.lock().unwrap().as_ref() {
            sub.unsubscribe(); // réentrant : doit être sûr
        }
    });
    *shared.lock().unwrap() = Some(sub.clone());
    thread::sleep(SETTLE);

    store.insert(
        date(),
        BookingInterval::new(slot("14:00", "18:00"), BTreeSet::new()),
    );
    rx.recv_timeout(Duration::from_secs(2)).unwrap();
    thread::sleep(SETTLE);
    assert!(!sub.is_active());

    // plus aucune notification après le désabonnement interne
    store.insert(
        date(),
        BookingInterval::new(slot("19:00", "21:00"), BTreeSet::new()),
    );
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn independent_subscriptions_for_the_same_date() {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(store.clone(), POLL);
    let (tx1, rx1) = mpsc::channel();
    let (tx2, rx2) = mpsc::channel();

    let sub1 = notifier.subscribe(date(), move |s| {
        let _ = tx1.send(s);
    });
    let sub2 = notifier.subscribe(date(), move |s| {
        let _ = tx2.send(s);
    });
    thread::sleep(SETTLE);

    sub1.unsubscribe();
    thread::sleep(SETTLE);

    store.insert(
        date(),
        BookingInterval::new(slot("14:00", "18:00"), BTreeSet::new()),
    );

    // seul l'abonnement encore actif reçoit le changement
    assert!(rx2.recv_timeout(Duration::from_secs(2)).is_ok());
    assert!(rx1.recv_timeout(Duration::from_millis(200)).is_err());

    sub2.unsubscribe();
}
