//! Tests for the replay-of-one event subject

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tether_reactive::{Disposer, ReplaySubject, Subscription};

#[test]
fn test_no_emission_delivers_nothing() {
    let subject: ReplaySubject<u32> = ReplaySubject::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&received);
    let _subscription = subject.subscribe(move |value| log.lock().unwrap().push(value));

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(subject.latest(), None);
}

#[test]
fn test_late_subscriber_replays_latest() {
    let subject = ReplaySubject::new();
    subject.emit(5);

    let received = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&received);
    let _subscription = subject.subscribe(move |value| log.lock().unwrap().push(value));

    // Replay happens before subscribe returns.
    assert_eq!(*received.lock().unwrap(), vec![5]);
}

#[test]
fn test_last_value_wins() {
    let subject = ReplaySubject::new();
    subject.emit(5);
    subject.emit(7);

    let received = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&received);
    let _subscription = subject.subscribe(move |value| log.lock().unwrap().push(value));

    assert_eq!(*received.lock().unwrap(), vec![7]);
    assert_eq!(subject.latest(), Some(7));
}

#[test]
fn test_delivery_in_subscription_order() {
    let subject = ReplaySubject::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&order);
    let _first = subject.subscribe(move |value: u32| log.lock().unwrap().push(("first", value)));
    let log = Arc::clone(&order);
    let _second = subject.subscribe(move |value: u32| log.lock().unwrap().push(("second", value)));

    subject.emit(1);
    assert_eq!(*order.lock().unwrap(), vec![("first", 1), ("second", 1)]);
}

#[test]
fn test_unsubscribed_observer_receives_nothing_more() {
    let subject = ReplaySubject::new();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let subscription = subject.subscribe(move |_: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    subject.emit(1);
    subscription.cancel();
    subject.emit(2);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn test_cancel_is_idempotent() {
    let subject = ReplaySubject::new();
    let subscription = subject.subscribe(|_: u32| {});
    assert!(subscription.is_active());

    subscription.cancel();
    subscription.cancel();
    assert!(!subscription.is_active());
    subject.emit(1);
}

#[test]
fn test_unsubscribe_through_subject_is_idempotent() {
    let subject = ReplaySubject::new();
    let subscription = subject.subscribe(|_: u32| {});

    subject.unsubscribe(&subscription);
    subject.unsubscribe(&subscription);
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn test_observer_may_cancel_itself_during_delivery() {
    let subject = ReplaySubject::new();
    let count = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<Subscription<u32>>>> = Arc::new(Mutex::new(None));

    let counter = Arc::clone(&count);
    let own = Arc::clone(&slot);
    let subscription = subject.subscribe(move |_: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Reentrant cancel from inside the delivery callback.
        if let Some(subscription) = own.lock().unwrap().as_ref() {
            subscription.cancel();
        }
    });
    *slot.lock().unwrap() = Some(subscription);

    subject.emit(1);
    subject.emit(2);
    assert_eq!(count.load(Ordering::SeqCst), 1, "observer saw only the first value");
}

#[test]
fn test_observer_may_subscribe_during_delivery() {
    let subject: ReplaySubject<u32> = ReplaySubject::new();
    let nested = Arc::new(Mutex::new(Vec::new()));

    let inner_subject = subject.clone();
    let log = Arc::clone(&nested);
    let _outer = subject.subscribe(move |value| {
        if value == 1 {
            let log = Arc::clone(&log);
            // Reentrant subscribe; replay delivers the current value.
            let _subscription = inner_subject.subscribe(move |v| log.lock().unwrap().push(v));
        }
    });

    subject.emit(1);
    assert_eq!(*nested.lock().unwrap(), vec![1]);
}

#[test]
fn test_clones_share_the_slot() {
    let subject = ReplaySubject::new();
    let clone = subject.clone();
    clone.emit(9);
    assert_eq!(subject.latest(), Some(9));
}

#[test]
fn test_emission_from_another_thread() {
    let subject: ReplaySubject<u32> = ReplaySubject::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&received);
    let _subscription = subject.subscribe(move |value| log.lock().unwrap().push(value));

    let publisher = subject.clone();
    thread::spawn(move || publisher.emit(13)).join().unwrap();

    assert_eq!(*received.lock().unwrap(), vec![13]);
}

#[test]
fn test_subscription_converts_into_disposer_handle() {
    let subject = ReplaySubject::new();
    let disposer = Disposer::new();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let subscription = subject.subscribe(move |_: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    disposer.add("screen", subscription);

    subject.emit(1);
    disposer.dispose_owner("screen");
    subject.emit(2);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn test_dangling_subscription_cancel_is_noop() {
    let subject = ReplaySubject::new();
    let subscription = subject.subscribe(|_: u32| {});
    drop(subject);
    subscription.cancel();
    assert!(!subscription.is_active());
}
