//! Tests for the `RefCount` counting primitive.

extern crate std;

use self::std::format;

use super::*;

#[test]
fn starts_at_zero() {
    let rc = RefCount::new();
    assert_eq!(rc.count(), 0);
    assert_eq!(RefCount::default().count(), 0);
}

#[test]
fn increment_then_decrement() {
    let rc = RefCount::new();
    rc.increment();
    assert_eq!(rc.count(), 1);
    rc.increment();
    rc.increment();
    assert_eq!(rc.count(), 3);

    assert_eq!(rc.decrement(), 2);
    assert_eq!(rc.decrement(), 1);
    assert_eq!(rc.count(), 1);
}

#[test]
fn last_decrement_returns_zero() {
    let rc = RefCount::new();
    rc.increment();
    assert_eq!(rc.decrement(), 0);
    assert_eq!(rc.count(), 0);
}

#[test]
fn fan_out_fan_in() {
    let rc = RefCount::new();
    rc.increment(); // first owner
    rc.increment(); // copy
    rc.increment(); // scoped copy
    assert_eq!(rc.decrement(), 2); // scoped copy goes away
    assert_eq!(rc.decrement(), 1);
    assert_eq!(rc.decrement(), 0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "below zero")]
fn underflow_is_caught_in_debug_builds() {
    let rc = RefCount::new();
    rc.decrement();
}

#[test]
fn debug_shows_count() {
    let rc = RefCount::new();
    rc.increment();
    rc.increment();
    assert_eq!(format!("{:?}", rc), "RefCount { refs: 2 }");
}
