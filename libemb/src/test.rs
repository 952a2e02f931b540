//! End-to-end walkthrough of both handle types through the `emb` namespace.

extern crate std;

use self::std::{cell::Cell, rc::Rc};
use core::mem::size_of;

use super::*;

struct Tracked {
    drops: Rc<Cell<usize>>,
    value: i32,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn tracked(value: i32, drops: &Rc<Cell<usize>>) -> Tracked {
    Tracked { drops: drops.clone(), value }
}

#[test]
fn exclusive_walkthrough() {
    let drops = Rc::new(Cell::new(0));

    let mut a = ExclusiveHandle::new(tracked(20, &drops));
    let mut b: ExclusiveHandle<Tracked> = ExclusiveHandle::empty();

    b.transfer_from(&mut a);
    assert!(a.is_empty());
    assert_eq!(b.value, 20);

    assert_eq!(size_of::<ExclusiveHandle<i32>>(), size_of::<*mut i32>());

    drop(a);
    drop(b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn shared_walkthrough() {
    let a_drops = Rc::new(Cell::new(0));
    let e_drops = Rc::new(Cell::new(0));

    let shared_a = SharedHandle::new(tracked(20, &a_drops));
    let shared_b = shared_a.clone();
    {
        let _shared_c = shared_b.clone();
        let _shared_d = shared_a.clone();
        assert_eq!(shared_a.strong_count(), 4);
    }
    assert_eq!(shared_a.strong_count(), 2);

    let mut shared_e = SharedHandle::new(tracked(30, &e_drops));

    // Frees the second object, since `shared_e` was its only owner.
    shared_e.assign(&shared_a);
    assert_eq!(e_drops.get(), 1);
    assert_eq!(shared_a.strong_count(), 3);

    shared_a.erase();
    assert_eq!(shared_e.strong_count(), 2);
    assert_eq!(shared_e.value, 20);

    assert_eq!(size_of::<SharedHandle<i32>>(), 2 * size_of::<*mut i32>());

    drop(shared_b);
    assert_eq!(a_drops.get(), 0);
    drop(shared_e);
    assert_eq!(a_drops.get(), 1);
    assert_eq!(e_drops.get(), 1);
}

#[test]
fn reexported_ref_count() {
    let rc = RefCount::new();
    rc.increment();
    assert_eq!(rc.decrement(), 0);
    assert!(ReassignPolicy::Corrected.releases_previous(0));
}
