//! A plain reference counter used to coordinate shared ownership of one heap object.
//!
//! The counter is deliberately not atomic: it is meant for single-threaded
//! (or externally synchronized) use on small targets, where an atomic RMW
//! on every clone is not worth paying for.
//! Because it is built on [`Cell`], a `RefCount` is `!Sync`,
//! so the compiler refuses to share one across threads.
//!
//! A `RefCount` never frees anything itself; the owning handle type
//! inspects the value returned by [`RefCount::decrement()`] and decides.

#![no_std]

#[cfg(test)]
mod test;

use core::{cell::Cell, fmt};

/// Counts the live owning handles that share a single heap allocation.
pub struct RefCount {
    refs: Cell<isize>,
}

impl RefCount {
    /// Creates a counter with zero references.
    ///
    /// The first owning handle is expected to call [`RefCount::increment()`]
    /// right after allocating the counter.
    pub const fn new() -> RefCount {
        RefCount { refs: Cell::new(0) }
    }

    /// Records one more owning handle.
    #[inline]
    pub fn increment(&self) {
        self.refs.set(self.refs.get() + 1);
    }

    /// Records that one owning handle went away, and returns the resulting count.
    ///
    /// A returned value of `0` means the caller was the last owner.
    #[inline]
    pub fn decrement(&self) -> isize {
        let refs = self.refs.get() - 1;
        debug_assert!(refs >= 0, "RefCount decremented below zero");
        self.refs.set(refs);
        refs
    }

    /// Returns the current number of owning handles.
    #[inline]
    pub fn count(&self) -> isize {
        self.refs.get()
    }
}

impl Default for RefCount {
    fn default() -> Self {
        RefCount::new()
    }
}

impl fmt::Debug for RefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefCount").field("refs", &self.refs.get()).finish()
    }
}
