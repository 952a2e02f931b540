//! A reference-counted handle that shares ownership of one heap-allocated object.
//!
//! Every [`SharedHandle`] in an ownership group points at the same object
//! and at the same heap-allocated [`RefCount`].
//! Cloning a handle joins its group and bumps the count;
//! dropping, erasing or reassigning a handle leaves its group.
//! When the last handle leaves, the counter and the object are both released,
//! exactly once.
//!
//! The count is not atomic, so a `SharedHandle` is neither `Send` nor `Sync`.
//!
//! ```
//! use shared_handle::SharedHandle;
//!
//! let a = SharedHandle::new(20);
//! let b = a.clone();
//! assert_eq!(a.strong_count(), 2);
//! assert!(a.ptr_eq(&b));
//! b.erase();
//! assert_eq!(a.strong_count(), 1);
//! ```
//!
//! ## Reassignment
//!
//! [`SharedHandle::assign()`] leaves the current group before joining the new one,
//! releasing the old object only if this handle was its last owner.
//! The legacy assignment had the release check inverted
//! (it released the old object whenever *other* owners remained).
//! That behavior is described by [`ReassignPolicy::Legacy`] and can be reproduced
//! with `assign_legacy()` when the `legacy_reassign` feature is enabled.
//! The public entry point is only tested with that feature on:
//!
//! ```sh
//! cargo test -p shared_handle --features legacy_reassign
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;


use alloc::boxed::Box;
use core::{
    fmt,
    marker::PhantomData,
    mem::ManuallyDrop,
    ops::Deref,
    ptr::{self, NonNull},
};
use log::{trace, warn};
pub use ref_count::RefCount;

/// One owner among a group of handles sharing a heap-allocated `T`.
///
/// An empty handle (owning no object) still has its own counter,
/// so it can be cloned and reassigned like any other handle.
///
/// Dereferencing an empty handle panics; use [`SharedHandle::get()`] to check first.
pub struct SharedHandle<T> {
    ptr: Option<NonNull<T>>,
    /// Shared with every other handle of this group. Always repointed together with `ptr`.
    counter: NonNull<RefCount>,
    _owns: PhantomData<T>,
}

impl<T> SharedHandle<T> {
    /// Starts a new ownership group around `ptr`, allocating its counter.
    fn fresh(ptr: Option<NonNull<T>>) -> SharedHandle<T> {
        let counter = NonNull::from(Box::leak(Box::new(RefCount::new())));
        let handle = SharedHandle { ptr, counter, _owns: PhantomData };
        handle.counter().increment();
        trace!("SharedHandle: new group with counter at {:p}", counter);
        handle
    }

    /// Creates a handle that owns no object.
    ///
    /// This still allocates a counter, just like the other constructors.
    pub fn empty() -> SharedHandle<T> {
        Self::fresh(None)
    }

    /// Moves `value` onto the heap and starts a new ownership group around it.
    pub fn new(value: T) -> SharedHandle<T> {
        Self::from_box(Box::new(value))
    }

    /// Starts a new ownership group around the object inside the given `Box`.
    pub fn from_box(boxed: Box<T>) -> SharedHandle<T> {
        Self::fresh(Some(NonNull::from(Box::leak(boxed))))
    }

    /// Starts a new ownership group around the object at `raw`,
    /// or creates an empty handle if `raw` is null.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must come from [`Box::into_raw()`]
    /// and must not be owned by anything else, including another handle.
    pub unsafe fn from_raw(raw: *mut T) -> SharedHandle<T> {
        Self::fresh(NonNull::new(raw))
    }

    #[inline]
    fn counter(&self) -> &RefCount {
        // SAFETY: the counter lives as long as any handle of its group,
        // and this handle is part of that group.
        unsafe { self.counter.as_ref() }
    }

    /// Returns the number of handles in this handle's ownership group, including itself.
    #[inline]
    pub fn strong_count(&self) -> isize {
        self.counter().count()
    }

    /// Returns `true` if this handle owns no object.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the address of the shared object, or null if this handle is empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.map_or(ptr::null(), |p| p.as_ptr() as *const T)
    }

    /// Returns `true` if both handles belong to the same ownership group.
    pub fn ptr_eq(&self, other: &SharedHandle<T>) -> bool {
        self.counter == other.counter
    }

    /// Returns a reference to the shared object, if any.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: the object lives as long as any handle of its group,
        // and it is only ever mutated through `get_mut()`, which requires sole ownership.
        self.ptr.as_ref().map(|p| unsafe { p.as_ref() })
    }

    /// Returns a mutable reference to the object if this handle is its only owner.
    ///
    /// Returns `None` if the object is shared or if this handle is empty.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.strong_count() != 1 {
            return None;
        }
        // SAFETY: no other handle can reach the object, and `&mut self` excludes other borrows.
        self.ptr.as_mut().map(|p| unsafe { p.as_mut() })
    }

    /// Leaves the current ownership group and joins `other`'s group.
    ///
    /// The object and counter of the current group are released
    /// only if this handle was the last one in it.
    /// Assigning a handle from the same group leaves the count unchanged.
    ///
    /// Returns `self` so that calls can be chained.
    pub fn assign(&mut self, other: &SharedHandle<T>) -> &mut SharedHandle<T> {
        // SAFETY: the corrected policy only releases a group once nobody else is in it.
        unsafe { self.reassign(other, ReassignPolicy::Corrected) };
        self
    }

    /// Leaves the current ownership group and joins `other`'s group,
    /// using the inverted release check of [`ReassignPolicy::Legacy`].
    ///
    /// If this handle was the last one in its group, the old object and counter are leaked.
    /// If other handles remain, the old object and counter are released underneath them.
    ///
    /// # Safety
    ///
    /// `self` must be the only handle in its ownership group.
    /// Otherwise the remaining handles of that group are left pointing at freed memory.
    #[cfg(feature = "legacy_reassign")]
    pub unsafe fn assign_legacy(&mut self, other: &SharedHandle<T>) -> &mut SharedHandle<T> {
        // SAFETY: the caller upholds the contract above.
        unsafe { self.reassign(other, ReassignPolicy::Legacy) };
        self
    }

    /// Adopts `other`'s object and counter, then decrements the previous counter
    /// and releases the previous group if `policy` says so.
    ///
    /// `self` is repointed before anything is released,
    /// so a panicking `T::drop` leaves it a valid member of `other`'s group.
    ///
    /// # Safety
    ///
    /// If `policy` releases a group that still has other handles, those handles dangle.
    unsafe fn reassign(&mut self, other: &SharedHandle<T>, policy: ReassignPolicy) {
        let (prev_ptr, prev_counter) = (self.ptr, self.counter);
        self.ptr = other.ptr;
        self.counter = other.counter;
        self.counter().increment();

        // SAFETY: nothing has been released yet, so the previous counter is still live.
        let remaining = unsafe { prev_counter.as_ref() }.decrement();
        if policy.releases_previous(remaining) {
            if remaining != 0 {
                warn!(
                    "SharedHandle: releasing counter at {:p} while {} other handle(s) still refer to it",
                    prev_counter, remaining,
                );
            }
            // SAFETY: delegated to the caller.
            unsafe { Self::release_group(prev_ptr, prev_counter) };
        }
    }

    /// Releases this handle's ownership right away.
    ///
    /// This is the same as dropping the handle, and the object is released
    /// if this was the last handle in its group.
    /// The handle is consumed, so it cannot be used afterwards:
    /// ```compile_fail
    /// use shared_handle::SharedHandle;
    ///
    /// let a = SharedHandle::new(20);
    /// a.erase();
    /// assert_eq!(*a, 20);
    /// ```
    pub fn erase(self) {
        drop(self);
    }

    /// Moves the object out if this handle is its only owner.
    ///
    /// Otherwise, including when this handle is empty, the handle is returned unchanged.
    pub fn try_unwrap(self) -> Result<T, SharedHandle<T>> {
        let p = match self.ptr {
            Some(p) if self.strong_count() == 1 => p,
            _ => return Err(self),
        };
        let this = ManuallyDrop::new(self);
        // SAFETY: this is the last handle of the group, and it will never be dropped.
        unsafe { Self::release_group(None, this.counter) };
        // SAFETY: `p` came from a `Box` and no handle refers to it anymore.
        Ok(*unsafe { Box::from_raw(p.as_ptr()) })
    }

    /// Frees a group's `counter` and, if present, its object at `ptr`.
    ///
    /// # Safety
    ///
    /// No handle may use this counter or object afterwards.
    unsafe fn release_group(ptr: Option<NonNull<T>>, counter: NonNull<RefCount>) {
        trace!("SharedHandle: releasing group with counter at {:p}", counter);
        // SAFETY: the counter came from a `Box` in `fresh()`.
        drop(unsafe { Box::from_raw(counter.as_ptr()) });
        if let Some(p) = ptr {
            // SAFETY: the object came from a `Box` and the caller guarantees no one else uses it.
            drop(unsafe { Box::from_raw(p.as_ptr()) });
        }
    }
}

impl<T> Clone for SharedHandle<T> {
    /// Joins this handle's ownership group, incrementing the shared count.
    fn clone(&self) -> SharedHandle<T> {
        self.counter().increment();
        SharedHandle { ptr: self.ptr, counter: self.counter, _owns: PhantomData }
    }

    /// Same as [`SharedHandle::assign()`].
    fn clone_from(&mut self, source: &SharedHandle<T>) {
        self.assign(source);
    }
}

impl<T> Drop for SharedHandle<T> {
    fn drop(&mut self) {
        if self.counter().decrement() == 0 {
            // SAFETY: that was the last handle of the group.
            unsafe { Self::release_group(self.ptr, self.counter) };
        }
    }
}

impl<T> Deref for SharedHandle<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

#[cold]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty SharedHandle")
}

impl<T> Default for SharedHandle<T> {
    fn default() -> Self {
        SharedHandle::empty()
    }
}

impl<T> From<Box<T>> for SharedHandle<T> {
    fn from(boxed: Box<T>) -> Self {
        SharedHandle::from_box(boxed)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("value", &self.get())
            .field("refs", &self.strong_count())
            .finish()
    }
}


/// Decides whether reassigning a handle releases the group it is leaving,
/// given the count that remains after its own decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReassignPolicy {
    /// Release the old group only when no handles remain in it.
    Corrected,
    /// Release the old group whenever handles *do* remain in it.
    /// This leaks a group whose last handle is reassigned,
    /// and frees a group out from under its remaining handles.
    Legacy,
}

impl ReassignPolicy {
    /// Returns `true` if a group with `remaining` handles left should be released.
    pub const fn releases_previous(self, remaining: isize) -> bool {
        match self {
            ReassignPolicy::Corrected => remaining == 0,
            ReassignPolicy::Legacy => remaining != 0,
        }
    }
}
