//! A handle with exclusive ownership of a single heap-allocated object.
//!
//! An [`ExclusiveHandle`] is the only owner of the object it points to.
//! It implements neither `Clone` nor `Copy`, so a second owner can never be
//! created from safe code; ownership can only be *transferred*, which leaves
//! the source handle empty.
//!
//! The handle is the size of a single pointer, with the empty state
//! represented by the null niche.
//!
//! Duplicating a handle does not compile:
//! ```compile_fail
//! use exclusive_handle::ExclusiveHandle;
//!
//! let a = ExclusiveHandle::new(20);
//! let b: ExclusiveHandle<i32> = Clone::clone(&a);
//! ```
//!
//! Neither does using a handle after it was moved by assignment:
//! ```compile_fail
//! use exclusive_handle::ExclusiveHandle;
//!
//! let a = ExclusiveHandle::new(20);
//! let b = a;
//! assert_eq!(*a, 20);
//! ```

#![no_std]

extern crate alloc;


use alloc::boxed::Box;
use core::{
    fmt,
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};
use log::trace;

/// The sole owner of one heap-allocated `T`, or of nothing at all.
///
/// Dropping a non-empty handle drops and deallocates the object exactly once.
///
/// Dereferencing an empty handle panics; use [`ExclusiveHandle::get()`]
/// to check first.
pub struct ExclusiveHandle<T> {
    ptr: Option<NonNull<T>>,
    /// We own a `T`, which matters for drop checking.
    _owns: PhantomData<T>,
}

// SAFETY: an `ExclusiveHandle<T>` owns its `T` just like a `Box<T>` does.
unsafe impl<T: Send> Send for ExclusiveHandle<T> {}
// SAFETY: shared access to the handle only ever yields `&T`.
unsafe impl<T: Sync> Sync for ExclusiveHandle<T> {}

impl<T> ExclusiveHandle<T> {
    const fn with_ptr(ptr: Option<NonNull<T>>) -> Self {
        ExclusiveHandle { ptr, _owns: PhantomData }
    }

    /// Creates an empty handle that owns nothing.
    pub const fn empty() -> ExclusiveHandle<T> {
        Self::with_ptr(None)
    }

    /// Moves `value` onto the heap and takes ownership of it.
    pub fn new(value: T) -> ExclusiveHandle<T> {
        Self::from_box(Box::new(value))
    }

    /// Takes ownership of the object inside the given `Box`.
    pub fn from_box(boxed: Box<T>) -> ExclusiveHandle<T> {
        Self::with_ptr(Some(NonNull::from(Box::leak(boxed))))
    }

    /// Takes ownership of the object at `raw`, or creates an empty handle if `raw` is null.
    ///
    /// No allocation is performed.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must come from [`Box::into_raw()`] (or [`ExclusiveHandle::into_raw()`])
    /// and must not be owned by anything else, including another handle.
    pub unsafe fn from_raw(raw: *mut T) -> ExclusiveHandle<T> {
        Self::with_ptr(NonNull::new(raw))
    }

    /// Returns `true` if this handle owns nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns the address of the owned object, or null if this handle is empty.
    ///
    /// The handle keeps ownership.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// Returns a reference to the owned object, if any.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-empty handle always points to a live object that it alone owns.
        self.ptr.as_ref().map(|p| unsafe { p.as_ref() })
    }

    /// Returns a mutable reference to the owned object, if any.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: same as `get()`, and `&mut self` guarantees no other borrow exists.
        self.ptr.as_mut().map(|p| unsafe { p.as_mut() })
    }

    /// Transfers ownership of `source`'s object into this handle,
    /// leaving `source` empty.
    ///
    /// Whatever this handle owned beforehand is dropped.
    /// Transferring a handle into itself changes nothing,
    /// though the borrow checker already rejects the obvious form of it:
    /// ```compile_fail
    /// use exclusive_handle::ExclusiveHandle;
    ///
    /// let mut a = ExclusiveHandle::new(20);
    /// a.transfer_from(&mut a);
    /// ```
    ///
    /// Returns `self` so that calls can be chained.
    pub fn transfer_from(&mut self, source: &mut ExclusiveHandle<T>) -> &mut ExclusiveHandle<T> {
        if !ptr::eq(&*self, &*source) {
            // Adopt first, so a panicking `T::drop` cannot lose the incoming object.
            let previous = mem::replace(&mut self.ptr, source.ptr.take());
            drop(Self::with_ptr(previous));
        }
        self
    }

    /// Moves the owned object out into a new handle, leaving this one empty.
    pub fn take(&mut self) -> ExclusiveHandle<T> {
        Self::with_ptr(self.ptr.take())
    }

    /// Gives up ownership and returns the raw address, which is null if this handle was empty.
    ///
    /// The caller becomes responsible for releasing the object,
    /// e.g., by passing it back into [`ExclusiveHandle::from_raw()`].
    pub fn into_raw(self) -> *mut T {
        ManuallyDrop::new(self).as_ptr()
    }

    /// Gives up ownership and returns the object as a `Box`, or `None` if this handle was empty.
    pub fn into_box(self) -> Option<Box<T>> {
        let raw = self.into_raw();
        if raw.is_null() {
            None
        } else {
            // SAFETY: `raw` came from a `Box` and we just gave up our ownership of it.
            Some(unsafe { Box::from_raw(raw) })
        }
    }

    /// Moves the owned object out of the heap and returns it.
    pub fn try_into_inner(self) -> Result<T, &'static str> {
        self.into_box()
            .map(|boxed| *boxed)
            .ok_or("cannot take the value out of an empty ExclusiveHandle")
    }

    /// Drops and deallocates the owned object, if any, leaving this handle empty.
    fn release(&mut self) {
        if let Some(p) = self.ptr.take() {
            trace!("ExclusiveHandle: releasing object at {:p}", p);
            // SAFETY: `p` came from a `Box` and this handle was its only owner.
            drop(unsafe { Box::from_raw(p.as_ptr()) });
        }
    }
}

impl<T> Drop for ExclusiveHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Deref for ExclusiveHandle<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

impl<T> DerefMut for ExclusiveHandle<T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => empty_deref(),
        }
    }
}

#[cold]
#[track_caller]
fn empty_deref() -> ! {
    panic!("dereferenced an empty ExclusiveHandle")
}

impl<T> Default for ExclusiveHandle<T> {
    fn default() -> Self {
        ExclusiveHandle::empty()
    }
}

impl<T> From<Box<T>> for ExclusiveHandle<T> {
    fn from(boxed: Box<T>) -> Self {
        ExclusiveHandle::from_box(boxed)
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExclusiveHandle").field(&self.get()).finish()
    }
}
