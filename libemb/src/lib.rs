//! The application-facing library that exposes the `emb` ownership handles.
//!
//! This crate has no logic of its own; it re-exports the leaf crates so that
//! applications can depend on a single crate and write `emb::SharedHandle`.
//!
//! * [`ExclusiveHandle`]: the sole, move-only owner of one heap object.
//! * [`SharedHandle`]: one of many owners of a heap object, coordinated by a [`RefCount`].
//!
//! All of these are `no_std` and only need `alloc`.
//!
//! ## Features
//!
//! The features of this crate are forwarded to the leaf crates:
//!
//! * `legacy_reassign`: exposes `SharedHandle::assign_legacy()`, which keeps the
//!   inverted release check of the legacy assignment for compatibility testing.
//! * `everything`: all of the above.
//!
//! ```sh
//! cargo test --workspace --features libemb/everything
//! ```

#![no_std]

#[cfg(test)]
mod test;

pub extern crate exclusive_handle;
pub extern crate ref_count;
pub extern crate shared_handle;

pub use exclusive_handle::ExclusiveHandle;
pub use ref_count::RefCount;
pub use shared_handle::{ReassignPolicy, SharedHandle};
