//! Hand-rolled `no_std` + `alloc` foundation types for Koala.
//!
//! # Scope
//!
//! - **Reference counting** ([`rc`]) - paired strong/weak handles sharing one
//!   atomic count block, the ownership primitive every longer-lived shared
//!   value in Koala is built on.

#![no_std]

extern crate alloc;

/// Strong/weak reference-counted handles.
pub mod rc;

pub use rc::{Ref, WeakRef};
