//! Common utilities for the Koala HTML front end.
//!
//! This crate provides shared infrastructure used by all front-end components:
//! - **Warning System** - colored, deduplicated terminal output for parse
//!   errors and unsupported features
//! - **Strings** - code-point helpers, the [Infra] ASCII predicates and
//!   fallible appends
//!
//! [Infra]: https://infra.spec.whatwg.org/

pub mod string;
pub mod warning;
