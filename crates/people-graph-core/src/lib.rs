//! # people-graph core
//!
//! Pure logic for the people-graph import: the profile record schema,
//! content-addressed identity keys, keyword skill extraction, and the
//! graph store abstraction with an in-memory implementation.
//!
//! This crate contains no tokio runtime, Bolt driver, or filesystem I/O.

pub mod error;
pub mod hash;
pub mod identity;
pub mod models;
pub mod skills;
pub mod store;
