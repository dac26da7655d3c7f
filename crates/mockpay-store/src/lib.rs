//! # mockpay-store
//!
//! Durable JSON-file persistence for mockpay-rs.
//!
//! This crate provides [`JsonStore`], a keyed store with one file per
//! record and atomic per-record writes, plus its implementations of the
//! core `SessionStore` and `OrderStore` traits.

pub mod store;

pub use store::{FileOrderStore, FileSessionStore, JsonStore};
