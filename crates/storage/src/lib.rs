//! Storage abstraction and implementations for hostwarden.
//!
//! This crate provides a trait-based store interface with a plain-JSON
//! reference implementation (two human-inspectable documents).

#![warn(missing_docs)]

pub mod json_store;
pub mod trait_;

pub use json_store::JsonStore;
pub use trait_::{Result, StorageError, Store};
