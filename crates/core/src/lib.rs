//! Pantry Core - Shared types library.
//!
//! This crate provides the domain types used across the Pantry Tracker
//! components:
//! - `server` - JSON API over the remote item store and the completion API
//! - `cli` - Command-line access to the same operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Item names, items, and the snapshot search filter

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
