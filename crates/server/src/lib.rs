//! Pantry Tracker server library.
//!
//! The binary in `main.rs` wires these modules into an axum service; the
//! CLI crate reuses the same clients and inventory service directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod completion;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
