//! Core types for Pantry Tracker.

pub mod item;
pub mod name;

pub use item::{Item, search};
pub use name::{ItemName, ItemNameError};
