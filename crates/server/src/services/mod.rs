//! Application services.

pub mod inventory;

pub use inventory::{Classification, InventoryError, InventoryService};
