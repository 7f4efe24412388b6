//! Inventory domain types consumed by forecasting.
//!
//! Issuance records are owned by the inventory subsystem; this crate only
//! defines their shape and the item-key they are grouped by (no IO, no HTTP,
//! no storage).

pub mod issuance;

pub use issuance::{normalize_cloth_size, normalize_size, IssuanceRecord, ItemKey};
