//! Data models for Rolloff

pub mod inventory;

// Re-export commonly used types
pub use inventory::{
    Availability, InventoryItem, InventoryStatus, ItemPatch, ItemQuery, ItemStatus, NewItem,
};
