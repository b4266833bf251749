//! Default fleet seeded into an empty inventory

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::inventory::{InventoryItem, ItemStatus};

pub const DEFAULT_LOCATION: &str = "Warehouse";

/// (size class, number of units)
pub const DEFAULT_FLEET: &[(&str, usize)] = &[("10", 3), ("12", 2), ("15", 5), ("20", 5), ("30", 5)];

pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the default fleet, all available at the depot
pub fn default_fleet(now: DateTime<Utc>) -> Vec<InventoryItem> {
    DEFAULT_FLEET
        .iter()
        .flat_map(|&(size, count)| {
            (1..=count).map(move |n| InventoryItem {
                id: new_item_id(),
                name: format!("{} Yard Dumpster #{}", size, n),
                size: size.to_string(),
                quantity: 1,
                location: DEFAULT_LOCATION.to_string(),
                status: ItemStatus::Available,
                customer_id: None,
                rental_start_date: None,
                rental_end_date: None,
                last_updated: now,
            })
        })
        .collect()
}
