//! Inventory item model and related types

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Lifecycle state of a rentable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    Available,
    Rented,
    Maintenance,
    OutForDelivery,
    Reserved,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::Available,
        ItemStatus::Rented,
        ItemStatus::Maintenance,
        ItemStatus::OutForDelivery,
        ItemStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Rented => "rented",
            ItemStatus::Maintenance => "maintenance",
            ItemStatus::OutForDelivery => "out-for-delivery",
            ItemStatus::Reserved => "reserved",
        }
    }

    /// Whether `updateItem` may move an item from `self` to `next`.
    ///
    /// Re-setting the current status is always allowed.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Available, Rented | Maintenance | Reserved | OutForDelivery)
                | (Reserved, Available | Rented | OutForDelivery | Maintenance)
                | (OutForDelivery, Rented | Available)
                | (Rented, Available | Maintenance)
                | (Maintenance, Available)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown status '{}'", s))
    }
}

/// One rentable physical unit, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    /// Human-readable label, e.g. "20 Yard Dumpster #3"
    pub name: String,
    /// Size class used to match rental requests ("15", "20", "30", ...)
    pub size: String,
    pub quantity: i32,
    pub location: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_end_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// True when rental fields are all set on a rented item, or all absent otherwise
    pub fn has_consistent_rental(&self) -> bool {
        let set = [
            self.customer_id.is_some(),
            self.rental_start_date.is_some(),
            self.rental_end_date.is_some(),
        ];
        if self.status == ItemStatus::Rented {
            set.iter().all(|s| *s)
        } else {
            set.iter().all(|s| !*s)
        }
    }

    /// Case-insensitive substring match on name or location.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.location.to_lowercase().contains(needle)
    }

    pub(crate) fn clear_rental(&mut self) {
        self.customer_id = None;
        self.rental_start_date = None;
        self.rental_end_date = None;
    }

    /// Refresh `last_updated`, never moving it backwards or leaving it unchanged
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        self.last_updated = if now > self.last_updated {
            now
        } else {
            self.last_updated + Duration::microseconds(1)
        };
    }
}

/// Fields for a new item; the service assigns `id` and `lastUpdated`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    /// Defaults to 1
    pub quantity: Option<i32>,
    /// Defaults to "Warehouse"
    pub location: Option<String>,
    /// Defaults to available
    pub status: Option<ItemStatus>,
    pub customer_id: Option<String>,
    pub rental_start_date: Option<NaiveDate>,
    pub rental_end_date: Option<NaiveDate>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Size cannot be empty"))]
    pub size: Option<String>,
    pub quantity: Option<i32>,
    pub location: Option<String>,
    pub status: Option<ItemStatus>,
    pub customer_id: Option<String>,
    pub rental_start_date: Option<NaiveDate>,
    pub rental_end_date: Option<NaiveDate>,
}

/// Answer to "is a unit of this size free?"
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub count: usize,
    /// Sizes with at least one free unit, only when `count` is 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_sizes: Option<Vec<String>>,
}

/// Fleet-wide counts
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStatus {
    pub total_dumpsters: usize,
    pub available_dumpsters: usize,
    pub active_rentals: usize,
    /// Percentage of the fleet currently rented
    pub utilization_rate: f64,
}

/// Item list filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    /// Status name, matched case-insensitively
    pub status: Option<String>,
    pub size: Option<String>,
    /// Case-insensitive match on name or location
    pub q: Option<String>,
}
